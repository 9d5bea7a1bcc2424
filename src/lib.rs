//! TFT-box firmware library.
//!
//! Backlight pulse control for the single-wire LED driver and battery
//! telemetry.  Exposes the pure-logic modules for integration testing.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod backlight;
pub mod battery;
pub mod config;
pub mod error;
pub mod events;
pub mod pins;

pub mod adapters;
pub mod drivers;
