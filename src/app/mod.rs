//! Board core: backlight and battery composed behind ports.
//!
//! All interaction with hardware happens through the traits in [`ports`]
//! and `embedded-hal`, keeping this layer testable without peripherals.

pub mod board;
pub mod events;
pub mod ports;
