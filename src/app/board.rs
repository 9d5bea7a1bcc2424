//! Board composition: the battery sampler plus the producer end of the
//! backlight queue, behind a hardware-agnostic API.
//!
//! ```text
//!  MillivoltReader ─┐                          ┌──▶ EventSink
//!  charge pin ──────┤──▶ ┌──────────────┐ ─────┘
//!                        │    Board     │
//!  set_brightness ─────▶ │ sampler · tx │ ──▶ BrightnessSender ──▶ worker
//!                        └──────────────┘
//! ```
//!
//! The board is driven by the main loop: one [`Board::on_battery_tick`]
//! per timer event.  Readers elsewhere hold a [`BatteryStatus`] clone and
//! never touch the board.

use embedded_hal::digital::InputPin;
use log::info;

use crate::backlight::BrightnessSender;
use crate::battery::sampler::{BatterySampler, Unwired};
use crate::battery::{BatteryState, BatteryStatus};
use crate::config::BoardConfig;

use super::events::{AppEvent, TelemetryData};
use super::ports::{EventSink, MillivoltReader};

/// Battery state as shown to the rest of the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryReport {
    pub level: u8,
    /// `false` once the battery reads full, whatever the pin says.
    pub charging: bool,
    pub discharging: bool,
}

pub struct Board<R, C = Unwired> {
    sampler: BatterySampler<R, C>,
    brightness: BrightnessSender,
    status: BatteryStatus,
    default_brightness: u8,
    last_brightness: Option<u8>,
    ticks_per_telemetry: u32,
    tick_count: u64,
}

impl<R: MillivoltReader, C: InputPin> Board<R, C> {
    pub fn new(config: &BoardConfig, sampler: BatterySampler<R, C>, brightness: BrightnessSender) -> Self {
        let status = sampler.status();
        Self {
            sampler,
            brightness,
            status,
            default_brightness: config.default_brightness_percent,
            last_brightness: None,
            ticks_per_telemetry: config.ticks_per_telemetry(),
            tick_count: 0,
        }
    }

    /// Queue the boot brightness and announce bring-up.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.set_brightness(self.default_brightness);
        info!("board: started, backlight {}%", self.default_brightness);
        sink.emit(&AppEvent::Started {
            brightness_percent: self.default_brightness,
        });
    }

    /// One sampling period.  Emits a charging change and, every
    /// `telemetry_interval_secs`, a telemetry snapshot.
    pub fn on_battery_tick(&mut self, sink: &mut impl EventSink) -> BatteryState {
        let before = self.sampler.state();
        let state = self.sampler.tick();
        self.tick_count += 1;

        if state.is_charging != before.is_charging {
            sink.emit(&AppEvent::ChargingChanged {
                charging: state.is_charging,
            });
        }
        if self.tick_count % u64::from(self.ticks_per_telemetry) == 0 {
            sink.emit(&AppEvent::Telemetry(self.telemetry()));
        }
        state
    }

    /// Best-effort brightness request; see [`BrightnessSender::set_brightness`].
    pub fn set_brightness(&mut self, percent: u8) {
        let percent = percent.min(100);
        self.last_brightness = Some(percent);
        self.brightness.set_brightness(percent);
    }

    pub fn request_resync(&self) {
        self.brightness.request_resync();
    }

    /// Level and both charge flags from one published snapshot.
    pub fn battery_report(&self) -> BatteryReport {
        let s = self.status.snapshot();
        BatteryReport {
            level: s.smoothed_level,
            charging: s.shows_charging(),
            discharging: s.is_discharging(),
        }
    }

    pub fn level(&self) -> u8 {
        self.status.level()
    }

    pub fn is_charging(&self) -> bool {
        self.status.is_charging()
    }

    pub fn is_discharging(&self) -> bool {
        self.status.is_discharging()
    }

    pub fn telemetry(&self) -> TelemetryData {
        let report = self.battery_report();
        TelemetryData {
            level: report.level,
            charging: report.charging,
            discharging: report.discharging,
            mean_mv: self.sampler.last_mean_mv(),
            effective_mv: self.sampler.last_effective_mv(),
            window_len: self.sampler.window_len(),
            brightness_percent: self.last_brightness,
            brightness_dropped: self.brightness.dropped(),
        }
    }

    /// A reader handle for other tasks.
    pub fn status(&self) -> BatteryStatus {
        self.status.clone()
    }

    pub fn brightness_sender(&self) -> BrightnessSender {
        self.brightness.clone()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Close the backlight queue; the worker exits after draining.
    pub fn shutdown(&self) {
        info!("board: shutting down after {} ticks", self.tick_count);
        self.brightness.close();
    }
}
