//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured board events to the
//! ESP-IDF logger (UART / USB-CDC in production).  Lines carry a short
//! fixed prefix so they can be grepped out of a serial capture.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | level={}% | charging={} discharging={} | \
                     mean={:.0}mV eff={:.0}mV n={} | bl={} dropped={}",
                    t.level,
                    t.charging,
                    t.discharging,
                    t.mean_mv,
                    t.effective_mv,
                    t.window_len,
                    t.brightness_percent.map_or(-1, i16::from),
                    t.brightness_dropped,
                );
            }
            AppEvent::ChargingChanged { charging } => {
                info!("POWER | {}", if *charging { "charging" } else { "on battery" });
            }
            AppEvent::Started { brightness_percent } => {
                info!("START | backlight={}%", brightness_percent);
            }
        }
    }
}
