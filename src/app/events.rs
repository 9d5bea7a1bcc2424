//! Outbound application events.
//!
//! The [`Board`](super::board::Board) emits these through the
//! [`EventSink`](super::ports::EventSink) port.

/// Structured events emitted by the board core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The raw charge-detect input changed.
    ChargingChanged { charging: bool },

    /// The board finished bring-up; carries the boot brightness.
    Started { brightness_percent: u8 },
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub level: u8,
    pub charging: bool,
    pub discharging: bool,
    pub mean_mv: f32,
    pub effective_mv: f32,
    pub window_len: usize,
    /// Last brightness requested through the board, if any.
    pub brightness_percent: Option<u8>,
    pub brightness_dropped: u32,
}
