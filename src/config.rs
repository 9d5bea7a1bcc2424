//! Board configuration parameters
//!
//! All tunable parameters for the backlight and battery subsystems.
//! Nothing is persisted; the firmware starts from [`BoardConfig::default`]
//! or from a JSON override baked in at build time.

use serde::{Deserialize, Serialize};

use crate::battery::level::{LevelAnchor, LevelTable, MAX_ANCHORS};
use crate::error::{Error, Result};

/// Minimum low phase of the wake sequence before the first pulse.
pub const MIN_WAKE_LOW_US: u32 = 5;
/// Minimum high phase after wake before the IC accepts pulses.
pub const MIN_WAKE_HIGH_US: u32 = 30;
/// Minimum low/high phase of a single counting pulse.
pub const MIN_PULSE_PHASE_US: u32 = 2;
/// Minimum low hold for the IC to drop into standby on a resync.
pub const MIN_STANDBY_HOLD_US: u32 = 2_500;

/// Edge timing for the single-wire backlight IC, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseTiming {
    pub wake_low_us: u32,
    pub wake_high_us: u32,
    pub pulse_low_us: u32,
    pub pulse_high_us: u32,
    /// Used only by resync: how long the line stays low to force standby.
    pub standby_hold_us: u32,
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self {
            wake_low_us: MIN_WAKE_LOW_US,
            wake_high_us: MIN_WAKE_HIGH_US,
            pulse_low_us: MIN_PULSE_PHASE_US,
            pulse_high_us: MIN_PULSE_PHASE_US,
            standby_hold_us: 3_000,
        }
    }
}

impl PulseTiming {
    pub fn validate(&self) -> Result<()> {
        if self.wake_low_us < MIN_WAKE_LOW_US {
            return Err(Error::Config("wake_low_us below IC minimum"));
        }
        if self.wake_high_us < MIN_WAKE_HIGH_US {
            return Err(Error::Config("wake_high_us below IC minimum"));
        }
        if self.pulse_low_us < MIN_PULSE_PHASE_US || self.pulse_high_us < MIN_PULSE_PHASE_US {
            return Err(Error::Config("pulse phase below IC minimum"));
        }
        if self.standby_hold_us < MIN_STANDBY_HOLD_US {
            return Err(Error::Config("standby_hold_us too short to reset the IC"));
        }
        Ok(())
    }
}

/// Core board configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    // --- Backlight ---
    /// Brightness applied once at boot (0-100%)
    pub default_brightness_percent: u8,
    /// Single-wire protocol timing
    pub pulse_timing: PulseTiming,
    /// FreeRTOS priority of the backlight worker thread
    pub backlight_worker_priority: u8,
    /// Stack size of the backlight worker thread (KiB)
    pub backlight_worker_stack_kb: usize,

    // --- Battery ---
    /// Battery sampling period (milliseconds)
    pub battery_sample_interval_ms: u32,
    /// External resistor divider ratio applied to the ADC millivolts
    pub divider_ratio: u16,
    /// Charge-detect input reads LOW while charging
    pub charge_detect_active_low: bool,
    /// Voltage → percent anchors, ascending in millivolts
    pub level_anchors: heapless::Vec<LevelAnchor, MAX_ANCHORS>,

    // --- Telemetry ---
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            // Backlight
            default_brightness_percent: 80,
            pulse_timing: PulseTiming::default(),
            backlight_worker_priority: 20,
            backlight_worker_stack_kb: 4,

            // Battery
            battery_sample_interval_ms: 1000, // 1 Hz
            divider_ratio: 2,
            charge_detect_active_low: true,
            level_anchors: LevelTable::reference_anchors(),

            // Telemetry
            telemetry_interval_secs: 60,
        }
    }
}

impl BoardConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<()> {
        if self.default_brightness_percent > 100 {
            return Err(Error::Config("default_brightness_percent > 100"));
        }
        self.pulse_timing.validate()?;
        if self.backlight_worker_stack_kb == 0 {
            return Err(Error::Config("backlight_worker_stack_kb is zero"));
        }
        if self.battery_sample_interval_ms == 0 {
            return Err(Error::Config("battery_sample_interval_ms is zero"));
        }
        if self.divider_ratio == 0 {
            return Err(Error::Config("divider_ratio is zero"));
        }
        if self.telemetry_interval_secs == 0 {
            return Err(Error::Config("telemetry_interval_secs is zero"));
        }
        LevelTable::new(&self.level_anchors)?;
        Ok(())
    }

    /// Parse a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Number of sampling ticks between two telemetry reports.
    pub fn ticks_per_telemetry(&self) -> u32 {
        (self.telemetry_interval_secs.saturating_mul(1000) / self.battery_sample_interval_ms.max(1)).max(1)
    }
}
