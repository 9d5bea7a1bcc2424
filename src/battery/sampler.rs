//! Periodic battery sampler.
//!
//! Called once per tick (1 Hz).  Each tick reads the charge-detect input,
//! takes one calibrated voltage sample, pushes it into a trailing window of
//! the last [`WINDOW_LEN`] samples, and maps the window mean to a percent.
//! The result is published through [`BatteryStatus`] in one atomic store.
//!
//! The tick never blocks: one GPIO read, one ADC read, arithmetic.

use embedded_hal::digital::{ErrorType, InputPin};
use heapless::Deque;
use log::{debug, info, warn};

use super::calibration::{CalibrationTable, ChargeCurveCorrector};
use super::level::{LevelInterpolator, LevelTable};
use super::{BatteryState, BatteryStatus};
use crate::app::ports::MillivoltReader;
use crate::config::BoardConfig;
use crate::error;

/// Number of samples in the smoothing window.
pub const WINDOW_LEN: usize = 10;

/// Placeholder for boards without a charge-detect line.
///
/// Reads as neither level, so it never signals charging under either
/// polarity, whether passed as `None` or `Some(Unwired)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unwired;

impl ErrorType for Unwired {
    type Error = core::convert::Infallible;
}

impl InputPin for Unwired {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

pub struct BatterySampler<R, C = Unwired> {
    reader: R,
    charge_detect: Option<C>,
    charge_active_low: bool,
    window: Deque<u16, WINDOW_LEN>,
    corrector: ChargeCurveCorrector,
    interpolator: LevelInterpolator,
    status: BatteryStatus,
    state: BatteryState,
    last_mean_mv: f32,
    last_effective_mv: f32,
}

impl<R: MillivoltReader, C: InputPin> BatterySampler<R, C> {
    /// Build a sampler.  `charge_detect` is `None` when the board has no
    /// charge-status line; the battery then always reads as discharging.
    pub fn new(
        reader: R,
        charge_detect: Option<C>,
        corrector: ChargeCurveCorrector,
        interpolator: LevelInterpolator,
    ) -> Self {
        Self {
            reader,
            charge_detect,
            charge_active_low: true,
            window: Deque::new(),
            corrector,
            interpolator,
            status: BatteryStatus::new(),
            state: BatteryState::default(),
            last_mean_mv: 0.0,
            last_effective_mv: 0.0,
        }
    }

    /// Build from board configuration with the built-in charge curve.
    pub fn from_config(
        config: &BoardConfig,
        reader: R,
        charge_detect: Option<C>,
    ) -> error::Result<Self> {
        let levels = LevelTable::new(&config.level_anchors)?;
        let mut sampler = Self::new(
            reader,
            charge_detect,
            ChargeCurveCorrector::new(CalibrationTable::builtin()),
            LevelInterpolator::new(levels),
        );
        sampler.charge_active_low = config.charge_detect_active_low;
        Ok(sampler)
    }

    /// Set which input level means "charging".
    pub fn with_charge_active_low(mut self, active_low: bool) -> Self {
        self.charge_active_low = active_low;
        self
    }

    /// Run one sampling cycle and publish the result.
    pub fn tick(&mut self) -> BatteryState {
        let is_charging = self.read_charging();

        match self.reader.read_millivolts() {
            Ok(mv) => {
                if self.window.is_full() {
                    self.window.pop_front();
                }
                // Cannot fail: a slot was freed above.
                let _ = self.window.push_back(mv);
            }
            Err(e) => warn!("battery: sample read failed ({}), window unchanged", e),
        }

        let smoothed_level = match self.window_mean() {
            Some(mean) => {
                let effective = if is_charging {
                    self.corrector.correct(mean)
                } else {
                    mean
                };
                self.last_mean_mv = mean;
                self.last_effective_mv = effective;
                self.interpolator.percent(effective)
            }
            None => self.state.smoothed_level,
        };

        let state = BatteryState {
            is_charging,
            smoothed_level,
        };
        self.status.publish(state);
        self.state = state;

        debug!(
            "battery: mean={:.1}mV effective={:.1}mV n={} level={}% charging={}",
            self.last_mean_mv,
            self.last_effective_mv,
            self.window.len(),
            smoothed_level,
            is_charging
        );

        state
    }

    fn read_charging(&mut self) -> bool {
        let Some(pin) = self.charge_detect.as_mut() else {
            return false;
        };
        let reading = if self.charge_active_low {
            pin.is_low()
        } else {
            pin.is_high()
        };
        match reading {
            Ok(charging) => {
                if charging != self.state.is_charging {
                    info!("battery: charging {}", if charging { "started" } else { "stopped" });
                }
                charging
            }
            Err(e) => {
                warn!("battery: charge-detect read failed ({:?})", e);
                self.state.is_charging
            }
        }
    }

    fn window_mean(&self) -> Option<f32> {
        if self.window.is_empty() {
            return None;
        }
        let sum: u32 = self.window.iter().map(|&mv| u32::from(mv)).sum();
        Some(sum as f32 / self.window.len() as f32)
    }

    /// A reader handle onto the published state.
    pub fn status(&self) -> BatteryStatus {
        self.status.clone()
    }

    /// State produced by the most recent tick.
    pub fn state(&self) -> BatteryState {
        self.state
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Samples currently in the window, oldest first.
    pub fn window(&self) -> impl Iterator<Item = u16> + '_ {
        self.window.iter().copied()
    }

    /// Window mean from the last tick that had samples.
    pub fn last_mean_mv(&self) -> f32 {
        self.last_mean_mv
    }

    /// Voltage fed to the interpolator on the last tick (corrected if charging).
    pub fn last_effective_mv(&self) -> f32 {
        self.last_effective_mv
    }
}
