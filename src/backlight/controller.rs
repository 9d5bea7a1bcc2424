//! Open-loop pulse driver for the backlight IC.
//!
//! Generic over an `embedded-hal` output pin and microsecond delay so the
//! same code drives the real GPIO (with the ROM busy-wait delay) and the
//! recording mocks in tests.
//!
//! ## Timing
//!
//! The IC only counts edges whose low and high phases meet its minimum
//! widths.  A pulse train is emitted inside a critical section so the
//! scheduler cannot stretch a phase mid-train.  There is no feedback: if
//! an edge is still lost the tracked step and the IC disagree until the
//! next [`BacklightPulseController::resync`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use super::queue::{BacklightCommand, BrightnessReceiver};
use super::{BacklightStep, Transition};
use crate::config::PulseTiming;

/// Line held low after power-up before the first command.
const BOOT_SETTLE_MS: u32 = 50;

pub struct BacklightPulseController<P, D> {
    pin: P,
    delay: D,
    timing: PulseTiming,
    step: BacklightStep,
    last_percent: Option<u8>,
}

impl<P: OutputPin, D: DelayNs> BacklightPulseController<P, D> {
    /// The IC is assumed to be in standby (step 15) until told otherwise.
    pub fn new(pin: P, delay: D, timing: PulseTiming) -> Self {
        Self {
            pin,
            delay,
            timing,
            step: BacklightStep::OFF,
            last_percent: None,
        }
    }

    /// Drive the line low and let the IC settle in standby.
    pub fn init(&mut self) -> Result<(), P::Error> {
        self.pin.set_low()?;
        self.delay.delay_ms(BOOT_SETTLE_MS);
        self.step = BacklightStep::OFF;
        Ok(())
    }

    /// Move the IC to the step for `percent` (clamped to 100).
    pub fn apply(&mut self, percent: u8) -> Result<Transition, P::Error> {
        let percent = percent.min(100);
        let plan = Transition::plan(self.step, BacklightStep::from_percent(percent));

        if plan.turns_off() {
            self.pin.set_low()?;
        } else if plan.wake || plan.pulses > 0 {
            critical_section::with(|_| self.emit(&plan))?;
        }

        debug!(
            "backlight: {}% step {} -> {} ({} pulses{})",
            percent,
            plan.from.value(),
            plan.to.value(),
            plan.pulses,
            if plan.wake { ", wake" } else { "" }
        );

        self.step = plan.to;
        self.last_percent = Some(percent);
        Ok(plan)
    }

    /// Force the IC into standby, then replay the last requested brightness.
    ///
    /// Recovers from lost edges.  Returns the replay transition, or `None`
    /// if no brightness was ever applied.
    pub fn resync(&mut self) -> Result<Option<Transition>, P::Error> {
        self.pin.set_low()?;
        self.delay.delay_us(self.timing.standby_hold_us);
        self.step = BacklightStep::OFF;
        info!("backlight: resync, IC parked in standby");

        match self.last_percent {
            Some(percent) => self.apply(percent).map(Some),
            None => Ok(None),
        }
    }

    fn emit(&mut self, plan: &Transition) -> Result<(), P::Error> {
        let t = self.timing;
        if plan.wake {
            self.pin.set_low()?;
            self.delay.delay_us(t.wake_low_us);
            self.pin.set_high()?;
            self.delay.delay_us(t.wake_high_us);
        }
        for _ in 0..plan.pulses {
            self.pin.set_low()?;
            self.delay.delay_us(t.pulse_low_us);
            self.pin.set_high()?;
            self.delay.delay_us(t.pulse_high_us);
        }
        Ok(())
    }

    /// Worker loop: apply commands until the queue is closed.
    ///
    /// Pin errors are logged and the loop keeps draining.
    pub fn run(mut self, commands: BrightnessReceiver) -> Self {
        info!("backlight: worker started at step {}", self.step.value());
        loop {
            match commands.recv() {
                BacklightCommand::Brightness(percent) => {
                    if let Err(e) = self.apply(percent) {
                        warn!("backlight: pin write failed applying {}% ({:?})", percent, e);
                    }
                }
                BacklightCommand::Resync => {
                    if let Err(e) = self.resync() {
                        warn!("backlight: pin write failed during resync ({:?})", e);
                    }
                }
                BacklightCommand::Shutdown => break,
            }
        }
        info!("backlight: worker stopped at step {}", self.step.value());
        self
    }

    /// Step the controller believes the IC is at.
    pub fn step(&self) -> BacklightStep {
        self.step
    }

    pub fn last_percent(&self) -> Option<u8> {
        self.last_percent
    }
}
