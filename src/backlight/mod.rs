//! Backlight control for the single-wire LED driver IC.
//!
//! The IC has no registers.  It counts falling/rising edge pairs on its
//! enable line into a 4-bit step counter: step 0 is full brightness,
//! step 15 is off.  The counter only counts up and wraps mod 16, so
//! dimming down means pulsing around the wrap.  Nothing is read back;
//! the controller's idea of the current step is all there is.
//!
//! ```text
//!   producers ── set_brightness ──▶ queue(4) ──▶ worker ── pulses ──▶ EN pin
//!   (UI, boot)   try_send / drop                 block_on(receive)
//! ```

pub mod controller;
pub mod queue;

use std::thread::JoinHandle;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::BoardConfig;
use crate::drivers::task_pin::{self, Core};
use crate::error;

pub use controller::BacklightPulseController;
pub use queue::{BacklightCommand, BrightnessCommandQueue, BrightnessReceiver, BrightnessSender};

/// Counter modulus of the IC.
pub const STEP_COUNT: u8 = 16;

/// A position of the IC's internal counter, 0..=15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BacklightStep(u8);

impl BacklightStep {
    /// Standby: lamp off, counter parked.
    pub const OFF: Self = Self(STEP_COUNT - 1);
    pub const BRIGHTEST: Self = Self(0);

    pub fn new(raw: u8) -> Option<Self> {
        (raw < STEP_COUNT).then_some(Self(raw))
    }

    /// `floor((100 - percent) / 6.6)`, with `percent` clamped to 100.
    pub fn from_percent(percent: u8) -> Self {
        let dim = u16::from(100 - percent.min(100));
        // x / 6.6 == x * 5 / 33, kept in integers so the floor is exact.
        Self((dim * 5 / 33) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_off(self) -> bool {
        self == Self::OFF
    }
}

/// What the controller has to put on the wire to move between two steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: BacklightStep,
    pub to: BacklightStep,
    /// Wake sequence before pulsing (leaving standby).
    pub wake: bool,
    pub pulses: u8,
}

impl Transition {
    pub fn plan(from: BacklightStep, to: BacklightStep) -> Self {
        if to.is_off() {
            // Holding the line low is enough to go dark.
            return Self {
                from,
                to,
                wake: false,
                pulses: 0,
            };
        }

        let pulses = match to.0.cmp(&from.0) {
            core::cmp::Ordering::Greater => to.0 - from.0,
            core::cmp::Ordering::Less => STEP_COUNT - (from.0 - to.0),
            core::cmp::Ordering::Equal => 0,
        };

        Self {
            from,
            to,
            wake: from.is_off(),
            pulses,
        }
    }

    pub fn turns_off(&self) -> bool {
        self.to.is_off()
    }
}

/// Start the backlight worker on the application core.
///
/// The thread drains `commands` until the sender side is closed and
/// hands the controller back through the join handle.
pub fn spawn_worker<P, D>(
    controller: BacklightPulseController<P, D>,
    commands: BrightnessReceiver,
    config: &BoardConfig,
) -> error::Result<JoinHandle<BacklightPulseController<P, D>>>
where
    P: OutputPin + Send + 'static,
    D: DelayNs + Send + 'static,
{
    task_pin::spawn_on_core(
        Core::App,
        config.backlight_worker_priority,
        config.backlight_worker_stack_kb,
        "backlight\0",
        move || controller.run(commands),
    )
}
