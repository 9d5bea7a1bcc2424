//! Mock hardware for integration tests.
//!
//! Records every edge and delay on the backlight line so tests can assert
//! on the full wire history, and scripts the battery side (millivolt reads,
//! charge-detect level) without touching real GPIO or ADC registers.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use tftbox::app::events::AppEvent;
use tftbox::app::ports::{EventSink, MillivoltReader};
use tftbox::config::PulseTiming;
use tftbox::error::SensorError;

// ── Wire trace ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trace {
    Low,
    High,
    WaitUs(u32),
}

/// Shared recording of everything put on the backlight line.
#[derive(Clone, Default)]
pub struct Wire(Arc<Mutex<Vec<Trace>>>);

#[allow(dead_code)]
impl Wire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin(&self) -> RecordingPin {
        RecordingPin(self.clone())
    }

    pub fn delay(&self) -> RecordingDelay {
        RecordingDelay(self.clone())
    }

    pub fn snapshot(&self) -> Vec<Trace> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    fn push(&self, t: Trace) {
        self.0.lock().unwrap().push(t);
    }

    /// Counting pulses with the given timing.
    pub fn pulses(&self, timing: &PulseTiming) -> usize {
        count(
            &self.snapshot(),
            [
                Trace::Low,
                Trace::WaitUs(timing.pulse_low_us),
                Trace::High,
                Trace::WaitUs(timing.pulse_high_us),
            ],
        )
    }

    /// Wake sequences with the given timing.
    pub fn wakes(&self, timing: &PulseTiming) -> usize {
        count(
            &self.snapshot(),
            [
                Trace::Low,
                Trace::WaitUs(timing.wake_low_us),
                Trace::High,
                Trace::WaitUs(timing.wake_high_us),
            ],
        )
    }

    /// Level the line was left at, if it was ever driven.
    pub fn level(&self) -> Option<bool> {
        self.snapshot().iter().rev().find_map(|t| match t {
            Trace::Low => Some(false),
            Trace::High => Some(true),
            Trace::WaitUs(_) => None,
        })
    }
}

fn count(trace: &[Trace], pattern: [Trace; 4]) -> usize {
    trace.windows(4).filter(|w| *w == pattern).count()
}

pub struct RecordingPin(Wire);

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.push(Trace::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.push(Trace::High);
        Ok(())
    }
}

pub struct RecordingDelay(Wire);

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.push(Trace::WaitUs(ns / 1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.0.push(Trace::WaitUs(us));
    }
}

/// Output pin whose every write fails.
pub struct BrokenPin;

#[derive(Debug)]
pub struct BrokenPinError;

impl embedded_hal::digital::Error for BrokenPinError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl ErrorType for BrokenPin {
    type Error = BrokenPinError;
}

impl OutputPin for BrokenPin {
    fn set_low(&mut self) -> Result<(), BrokenPinError> {
        Err(BrokenPinError)
    }

    fn set_high(&mut self) -> Result<(), BrokenPinError> {
        Err(BrokenPinError)
    }
}

// ── Battery side ──────────────────────────────────────────────

/// Replays a script of reads; repeats the last entry once exhausted.
pub struct ScriptedReader {
    script: VecDeque<Result<u16, SensorError>>,
    last: Result<u16, SensorError>,
}

#[allow(dead_code)]
impl ScriptedReader {
    pub fn new(script: impl IntoIterator<Item = Result<u16, SensorError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: Err(SensorError::AdcReadFailed),
        }
    }

    pub fn millivolts(samples: &[u16]) -> Self {
        Self::new(samples.iter().map(|&mv| Ok(mv)))
    }
}

impl MillivoltReader for ScriptedReader {
    fn read_millivolts(&mut self) -> Result<u16, SensorError> {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }
}

/// Charge-detect line the test can flip from outside.  Stores the
/// electrical level; the board wiring is active-low.
#[derive(Clone)]
pub struct ChargeLine(Arc<AtomicBool>);

#[allow(dead_code)]
impl ChargeLine {
    /// Starts HIGH (not charging).
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn plug_in(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn unplug(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl ErrorType for ChargeLine {
    type Error = Infallible;
}

impl InputPin for ChargeLine {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.load(Ordering::SeqCst))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.load(Ordering::SeqCst))
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn telemetry(&self) -> Vec<&tftbox::app::events::TelemetryData> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Telemetry(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn charging_changes(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ChargingChanged { charging } => Some(*charging),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
