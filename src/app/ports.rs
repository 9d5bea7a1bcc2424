//! Port traits: the boundary between the board logic and the platform.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BatterySampler / Board (domain)
//! ```
//!
//! Digital lines use the `embedded-hal` 1.0 traits directly:
//! `InputPin` for charge detect, `OutputPin` + `DelayNs` for the
//! backlight line.  The two capabilities `embedded-hal` has no trait for
//! live here.

use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Battery voltage port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Calibrated battery voltage source.
///
/// Implementations own the ADC channel, the raw→millivolt calibration and
/// the external divider compensation.  The returned value is the battery
/// terminal voltage.
pub trait MillivoltReader {
    fn read_millivolts(&mut self) -> Result<u16, SensorError>;
}

impl<T: MillivoltReader + ?Sized> MillivoltReader for &mut T {
    fn read_millivolts(&mut self) -> Result<u16, SensorError> {
        (**self).read_millivolts()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The board emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
