//! GPIO / peripheral pin assignments for the 2.0" TFT box board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Display backlight (single-wire 16-step LED driver)
// ---------------------------------------------------------------------------

/// Digital output: EN line of the backlight IC.  Held LOW at boot (standby).
pub const BACKLIGHT_GPIO: i32 = 42;

// ---------------------------------------------------------------------------
// Battery
// ---------------------------------------------------------------------------

/// Battery voltage through the on-board divider.  ADC1 channel 0 on the S3.
pub const BATTERY_ADC_GPIO: i32 = 1;

/// Digital input: charger status output.  LOW while charging.
pub const CHARGE_DETECT_GPIO: i32 = 2;
