//! Unified error types for the TFT-box firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! bootstrap path in `main` handles failures uniformly.  All variants are
//! `Copy`; nothing here allocates.
//!
//! Runtime paths (the battery tick and the backlight worker) never hand
//! these to callers.  They log and carry on; only construction-time
//! validation and hardware bring-up return them.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The battery ADC or charge-detect input could not be read.
    Sensor(SensorError),
    /// A calibration or level table failed validation.
    Table(TableError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Table(e) => write!(f, "table: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC oneshot read returned an error.
    AdcReadFailed,
    /// Raw-to-millivolt calibration failed.
    CalibrationFailed,
    /// GPIO read returned an error.
    GpioReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::CalibrationFailed => write!(f, "ADC calibration failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Table validation errors
// ---------------------------------------------------------------------------

/// Reasons a calibration or level table is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// Fewer points than the lookup needs.
    TooFewPoints,
    /// More points than the fixed-capacity storage holds.
    TooManyPoints,
    /// The voltage column is not strictly ascending at `index`.
    NotAscending { index: usize },
    /// A percent value is above 100.
    PercentOutOfRange { index: usize },
    /// Percent values decrease at `index`.
    PercentDecreasing { index: usize },
    /// The first anchor must be 0 % and the last 100 %.
    BadEndpoints,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewPoints => write!(f, "too few points"),
            Self::TooManyPoints => write!(f, "too many points"),
            Self::NotAscending { index } => {
                write!(f, "voltage not strictly ascending at row {index}")
            }
            Self::PercentOutOfRange { index } => write!(f, "percent > 100 at row {index}"),
            Self::PercentDecreasing { index } => write!(f, "percent decreases at row {index}"),
            Self::BadEndpoints => write!(f, "anchors must run from 0% to 100%"),
        }
    }
}

impl From<TableError> for Error {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
