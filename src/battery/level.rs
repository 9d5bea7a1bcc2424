//! Voltage → charge-percent mapping.
//!
//! A handful of (millivolt, percent) anchors describe the resting discharge
//! curve of the cell.  Between two anchors the percent is linearly
//! interpolated; below the first anchor the battery is empty and at or
//! above the last it is full.

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Upper bound on anchors a [`LevelTable`] can hold.
pub const MAX_ANCHORS: usize = 8;

/// One calibration point of the discharge curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelAnchor {
    pub mv: u16,
    pub percent: u8,
}

impl LevelAnchor {
    pub const fn new(mv: u16, percent: u8) -> Self {
        Self { mv, percent }
    }
}

/// Validated, immutable anchor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    anchors: heapless::Vec<LevelAnchor, MAX_ANCHORS>,
}

impl LevelTable {
    /// Measured on the stock 1S Li-ion pack.
    const REFERENCE: [LevelAnchor; 6] = [
        LevelAnchor::new(3100, 0),
        LevelAnchor::new(3359, 20),
        LevelAnchor::new(3540, 40),
        LevelAnchor::new(3756, 60),
        LevelAnchor::new(3942, 80),
        LevelAnchor::new(4120, 100),
    ];

    /// Build a table, rejecting anything the interpolation cannot rely on.
    pub fn new(anchors: &[LevelAnchor]) -> Result<Self, TableError> {
        if anchors.len() < 2 {
            return Err(TableError::TooFewPoints);
        }
        let anchors: heapless::Vec<LevelAnchor, MAX_ANCHORS> =
            heapless::Vec::from_slice(anchors).map_err(|()| TableError::TooManyPoints)?;

        for (index, pair) in anchors.windows(2).enumerate() {
            let index = index + 1;
            if pair[1].mv <= pair[0].mv {
                return Err(TableError::NotAscending { index });
            }
            if pair[1].percent > 100 {
                return Err(TableError::PercentOutOfRange { index });
            }
            if pair[1].percent < pair[0].percent {
                return Err(TableError::PercentDecreasing { index });
            }
        }

        let first = anchors[0];
        let last = anchors[anchors.len() - 1];
        if first.percent != 0 || last.percent != 100 {
            return Err(TableError::BadEndpoints);
        }

        Ok(Self { anchors })
    }

    /// The six reference anchors, ready to drop into a config.
    pub fn reference_anchors() -> heapless::Vec<LevelAnchor, MAX_ANCHORS> {
        let mut v = heapless::Vec::new();
        for a in Self::REFERENCE {
            // REFERENCE.len() < MAX_ANCHORS
            let _ = v.push(a);
        }
        v
    }

    pub fn reference() -> Self {
        Self {
            anchors: Self::reference_anchors(),
        }
    }

    pub fn anchors(&self) -> &[LevelAnchor] {
        &self.anchors
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::reference()
    }
}

/// Pure lookup over a [`LevelTable`].
#[derive(Debug, Clone, Default)]
pub struct LevelInterpolator {
    table: LevelTable,
}

impl LevelInterpolator {
    pub fn new(table: LevelTable) -> Self {
        Self { table }
    }

    /// Map millivolts to 0..=100 percent, truncating toward zero.
    pub fn percent(&self, mv: f32) -> u8 {
        let anchors = self.table.anchors();
        let first = anchors[0];
        let last = anchors[anchors.len() - 1];

        if mv.is_nan() || mv < f32::from(first.mv) {
            return 0;
        }
        if mv >= f32::from(last.mv) {
            return 100;
        }

        for pair in anchors.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            let lo_mv = f32::from(lo.mv);
            let hi_mv = f32::from(hi.mv);
            if mv >= lo_mv && mv < hi_mv {
                let ratio = (mv - lo_mv) / (hi_mv - lo_mv);
                let span = f32::from(hi.percent - lo.percent);
                let level = f32::from(lo.percent) + ratio * span;
                return level.clamp(0.0, 100.0) as u8;
            }
        }

        // Unreachable for a validated table: the brackets cover [first, last).
        100
    }
}
