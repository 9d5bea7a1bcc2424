//! Battery telemetry: sampling and level mapping.
//!
//! ```text
//!  MillivoltReader ──▶ window(10) ──▶ mean ──▶ [charging? corrector] ──▶ interpolator
//!                                                                         │
//!  charge-detect pin ─────────────────────────────────────────────────────┤
//!                                                                         ▼
//!                                                    BatteryStatus (one atomic store)
//! ```
//!
//! The [`sampler::BatterySampler`] is the single writer.  Any number of
//! [`BatteryStatus`] clones read the latest published snapshot lock-free.

pub mod calibration;
pub mod level;
pub mod sampler;

use core::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

const LEVEL_MASK: u16 = 0x00FF;
const CHARGING_BIT: u16 = 0x0100;

/// Snapshot produced once per sampling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatteryState {
    /// Raw charge-detect reading (before the full-battery override).
    pub is_charging: bool,
    /// 0..=100
    pub smoothed_level: u8,
}

impl BatteryState {
    /// Charging as shown to the user: a full battery never reports charging.
    pub fn shows_charging(self) -> bool {
        self.is_charging && self.smoothed_level != 100
    }

    /// No separate idle state: anything not charging counts as discharging.
    pub fn is_discharging(self) -> bool {
        !self.is_charging
    }

    fn pack(self) -> u16 {
        let level = u16::from(self.smoothed_level.min(100));
        if self.is_charging {
            level | CHARGING_BIT
        } else {
            level
        }
    }

    fn unpack(raw: u16) -> Self {
        Self {
            is_charging: raw & CHARGING_BIT != 0,
            smoothed_level: (raw & LEVEL_MASK) as u8,
        }
    }
}

/// Read side of the published battery state.
///
/// Cloning is cheap; every clone observes the same cell.  A reader sees
/// either the previous or the latest tick, never a mix of the two.
#[derive(Debug, Clone, Default)]
pub struct BatteryStatus {
    cell: Arc<AtomicU16>,
}

impl BatteryStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn publish(&self, state: BatteryState) {
        self.cell.store(state.pack(), Ordering::Release);
    }

    /// Latest published snapshot, raw charging flag included.
    pub fn snapshot(&self) -> BatteryState {
        BatteryState::unpack(self.cell.load(Ordering::Acquire))
    }

    pub fn level(&self) -> u8 {
        self.snapshot().smoothed_level
    }

    /// See [`BatteryState::shows_charging`].
    pub fn is_charging(&self) -> bool {
        self.snapshot().shows_charging()
    }

    pub fn is_discharging(&self) -> bool {
        self.snapshot().is_discharging()
    }
}
