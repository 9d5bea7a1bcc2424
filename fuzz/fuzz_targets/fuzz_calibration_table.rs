//! Fuzz target: charge-curve table construction and lookup
//!
//! Builds a `CalibrationTable` from arbitrary (charging, resting) pairs and
//! verifies:
//! - `CalibrationTable::new` never panics and accepts only strictly
//!   ascending charging columns
//! - `correct` returns a table value, or the input unchanged above the table
//!
//! cargo fuzz run fuzz_calibration_table

#![no_main]

use libfuzzer_sys::fuzz_target;
use tftbox::battery::calibration::{CalibrationPoint, CalibrationTable, ChargeCurveCorrector};

fuzz_target!(|data: &[u8]| {
    if data.len() < 6 {
        return;
    }

    // First 2 bytes: probe voltage.  Rest: 4-byte rows.
    let probe = f32::from(u16::from_le_bytes([data[0], data[1]]));
    let points: Vec<CalibrationPoint> = data[2..]
        .chunks_exact(4)
        .map(|c| {
            CalibrationPoint::new(
                u16::from_le_bytes([c[0], c[1]]),
                u16::from_le_bytes([c[2], c[3]]),
            )
        })
        .collect();

    let ascending = points.windows(2).all(|w| w[0].charging_mv < w[1].charging_mv);
    let Ok(table) = CalibrationTable::new(&points) else {
        assert!(points.is_empty() || !ascending || points.len() > 256);
        return;
    };
    assert!(ascending, "accepted a non-ascending table");

    let last = table.points()[table.len() - 1];
    let out = ChargeCurveCorrector::new(table.clone()).correct(probe);
    if probe > f32::from(last.charging_mv) {
        assert_eq!(out, probe);
    } else {
        assert!(table.points().iter().any(|p| f32::from(p.resting_mv) == out));
    }
});
