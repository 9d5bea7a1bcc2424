//! Fuzz target: level anchors and interpolation
//!
//! Drives `LevelTable::new` with arbitrary anchors and, for accepted
//! tables, probes the interpolator with arbitrary f32 bit patterns
//! (NaN and infinities included).  The result must always be 0..=100.
//!
//! cargo fuzz run fuzz_level_table

#![no_main]

use libfuzzer_sys::fuzz_target;
use tftbox::battery::level::{LevelAnchor, LevelInterpolator, LevelTable};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let probe = f32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let anchors: Vec<LevelAnchor> = data[4..]
        .chunks_exact(3)
        .map(|c| LevelAnchor::new(u16::from_le_bytes([c[0], c[1]]), c[2]))
        .collect();

    if let Ok(table) = LevelTable::new(&anchors) {
        let level = LevelInterpolator::new(table).percent(probe);
        assert!(level <= 100, "level {level} out of range");
    }

    let reference = LevelInterpolator::default().percent(probe);
    assert!(reference <= 100);
});
