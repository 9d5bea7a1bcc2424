//! Fuzz target: `BoardConfig::from_json`
//!
//! Arbitrary bytes must never panic the parser, and any accepted config
//! must pass its own validation again and yield a usable telemetry divider.
//!
//! cargo fuzz run fuzz_board_config

#![no_main]

use libfuzzer_sys::fuzz_target;
use tftbox::config::BoardConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = BoardConfig::from_json(text) {
        assert!(config.validate().is_ok());
        assert!(config.ticks_per_telemetry() >= 1);
        assert!(config.default_brightness_percent <= 100);
    }
});
