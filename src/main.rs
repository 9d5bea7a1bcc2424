//! TFT-box firmware entry point.
//!
//! Composition root: owns every device handle for the process lifetime.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Adapters: GpioOutput · GpioInput · AdcMillivoltReader        │
//! │            PulseDelay · LogEventSink                          │
//! │  ─────────────── Port / embedded-hal boundary ──────────────  │
//! │  Board (sampler · brightness sender)     backlight worker     │
//! │      ▲ BatteryTick                          ▲ queue(4)        │
//! │  esp_timer (1 Hz)                        core 1, pri 20       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use tftbox::adapters::hardware::{pulse_delay, AdcMillivoltReader, GpioInput, GpioOutput};
use tftbox::adapters::log_sink::LogEventSink;
use tftbox::app::board::Board;
use tftbox::backlight::{self, BacklightPulseController, BrightnessCommandQueue};
use tftbox::battery::sampler::BatterySampler;
use tftbox::config::BoardConfig;
use tftbox::drivers::{hw_init, hw_timer};
use tftbox::events::{drain_events, Event};
use tftbox::pins;

/// Main loop idle between event drains.  Well under the tick period.
const IDLE_SLEEP: Duration = Duration::from_millis(50);

fn load_config() -> BoardConfig {
    match option_env!("TFTBOX_BOARD_CONFIG") {
        Some(json) => match BoardConfig::from_json(json) {
            Ok(cfg) => {
                info!("Config: build-time override applied");
                cfg
            }
            Err(e) => {
                warn!("Config: build-time override rejected ({}), using defaults", e);
                BoardConfig::default()
            }
        },
        None => BoardConfig::default(),
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("TFT-box v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config();

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().context("peripheral init")?;
    let adc = AdcMillivoltReader::new(pins::BATTERY_ADC_GPIO, config.divider_ratio)
        .context("battery ADC init")?;

    // ── 3. Backlight worker ───────────────────────────────────
    let mut controller = BacklightPulseController::new(
        GpioOutput::new(pins::BACKLIGHT_GPIO),
        pulse_delay(),
        config.pulse_timing,
    );
    controller.init()?;
    let (tx, rx) = BrightnessCommandQueue::split();
    let _worker = backlight::spawn_worker(controller, rx, &config)?;

    // ── 4. Board ──────────────────────────────────────────────
    let sampler = BatterySampler::from_config(
        &config,
        adc,
        Some(GpioInput::new(pins::CHARGE_DETECT_GPIO)),
    )?;
    let mut board = Board::new(&config, sampler, tx);
    let mut sink = LogEventSink::new();
    board.start(&mut sink);

    hw_timer::start_timers(config.battery_sample_interval_ms);
    info!("System ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    loop {
        drain_events(|event| match event {
            Event::BatteryTick => {
                board.on_battery_tick(&mut sink);
            }
        });
        std::thread::sleep(IDLE_SLEEP);
    }
}
