//! Battery telemetry through the board: sampler, corrector, interpolator,
//! published status and emitted events.

use tftbox::adapters::hardware::{sim_set_adc_failing, sim_set_adc_pin_mv, AdcMillivoltReader};
use tftbox::app::board::{Board, BatteryReport};
use tftbox::backlight::BrightnessCommandQueue;
use tftbox::battery::level::LevelAnchor;
use tftbox::battery::sampler::{BatterySampler, WINDOW_LEN};
use tftbox::config::BoardConfig;
use tftbox::drivers::hw_timer;
use tftbox::error::{Error, SensorError, TableError};
use tftbox::events::{drain_events, Event};

use crate::mock_hw::{ChargeLine, RecordingSink, ScriptedReader};

fn board_with(
    config: &BoardConfig,
    reader: ScriptedReader,
    line: &ChargeLine,
) -> Board<ScriptedReader, ChargeLine> {
    let (tx, _rx) = BrightnessCommandQueue::split();
    let sampler = BatterySampler::from_config(config, reader, Some(line.clone())).unwrap();
    Board::new(config, sampler, tx)
}

#[test]
fn eleven_samples_keep_the_last_ten() {
    // 3500, 3510, ... 3600: the first sample must fall out.
    let samples: Vec<u16> = (0..11).map(|i| 3500 + i * 10).collect();
    let config = BoardConfig::default();
    let line = ChargeLine::new();
    let mut board = board_with(&config, ScriptedReader::millivolts(&samples), &line);
    let mut sink = RecordingSink::default();

    for _ in 0..11 {
        board.on_battery_tick(&mut sink);
    }

    let t = board.telemetry();
    assert_eq!(t.window_len, WINDOW_LEN);
    assert!((t.mean_mv - 3555.0).abs() < 1e-3);
    // 3555 in the 3540..3756 bracket: 40 + 15/216*20 = 41.4
    assert_eq!(board.level(), 41);
    assert!(board.is_discharging());
}

#[test]
fn plugging_in_applies_charge_correction() {
    let config = BoardConfig::default();
    let line = ChargeLine::new();
    let mut board = board_with(&config, ScriptedReader::millivolts(&[3540]), &line);
    let mut sink = RecordingSink::default();

    board.on_battery_tick(&mut sink);
    // Resting 3540 reads 40%.
    assert_eq!(board.level(), 40);

    line.plug_in();
    board.on_battery_tick(&mut sink);
    // Charging 3540 corrects to 3442 → 29%.
    assert_eq!(board.telemetry().effective_mv, 3442.0);
    assert_eq!(
        board.battery_report(),
        BatteryReport {
            level: 29,
            charging: true,
            discharging: false,
        }
    );

    line.unplug();
    board.on_battery_tick(&mut sink);
    assert_eq!(board.level(), 40);
    assert_eq!(sink.charging_changes(), vec![true, false]);
}

#[test]
fn read_failures_keep_the_published_level() {
    let config = BoardConfig::default();
    let line = ChargeLine::new();
    let reader = ScriptedReader::new([
        Ok(3756),
        Err(SensorError::AdcReadFailed),
        Err(SensorError::CalibrationFailed),
    ]);
    let mut board = board_with(&config, reader, &line);
    let status = board.status();
    let mut sink = RecordingSink::default();

    for _ in 0..3 {
        board.on_battery_tick(&mut sink);
        assert_eq!(status.level(), 60);
    }
    assert_eq!(board.telemetry().window_len, 1);
}

#[test]
fn telemetry_follows_configured_interval() {
    let mut config = BoardConfig::default();
    config.telemetry_interval_secs = 5;
    let line = ChargeLine::new();
    let mut board = board_with(&config, ScriptedReader::millivolts(&[3942]), &line);
    let mut sink = RecordingSink::default();

    for _ in 0..12 {
        board.on_battery_tick(&mut sink);
    }
    let telem = sink.telemetry();
    assert_eq!(telem.len(), 2);
    assert!(telem.iter().all(|t| t.level == 80 && t.discharging && !t.charging));
    assert_eq!(board.tick_count(), 12);
}

#[test]
fn readers_on_other_threads_see_published_state() {
    let config = BoardConfig::default();
    let line = ChargeLine::new();
    line.plug_in();
    let mut board = board_with(&config, ScriptedReader::millivolts(&[3800]), &line);
    let status = board.status();

    let reader = std::thread::spawn(move || {
        // Either nothing yet or a consistent charging snapshot.
        loop {
            let s = status.snapshot();
            if s.smoothed_level != 0 {
                assert!(s.is_charging);
                return s.smoothed_level;
            }
            std::thread::yield_now();
        }
    });
    board.on_battery_tick(&mut RecordingSink::default());
    assert_eq!(reader.join().unwrap(), board.level());
}

#[test]
fn bad_anchor_config_is_rejected() {
    let mut config = BoardConfig::default();
    config.level_anchors.clear();
    config.level_anchors.push(LevelAnchor::new(3000, 0)).unwrap();
    config.level_anchors.push(LevelAnchor::new(3000, 100)).unwrap();

    let result = BatterySampler::from_config(
        &config,
        ScriptedReader::millivolts(&[]),
        Some(ChargeLine::new()),
    );
    assert!(matches!(
        result,
        Err(Error::Table(TableError::NotAscending { index: 1 }))
    ));
}

#[test]
fn timer_tick_drives_sim_adc_through_board() {
    // Only test in this binary touching the sim ADC or the event queue.
    let config = BoardConfig::default();
    sim_set_adc_failing(false);
    sim_set_adc_pin_mv(1_878); // x2 divider → 3756 mV → 60 %

    let adc = AdcMillivoltReader::new(tftbox::pins::BATTERY_ADC_GPIO, config.divider_ratio).unwrap();
    let (tx, _rx) = BrightnessCommandQueue::split();
    let sampler = BatterySampler::from_config(&config, adc, Some(ChargeLine::new())).unwrap();
    let mut board = Board::new(&config, sampler, tx);
    let mut sink = RecordingSink::default();

    hw_timer::start_timers(config.battery_sample_interval_ms);
    assert!(hw_timer::sim_fire());
    assert!(hw_timer::sim_fire());
    drain_events(|event| match event {
        Event::BatteryTick => {
            board.on_battery_tick(&mut sink);
        }
    });
    assert_eq!(board.tick_count(), 2);
    assert_eq!(board.level(), 60);

    sim_set_adc_failing(true);
    assert!(hw_timer::sim_fire());
    drain_events(|_| {
        board.on_battery_tick(&mut sink);
    });
    assert_eq!(board.level(), 60);
    assert_eq!(board.telemetry().window_len, 2);
    sim_set_adc_failing(false);
    hw_timer::stop_timers();
}
