//! Backlight worker end-to-end: queue → worker thread → wire.

use std::sync::Arc;
use std::thread;

use tftbox::adapters::hardware::{pulse_delay, GpioOutput};
use tftbox::backlight::{
    self, BacklightCommand, BacklightPulseController, BacklightStep, BrightnessCommandQueue,
    queue::QUEUE_DEPTH,
};
use tftbox::config::{BoardConfig, PulseTiming};
use tftbox::drivers::hw_init;
use tftbox::pins;

use crate::mock_hw::{BrokenPin, Trace, Wire};

fn recording_controller(wire: &Wire) -> BacklightPulseController<crate::mock_hw::RecordingPin, crate::mock_hw::RecordingDelay> {
    BacklightPulseController::new(wire.pin(), wire.delay(), PulseTiming::default())
}

#[test]
fn worker_applies_boot_brightness_and_stops_on_close() {
    let wire = Wire::new();
    let timing = PulseTiming::default();
    let mut controller = recording_controller(&wire);
    controller.init().unwrap();

    let (tx, rx) = BrightnessCommandQueue::split();
    let worker = backlight::spawn_worker(controller, rx, &BoardConfig::default()).unwrap();

    tx.set_brightness(80);
    tx.close();
    let controller = worker.join().unwrap();

    assert_eq!(controller.step().value(), 3);
    assert_eq!(controller.last_percent(), Some(80));
    assert_eq!(wire.wakes(&timing), 1);
    assert_eq!(wire.pulses(&timing), 4);
    // Boot settle first, line left high after the last pulse.
    assert_eq!(&wire.snapshot()[..2], &[Trace::Low, Trace::WaitUs(50_000)]);
    assert_eq!(wire.level(), Some(true));
}

#[test]
fn commands_queued_before_close_are_all_applied_in_order() {
    let wire = Wire::new();
    let timing = PulseTiming::default();
    let (tx, rx) = BrightnessCommandQueue::split();

    // Fill the queue before the worker exists so nothing is consumed early.
    tx.set_brightness(10); // step 13: wake + 14 pulses
    tx.set_brightness(40); // step 9: 16 - 4 = 12 pulses
    let worker =
        backlight::spawn_worker(recording_controller(&wire), rx, &BoardConfig::default()).unwrap();
    tx.close();
    tx.set_brightness(100);

    let controller = worker.join().unwrap();
    assert_eq!(controller.last_percent(), Some(40));
    assert_eq!(controller.step().value(), 9);
    assert_eq!(wire.wakes(&timing), 1);
    assert_eq!(wire.pulses(&timing), 14 + 12);
}

#[test]
fn going_dark_then_back_wakes_again() {
    let wire = Wire::new();
    let timing = PulseTiming::default();
    let (tx, rx) = BrightnessCommandQueue::split();
    tx.set_brightness(50);
    tx.set_brightness(0);
    tx.set_brightness(50);
    tx.close();

    let controller = recording_controller(&wire).run(rx);
    assert_eq!(controller.step(), BacklightStep::from_percent(50));
    assert_eq!(wire.wakes(&timing), 2);
    // 50% is step 7: 8 pulses out of standby, twice.
    assert_eq!(wire.pulses(&timing), 16);
}

#[test]
fn resync_replays_last_brightness() {
    let wire = Wire::new();
    let timing = PulseTiming::default();
    let (tx, rx) = BrightnessCommandQueue::split();
    tx.set_brightness(95);
    tx.request_resync();
    tx.close();

    let controller = recording_controller(&wire).run(rx);
    assert_eq!(controller.step(), BacklightStep::BRIGHTEST);
    let trace = wire.snapshot();
    let hold = trace
        .iter()
        .position(|t| *t == Trace::WaitUs(timing.standby_hold_us))
        .expect("standby hold on the wire");
    assert_eq!(trace[hold - 1], Trace::Low);
    assert_eq!(wire.wakes(&timing), 2);
    assert_eq!(wire.pulses(&timing), 2);
}

#[test]
fn concurrent_producers_never_exceed_queue_depth() {
    let (tx, rx) = BrightnessCommandQueue::split();
    let producers: Vec<_> = (0..8u8)
        .map(|p| {
            let tx = tx.clone();
            thread::spawn(move || {
                for i in 0..10u8 {
                    tx.set_brightness(p * 10 + i);
                    assert!(tx.pending() <= QUEUE_DEPTH);
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }

    assert_eq!(tx.pending(), QUEUE_DEPTH);
    assert_eq!(tx.dropped(), 80 - QUEUE_DEPTH as u32);
    let mut drained = 0;
    while let Some(cmd) = rx.try_recv() {
        assert!(matches!(cmd, BacklightCommand::Brightness(p) if p <= 100));
        drained += 1;
    }
    assert_eq!(drained, QUEUE_DEPTH);
}

#[test]
fn producers_racing_a_live_worker_all_return() {
    let wire = Wire::new();
    let (tx, rx) = BrightnessCommandQueue::split();
    let worker =
        backlight::spawn_worker(recording_controller(&wire), rx, &BoardConfig::default()).unwrap();

    let tx = Arc::new(tx);
    let producers: Vec<_> = (0..4u8)
        .map(|p| {
            let tx = Arc::clone(&tx);
            thread::spawn(move || {
                for i in 0..25u8 {
                    tx.set_brightness((p * 25 + i).min(100));
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }
    tx.close();

    let controller = worker.join().unwrap();
    let applied = controller.last_percent().expect("at least one command applied");
    assert_eq!(controller.step(), BacklightStep::from_percent(applied));
}

#[test]
fn nothing_lands_behind_shutdown_when_closing_under_load() {
    for _ in 0..50 {
        let (tx, rx) = BrightnessCommandQueue::split();
        let producers: Vec<_> = (0..4u8)
            .map(|p| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for i in 0..50u8 {
                        tx.set_brightness(p * 25 + i % 25);
                    }
                })
            })
            .collect();
        tx.close();
        for p in producers {
            p.join().unwrap();
        }

        let drained: Vec<_> = std::iter::from_fn(|| rx.try_recv()).collect();
        assert_eq!(drained.last(), Some(&BacklightCommand::Shutdown));
        assert_eq!(
            drained
                .iter()
                .filter(|c| **c == BacklightCommand::Shutdown)
                .count(),
            1
        );
    }
}

#[test]
fn shutdown_with_a_dead_worker_returns() {
    let (tx, rx) = BrightnessCommandQueue::split();
    for p in 0..QUEUE_DEPTH as u8 {
        tx.set_brightness(p * 10);
    }
    // Worker exits on a panic-free path before draining anything.
    let worker = thread::spawn(move || drop(rx));
    worker.join().unwrap();

    tx.close();
    assert!(tx.is_closed());
    assert_eq!(tx.pending(), QUEUE_DEPTH);
    assert_eq!(tx.dropped(), 1);
}

#[test]
fn pin_errors_do_not_stop_the_worker() {
    let (tx, rx) = BrightnessCommandQueue::split();
    tx.set_brightness(60);
    tx.request_resync();
    tx.close();

    let wire = Wire::new();
    let controller =
        BacklightPulseController::new(BrokenPin, wire.delay(), PulseTiming::default()).run(rx);
    // Nothing applied, but the worker drained to the shutdown message.
    assert_eq!(controller.last_percent(), None);
    assert!(controller.step().is_off());
}

#[test]
fn gpio_adapter_drives_the_backlight_line() {
    hw_init::init_peripherals().unwrap();
    assert!(!hw_init::gpio_read(pins::BACKLIGHT_GPIO));

    let mut controller = BacklightPulseController::new(
        GpioOutput::new(pins::BACKLIGHT_GPIO),
        pulse_delay(),
        PulseTiming::default(),
    );
    controller.apply(100).unwrap();
    assert!(hw_init::gpio_read(pins::BACKLIGHT_GPIO));
    controller.apply(0).unwrap();
    assert!(!hw_init::gpio_read(pins::BACKLIGHT_GPIO));
}
