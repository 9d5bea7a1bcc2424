//! Hardware tick timer using ESP-IDF's esp_timer API.
//!
//! One periodic timer pushes [`Event::BatteryTick`] into the lock-free
//! event queue.  The callback runs in the ESP timer task (not ISR), and
//! `skip_unhandled_events` collapses missed periods instead of bursting,
//! so ticks never overlap.  On host targets the main loop drives ticks
//! itself.

use crate::events::{push_event, Event};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static BATTERY_TIMER: core::sync::atomic::AtomicPtr<esp_timer> =
    core::sync::atomic::AtomicPtr::new(core::ptr::null_mut());

#[cfg(target_os = "espidf")]
unsafe extern "C" fn battery_tick_cb(_arg: *mut core::ffi::c_void) {
    on_battery_period();
}

/// Timer-side work for one sampling period.
fn on_battery_period() -> bool {
    let queued = push_event(Event::BatteryTick);
    if !queued {
        log::debug!("hw_timer: event queue full, battery tick skipped");
    }
    queued
}

/// Start the battery sampling timer with the given period.
#[cfg(target_os = "espidf")]
pub fn start_timers(period_ms: u32) {
    // SAFETY: BATTERY_TIMER is written once here at boot from the main task
    // before the callback can fire.  The callback only pushes to the queue.
    unsafe {
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        let args = esp_timer_create_args_t {
            callback: Some(battery_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"battery_check".as_ptr(),
            skip_unhandled_events: true,
        };
        let ret = esp_timer_create(&args, &mut handle);
        if ret != ESP_OK as i32 {
            log::error!("hw_timer: battery timer create failed (rc={}), continuing without ticks", ret);
            return;
        }
        let ret = esp_timer_start_periodic(handle, u64::from(period_ms) * 1_000);
        if ret != ESP_OK as i32 {
            log::error!("hw_timer: battery timer start failed (rc={})", ret);
            esp_timer_delete(handle);
            return;
        }
        BATTERY_TIMER.store(handle, core::sync::atomic::Ordering::Release);
        info!("hw_timer: battery@{}ms started", period_ms);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers(period_ms: u32) {
    log::info!(
        "hw_timer(sim): timer not started, caller ticks every {}ms",
        period_ms
    );
}

/// Stop and delete the battery timer.
#[cfg(target_os = "espidf")]
pub fn stop_timers() {
    let handle = BATTERY_TIMER.swap(core::ptr::null_mut(), core::sync::atomic::Ordering::AcqRel);
    if handle.is_null() {
        return;
    }
    // SAFETY: the handle came from a successful esp_timer_create and was
    // swapped out above, so it is stopped and deleted exactly once.
    unsafe {
        esp_timer_stop(handle);
        esp_timer_delete(handle);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_timers() {}

/// Host stand-in for one timer period.
#[cfg(not(target_os = "espidf"))]
pub fn sim_fire() -> bool {
    on_battery_period()
}
