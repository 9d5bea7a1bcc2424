//! Hardware adapter: bridges real peripherals to the domain ports.
//!
//! This is the only module besides `drivers` that touches hardware.
//! It provides:
//!
//! - [`GpioOutput`] / [`GpioInput`]: `embedded-hal` pins over the
//!   `hw_init` GPIO helpers (backlight EN, charge detect).
//! - [`AdcMillivoltReader`]: [`MillivoltReader`] over the ADC oneshot
//!   driver with curve-fitting calibration and divider compensation.
//! - [`PulseDelay`]: the microsecond delay used between backlight edges.
//!
//! On non-espidf targets the same types run against simulation state so
//! the composition in `main` can be exercised on the host.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::app::ports::MillivoltReader;
use crate::drivers::hw_init::{self, HwInitError};
use crate::error::SensorError;

// ── Digital lines ─────────────────────────────────────────────

/// Push-pull output configured by `hw_init`.
#[derive(Debug)]
pub struct GpioOutput {
    gpio: i32,
}

impl GpioOutput {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for GpioOutput {
    type Error = Infallible;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Infallible> {
        hw_init::gpio_write(self.gpio, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        hw_init::gpio_write(self.gpio, true);
        Ok(())
    }
}

/// Floating input configured by `hw_init`.
#[derive(Debug)]
pub struct GpioInput {
    gpio: i32,
}

impl GpioInput {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for GpioInput {
    type Error = Infallible;
}

impl InputPin for GpioInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(hw_init::gpio_read(self.gpio))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!hw_init::gpio_read(self.gpio))
    }
}

// ── Edge timing ───────────────────────────────────────────────

/// ROM busy-wait delay; precise at microsecond scale and never yields.
#[cfg(target_os = "espidf")]
pub type PulseDelay = esp_idf_hal::delay::Ets;

#[cfg(target_os = "espidf")]
pub fn pulse_delay() -> PulseDelay {
    esp_idf_hal::delay::Ets
}

/// Host stand-in for the ROM delay.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct PulseDelay;

#[cfg(not(target_os = "espidf"))]
pub fn pulse_delay() -> PulseDelay {
    PulseDelay
}

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::delay::DelayNs for PulseDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(core::time::Duration::from_nanos(u64::from(ns)));
    }
}

// ── Battery voltage ───────────────────────────────────────────

/// Scale a calibrated ADC-pin voltage up to the battery terminal voltage.
pub fn compensate_divider(pin_mv: i32, divider_ratio: u16) -> Result<u16, SensorError> {
    if pin_mv < 0 {
        return Err(SensorError::CalibrationFailed);
    }
    let mv = (pin_mv as u32).saturating_mul(u32::from(divider_ratio));
    Ok(mv.min(u32::from(u16::MAX)) as u16)
}

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Battery voltage through the ADC oneshot driver.
///
/// 12 dB attenuation, 12-bit width, curve-fitting calibration.  The
/// unit and calibration scheme are released on drop.
#[cfg(target_os = "espidf")]
pub struct AdcMillivoltReader {
    unit: adc_oneshot_unit_handle_t,
    channel: adc_channel_t,
    cali: adc_cali_handle_t,
    divider_ratio: u16,
}

#[cfg(target_os = "espidf")]
impl AdcMillivoltReader {
    pub fn new(gpio: i32, divider_ratio: u16) -> Result<Self, HwInitError> {
        let mut unit_id: adc_unit_t = 0;
        let mut channel: adc_channel_t = 0;
        let mut unit: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        let mut cali: adc_cali_handle_t = core::ptr::null_mut();

        // SAFETY: out-pointers reference locals; called once at boot from
        // the main task before anything else claims the ADC unit.
        unsafe {
            let ret = adc_oneshot_io_to_channel(gpio, &mut unit_id, &mut channel);
            if ret != ESP_OK as i32 {
                return Err(HwInitError::AdcInitFailed(ret));
            }

            let init_cfg = adc_oneshot_unit_init_cfg_t {
                unit_id,
                ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                ..Default::default()
            };
            let ret = adc_oneshot_new_unit(&init_cfg, &mut unit);
            if ret != ESP_OK as i32 {
                return Err(HwInitError::AdcInitFailed(ret));
            }

            let chan_cfg = adc_oneshot_chan_cfg_t {
                atten: adc_atten_t_ADC_ATTEN_DB_12,
                bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
            };
            let ret = adc_oneshot_config_channel(unit, channel, &chan_cfg);
            if ret != ESP_OK as i32 {
                adc_oneshot_del_unit(unit);
                return Err(HwInitError::AdcInitFailed(ret));
            }

            let cali_cfg = adc_cali_curve_fitting_config_t {
                unit_id,
                chan: channel,
                atten: adc_atten_t_ADC_ATTEN_DB_12,
                bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
                ..Default::default()
            };
            let ret = adc_cali_create_scheme_curve_fitting(&cali_cfg, &mut cali);
            if ret != ESP_OK as i32 {
                adc_oneshot_del_unit(unit);
                return Err(HwInitError::AdcCalibrationFailed(ret));
            }
        }

        log::info!(
            "hardware: battery ADC on GPIO{} (unit={}, ch={}, divider x{})",
            gpio,
            unit_id,
            channel,
            divider_ratio
        );
        Ok(Self {
            unit,
            channel,
            cali,
            divider_ratio,
        })
    }
}

#[cfg(target_os = "espidf")]
impl MillivoltReader for AdcMillivoltReader {
    fn read_millivolts(&mut self) -> Result<u16, SensorError> {
        let mut raw: i32 = 0;
        let mut pin_mv: i32 = 0;
        // SAFETY: handles were created in `new` and live until drop; the
        // reader is owned by the main loop only.
        unsafe {
            if adc_oneshot_read(self.unit, self.channel, &mut raw) != ESP_OK as i32 {
                return Err(SensorError::AdcReadFailed);
            }
            if adc_cali_raw_to_voltage(self.cali, raw, &mut pin_mv) != ESP_OK as i32 {
                return Err(SensorError::CalibrationFailed);
            }
        }
        compensate_divider(pin_mv, self.divider_ratio)
    }
}

#[cfg(target_os = "espidf")]
impl Drop for AdcMillivoltReader {
    fn drop(&mut self) {
        // SAFETY: both handles came from successful create calls in `new`.
        unsafe {
            adc_cali_delete_scheme_curve_fitting(self.cali);
            adc_oneshot_del_unit(self.unit);
        }
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, AtomicI32};

    /// Calibrated ADC-pin voltage (before divider compensation).
    pub static PIN_MV: AtomicI32 = AtomicI32::new(1_900);
    pub static FAIL: AtomicBool = AtomicBool::new(false);
}

/// Set the simulated voltage at the ADC pin, in millivolts.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc_pin_mv(mv: i32) {
    sim::PIN_MV.store(mv, core::sync::atomic::Ordering::Relaxed);
}

/// Make subsequent simulated ADC reads fail.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc_failing(failing: bool) {
    sim::FAIL.store(failing, core::sync::atomic::Ordering::Relaxed);
}

/// Host reader backed by the simulation statics above.
#[cfg(not(target_os = "espidf"))]
pub struct AdcMillivoltReader {
    divider_ratio: u16,
}

#[cfg(not(target_os = "espidf"))]
impl AdcMillivoltReader {
    pub fn new(gpio: i32, divider_ratio: u16) -> Result<Self, HwInitError> {
        log::info!("hardware(sim): battery ADC on GPIO{} (divider x{})", gpio, divider_ratio);
        Ok(Self { divider_ratio })
    }
}

#[cfg(not(target_os = "espidf"))]
impl MillivoltReader for AdcMillivoltReader {
    fn read_millivolts(&mut self) -> Result<u16, SensorError> {
        use core::sync::atomic::Ordering;
        if sim::FAIL.load(Ordering::Relaxed) {
            return Err(SensorError::AdcReadFailed);
        }
        compensate_divider(sim::PIN_MV.load(Ordering::Relaxed), self.divider_ratio)
    }
}
