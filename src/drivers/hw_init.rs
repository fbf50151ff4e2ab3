//! One-shot hardware peripheral initialization.
//!
//! Configures the line outputs and the two sheet-sensor inputs, then
//! registers the sensor interrupt handlers.  Called once from `main()`
//! before the tracking runtime starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrAddFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrAddFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── GPIO Outputs ──────────────────────────────────────────────

/// Configure the run-enable and fault-indicator outputs.  The line starts
/// enabled with the fault lamp off.
#[cfg(target_os = "espidf")]
pub fn init_outputs() -> Result<(), HwInitError> {
    for &(pin, level) in &[(pins::RUN_ENABLE_GPIO, 1), (pins::FAULT_LED_GPIO, 0)] {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: called once from main() before any task touches the pins.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, level) };
    }
    info!("hw_init: line outputs configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_outputs() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): output init skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── Sensor ISRs ───────────────────────────────────────────────

/// Monotonic milliseconds, ISR-safe.
#[cfg(target_os = "espidf")]
fn isr_now_ms() -> u64 {
    // SAFETY: esp_timer_get_time is an RTC counter read; safe in ISR context.
    (unsafe { esp_timer_get_time() } / 1_000) as u64
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn infeed_gpio_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: gpio_get_level is a register read; safe in ISR context.
    let level = unsafe { gpio_get_level(pins::INFEED_GPIO) } != 0;
    crate::sensors::INFEED_INPUT.on_level(level, isr_now_ms());
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn outfeed_gpio_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: gpio_get_level is a register read; safe in ISR context.
    let level = unsafe { gpio_get_level(pins::OUTFEED_GPIO) } != 0;
    crate::sensors::OUTFEED_INPUT.on_level(level, isr_now_ms());
}

/// Configure both sensor pins as pulled-up any-edge inputs and register
/// their handlers.  Call after [`init_outputs`].
#[cfg(target_os = "espidf")]
pub fn init_sensor_isr() -> Result<(), HwInitError> {
    type Isr = unsafe extern "C" fn(*mut core::ffi::c_void);
    let sensors: [(i32, Isr); 2] = [
        (pins::INFEED_GPIO, infeed_gpio_isr),
        (pins::OUTFEED_GPIO, outfeed_gpio_isr),
    ];

    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed.  The handlers are static functions
    // that only touch atomics and the lock-free edge channels.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        for &(pin, isr) in &sensors {
            let cfg = gpio_config_t {
                pin_bit_mask: 1u64 << pin,
                mode: gpio_mode_t_GPIO_MODE_INPUT,
                pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
                pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
                intr_type: gpio_int_type_t_GPIO_INTR_ANYEDGE,
            };
            let ret = gpio_config(&cfg);
            if ret != ESP_OK as i32 {
                return Err(HwInitError::GpioConfigFailed(ret));
            }
            let ret = gpio_isr_handler_add(pin, Some(isr), core::ptr::null_mut());
            if ret != ESP_OK as i32 {
                return Err(HwInitError::IsrAddFailed(ret));
            }
            gpio_intr_enable(pin);
        }
    }

    info!(
        "hw_init: sensor ISRs installed (infeed=GPIO{}, outfeed=GPIO{})",
        pins::INFEED_GPIO,
        pins::OUTFEED_GPIO
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_sensor_isr() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): sensor ISRs skipped");
    Ok(())
}
