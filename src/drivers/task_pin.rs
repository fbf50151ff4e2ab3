//! Start the tracking runtime on its own pinned thread.
//!
//! The tracking executor shares nothing with the boot thread except
//! `'static` state, so it gets a FreeRTOS task of its own on the APP core,
//! away from the Wi-Fi and IDF housekeeping on core 0.  On the host the
//! same call is a named `std::thread` with the requested stack.

use std::io;
use std::thread::JoinHandle;

/// Scheduling parameters for a pinned thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadSpec {
    /// Null-terminated; FreeRTOS keeps the raw pointer.
    pub name: &'static str,
    pub priority: u8,
    pub stack_kb: usize,
}

impl ThreadSpec {
    /// CPU the tracking thread runs on (APP_CPU).
    pub const CORE: i32 = 1;

    fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

/// Spawn `f` per `spec`.
///
/// `esp_pthread_set_cfg` only affects the next `pthread_create` from this
/// thread, so nothing else may spawn between the two calls.
#[cfg(target_os = "espidf")]
pub fn spawn_pinned<T: Send + 'static>(
    spec: ThreadSpec,
    f: impl FnOnce() -> T + Send + 'static,
) -> io::Result<JoinHandle<T>> {
    // SAFETY: `cfg` outlives the call and `spec.name` is a 'static,
    // null-terminated string, which is all esp_pthread_set_cfg reads.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = ThreadSpec::CORE;
        cfg.prio = i32::from(spec.priority);
        cfg.stack_size = (spec.stack_kb * 1024) as i32;
        cfg.thread_name = spec.name.as_ptr().cast();
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as i32 {
        return Err(io::Error::other(format!("esp_pthread_set_cfg: {ret}")));
    }

    log::info!(
        "{}: core {} priority {} stack {}KB",
        spec.display_name(),
        ThreadSpec::CORE,
        spec.priority,
        spec.stack_kb
    );
    std::thread::Builder::new()
        .name(spec.display_name().into())
        .spawn(f)
}

/// Host build: no pinning, priority ignored.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_pinned<T: Send + 'static>(
    spec: ThreadSpec,
    f: impl FnOnce() -> T + Send + 'static,
) -> io::Result<JoinHandle<T>> {
    log::info!("{}: host thread, stack {}KB", spec.display_name(), spec.stack_kb);
    std::thread::Builder::new()
        .name(spec.display_name().into())
        .stack_size(spec.stack_kb * 1024)
        .spawn(f)
}
