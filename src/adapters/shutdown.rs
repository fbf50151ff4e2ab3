//! Line shutdown adapter.
//!
//! Implements [`ShutdownPort`] by dropping the run-enable output and
//! lighting the fault lamp.  On the host the GPIO writes are no-ops.

use log::error;

use crate::app::ports::ShutdownPort;
use crate::drivers::hw_init::gpio_write;
use crate::error::TunnelFault;
use crate::pins;

#[derive(Debug, Default)]
pub struct OutputShutdown {
    tripped: Option<TunnelFault>,
}

impl OutputShutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fault this adapter shut the line down for, if any.
    pub fn tripped(&self) -> Option<TunnelFault> {
        self.tripped
    }
}

impl ShutdownPort for OutputShutdown {
    fn shutdown(&mut self, fault: TunnelFault) {
        if let Some(first) = self.tripped {
            error!("shutdown: already tripped on '{}', ignoring '{}'", first, fault);
            return;
        }
        gpio_write(pins::RUN_ENABLE_GPIO, false);
        gpio_write(pins::FAULT_LED_GPIO, true);
        self.tripped = Some(fault);
        error!("shutdown: line stopped ({}), manual restart required", fault);
    }
}
