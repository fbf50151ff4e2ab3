//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing tracking events to the logger
//! (UART / USB-CDC in production).

use log::{debug, error, info, warn};

use crate::app::events::TunnelEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`TunnelEvent`] to the serial console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &TunnelEvent) {
        match event {
            TunnelEvent::Occluded { sensor, at_ms } => {
                debug!("OCCL  | {} covered at {}ms", sensor, at_ms);
            }
            TunnelEvent::NoiseRejected {
                sensor,
                duration_ms,
            } => {
                debug!("NOISE | {} | {}ms", sensor, duration_ms);
            }
            TunnelEvent::SheetAdmitted {
                duration_ms,
                queue_len,
            } => {
                info!("ADMIT | {}ms | in tunnel={}", duration_ms, queue_len);
            }
            TunnelEvent::SheetMatched {
                observed_ms,
                expected_ms,
                queue_len,
            } => {
                info!(
                    "MATCH | out={}ms in={}ms | in tunnel={}",
                    observed_ms, expected_ms, queue_len
                );
            }
            TunnelEvent::UnexpectedOutfeed { duration_ms } => {
                warn!("UNEXP | outfeed {}ms with empty tunnel", duration_ms);
            }
            TunnelEvent::DurationMismatch {
                observed_ms,
                expected_ms,
            } => {
                error!("MISM  | out={}ms in={}ms", observed_ms, expected_ms);
            }
            TunnelEvent::Watchdog(command) => {
                debug!("WDOG  | {}", command);
            }
            TunnelEvent::Shutdown { fault, drained } => {
                error!("FAULT | {} | shutdown, {} sheets discarded", fault, drained);
            }
        }
    }
}
