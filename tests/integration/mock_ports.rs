//! Mock port adapters for integration tests.
//!
//! Record every event and shutdown call so tests can assert on the full
//! history after the runtime thread has returned.

use std::sync::{Arc, Mutex};

use uvtunnel::app::events::TunnelEvent;
use uvtunnel::app::ports::{EventSink, ShutdownPort};
use uvtunnel::error::TunnelFault;

// ── RecordingSink ─────────────────────────────────────────────

/// Shared by every task's clone, so the log is in global emit order.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<TunnelEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TunnelEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&TunnelEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &TunnelEvent) {
        self.events.lock().unwrap().push(*event);
    }
}

// ── RecordingShutdown ─────────────────────────────────────────

#[derive(Default)]
pub struct RecordingShutdown {
    pub calls: Vec<TunnelFault>,
}

impl ShutdownPort for RecordingShutdown {
    fn shutdown(&mut self, fault: TunnelFault) {
        self.calls.push(fault);
    }
}
