//! Port traits: the hexagonal boundary between the tracking core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ trackers / watchdog / supervisor
//! ```
//!
//! Driven adapters (clock, event sinks, shutdown outputs) implement these
//! traits.  The tracking tasks consume them via generics, so the domain
//! core never touches hardware directly.

use crate::error::TunnelFault;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: hardware timer → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.
///
/// Must share its timebase with the timestamps the interrupt handlers put
/// on [`SensorEvent`](crate::sensors::SensorEvent)s.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.  Never decreases.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`TunnelEvent`](super::events::TunnelEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::TunnelEvent);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &super::events::TunnelEvent) {
        (**self).emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Shutdown port (driven adapter: domain → line outputs)
// ───────────────────────────────────────────────────────────────

/// Brings the line to its safe state.  Called once per boot, on the first
/// fault.
pub trait ShutdownPort {
    fn shutdown(&mut self, fault: TunnelFault);
}
