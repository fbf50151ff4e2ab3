//! Fault sink: the single place fatal faults converge.
//!
//! Any task may report a fault.  The first one is latched and forwarded
//! to the supervisor; later ones are logged and dropped.  Once latched,
//! the latch never clears (recovery is a manual restart).
//!
//! ```text
//!  infeed ─┐
//! outfeed ─┼─ report() ──▶ latch (AtomicU8) ──▶ channel ──▶ supervise()
//! watchdog ┘                                              drain + shutdown
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{error, info, warn};

use crate::app::events::TunnelEvent;
use crate::app::ports::{EventSink, ShutdownPort};
use crate::error::TunnelFault;
use crate::tracking::SharedTunnel;

const FAULT_QUEUE_DEPTH: usize = 4;

/// No fault latched yet.
const CLEAR: u8 = 0;

pub struct FaultSink {
    latched: AtomicU8,
    channel: Channel<CriticalSectionRawMutex, TunnelFault, FAULT_QUEUE_DEPTH>,
}

impl Default for FaultSink {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultSink {
    pub const fn new() -> Self {
        Self {
            latched: AtomicU8::new(CLEAR),
            channel: Channel::new(),
        }
    }

    /// Report a fatal fault.  Returns `true` if this call latched it.
    pub fn report(&self, fault: TunnelFault) -> bool {
        match self
            .latched
            .compare_exchange(CLEAR, fault.code(), Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                error!("FAULT | {} (code {})", fault, fault.code());
                // Only the latching call sends, so the channel never fills.
                let _ = self.channel.try_send(fault);
                true
            }
            Err(code) => {
                warn!(
                    "fault '{}' ignored, already latched code {}",
                    fault, code
                );
                false
            }
        }
    }

    /// The first fault reported, if any.
    pub fn latched(&self) -> Option<TunnelFault> {
        TunnelFault::from_code(self.latched.load(Ordering::Acquire))
    }

    pub fn is_faulted(&self) -> bool {
        self.latched.load(Ordering::Acquire) != CLEAR
    }

    /// Wait for the latching report.
    pub async fn wait(&self) -> TunnelFault {
        self.channel.receive().await
    }
}

/// Wait for the first fault, then bring the line to its safe state.
///
/// Drains the tunnel (which also disarms the watchdog), emits one
/// `Shutdown` event and actuates `shutdown` exactly once.
pub async fn supervise<P, S>(
    faults: &FaultSink,
    tunnel: &SharedTunnel,
    shutdown: &mut P,
    sink: &mut S,
) -> TunnelFault
where
    P: ShutdownPort,
    S: EventSink,
{
    let fault = faults.wait().await;
    let drained = tunnel.drain();
    info!("supervisor: shutting down on '{}', {} sheets discarded", fault, drained);
    sink.emit(&TunnelEvent::Shutdown { fault, drained });
    shutdown.shutdown(fault);
    fault
}
