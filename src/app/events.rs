//! Outbound tracking events.
//!
//! The trackers and the fault supervisor emit these through the
//! [`EventSink`](super::ports::EventSink) port.

use crate::error::TunnelFault;
use crate::sensors::SensorId;
use crate::watchdog::WatchdogCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelEvent {
    /// A sensor became covered.
    Occluded { sensor: SensorId, at_ms: u64 },

    /// An occlusion shorter than the noise floor was discarded.
    NoiseRejected { sensor: SensorId, duration_ms: u32 },

    /// A sheet entered the tunnel and is now tracked.
    SheetAdmitted { duration_ms: u32, queue_len: usize },

    /// A sheet left the tunnel and matched the oldest tracked sheet.
    SheetMatched {
        observed_ms: u32,
        expected_ms: u32,
        queue_len: usize,
    },

    /// A sheet left the tunnel while nothing was tracked.
    UnexpectedOutfeed { duration_ms: u32 },

    /// A sheet left the tunnel but did not match the oldest tracked sheet.
    DurationMismatch { observed_ms: u32, expected_ms: u32 },

    /// A command was sent to the stuck-sheet watchdog.
    Watchdog(WatchdogCommand),

    /// The line was shut down after a fault.
    Shutdown { fault: TunnelFault, drained: usize },
}
