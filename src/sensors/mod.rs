//! Sheet sensors: debounced edge detection and the interrupt hand-off.
//!
//! ```text
//! ┌─────────────┐   level    ┌───────────────┐  SensorEvent  ┌──────────────┐
//! │  GPIO ISR   │──────────▶│   EdgeInput    │─────────────▶│ Tracker task │
//! │ (any edge)  │            │ debounce+stamp │  try_send     │ (async)      │
//! └─────────────┘            └───────────────┘  depth 20     └──────────────┘
//! ```
//!
//! The ISR only filters and timestamps; all tracking logic runs in task
//! context on the other side of the bounded channel.

pub mod debounce;
pub mod edge_input;

use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::error::TunnelFault;
pub use debounce::DebouncedInput;
pub use edge_input::EdgeInput;

/// Channel depth per sensor.  Sized to absorb bursts of edges while the
/// tracker task is busy.
pub const EDGE_QUEUE_DEPTH: usize = 20;

/// Bounded hand-off from one sensor's ISR to its tracker task.
pub type EdgeChannel = Channel<CriticalSectionRawMutex, SensorEvent, EDGE_QUEUE_DEPTH>;

/// Which of the two tunnel sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorId {
    Infeed,
    Outfeed,
}

impl SensorId {
    /// The fault raised when this sensor stays covered too long.
    pub const fn stuck_fault(self) -> TunnelFault {
        match self {
            Self::Infeed => TunnelFault::InfeedStuck,
            Self::Outfeed => TunnelFault::OutfeedStuck,
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infeed => write!(f, "infeed"),
            Self::Outfeed => write!(f, "outfeed"),
        }
    }
}

/// Logical sensor transition after debouncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// A sheet started covering the sensor.
    Activated,
    /// The sheet cleared the sensor.
    Deactivated,
}

/// One debounced edge, stamped at interrupt time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorEvent {
    pub edge: Edge,
    /// Monotonic milliseconds (same timebase as [`Clock`](crate::app::ports::Clock)).
    pub at_ms: u64,
}

impl SensorEvent {
    pub const fn activated(at_ms: u64) -> Self {
        Self {
            edge: Edge::Activated,
            at_ms,
        }
    }

    pub const fn deactivated(at_ms: u64) -> Self {
        Self {
            edge: Edge::Deactivated,
            at_ms,
        }
    }
}

// ── Board wiring ──────────────────────────────────────────────
//
// One edge channel and one input per physical sensor.  The GPIO ISRs in
// `drivers::hw_init` reach these through their `'static` addresses.

pub static INFEED_EDGES: EdgeChannel = Channel::new();
pub static OUTFEED_EDGES: EdgeChannel = Channel::new();

pub static INFEED_INPUT: EdgeInput<'static> = EdgeInput::new(SensorId::Infeed, &INFEED_EDGES);
pub static OUTFEED_INPUT: EdgeInput<'static> = EdgeInput::new(SensorId::Outfeed, &OUTFEED_EDGES);
