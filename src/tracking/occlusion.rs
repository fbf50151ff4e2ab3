//! Per-sensor occlusion timing: `Idle` ↔ `Occluded(start)`.
//!
//! Shared by both trackers.  Durations come from the interrupt timestamps
//! on the edges, so scheduling latency in the tracker task does not skew
//! them.

use log::warn;

use crate::sensors::{Edge, SensorEvent, SensorId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcclusionState {
    Idle,
    Occluded { since_ms: u64 },
}

/// Result of feeding one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcclusionStep {
    /// The sensor became covered.
    Started,
    /// The sensor cleared after being covered for `duration_ms`.
    Ended { duration_ms: u32 },
    /// A clear edge arrived while already idle (lost activation edge).
    Ignored,
}

pub struct OcclusionTimer {
    sensor: SensorId,
    state: OcclusionState,
    max_occlusion_ms: u32,
}

impl OcclusionTimer {
    pub fn new(sensor: SensorId, max_occlusion_ms: u32) -> Self {
        Self {
            sensor,
            state: OcclusionState::Idle,
            max_occlusion_ms,
        }
    }

    pub fn sensor(&self) -> SensorId {
        self.sensor
    }

    pub fn state(&self) -> OcclusionState {
        self.state
    }

    pub fn is_occluded(&self) -> bool {
        matches!(self.state, OcclusionState::Occluded { .. })
    }

    pub fn on_edge(&mut self, event: SensorEvent) -> OcclusionStep {
        match (event.edge, self.state) {
            (Edge::Activated, state) => {
                if let OcclusionState::Occluded { since_ms } = state {
                    warn!(
                        "{}: activation at {}ms while covered since {}ms, restarting",
                        self.sensor, event.at_ms, since_ms
                    );
                }
                // Every activation restarts the reference time.
                self.state = OcclusionState::Occluded {
                    since_ms: event.at_ms,
                };
                OcclusionStep::Started
            }
            (Edge::Deactivated, OcclusionState::Occluded { since_ms }) => {
                self.state = OcclusionState::Idle;
                let duration_ms = event.at_ms.saturating_sub(since_ms);
                OcclusionStep::Ended {
                    duration_ms: u32::try_from(duration_ms).unwrap_or(u32::MAX),
                }
            }
            (Edge::Deactivated, OcclusionState::Idle) => {
                warn!("{}: clear edge at {}ms without activation", self.sensor, event.at_ms);
                OcclusionStep::Ignored
            }
        }
    }

    /// Milliseconds covered so far, if covered.
    pub fn elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        match self.state {
            OcclusionState::Occluded { since_ms } => Some(now_ms.saturating_sub(since_ms)),
            OcclusionState::Idle => None,
        }
    }

    /// `Err(elapsed)` once the sensor has been covered for longer than
    /// `max_occlusion_ms`.
    pub fn check(&self, now_ms: u64) -> Result<(), u64> {
        match self.elapsed_ms(now_ms) {
            Some(elapsed) if elapsed > u64::from(self.max_occlusion_ms) => Err(elapsed),
            _ => Ok(()),
        }
    }
}
