//! Outfeed tracker: matches each sheet leaving the tunnel against the
//! oldest tracked sheet.

use log::{debug, error, warn};

use super::Tracker;
use super::occlusion::{OcclusionStep, OcclusionTimer};
use super::tunnel::{Release, SharedTunnel};
use crate::app::events::TunnelEvent;
use crate::app::ports::EventSink;
use crate::config::TunnelConfig;
use crate::error::TunnelFault;
use crate::sensors::{SensorEvent, SensorId};

pub struct OutfeedTracker<'a> {
    occlusion: OcclusionTimer,
    min_occlusion_ms: u32,
    tunnel: &'a SharedTunnel,
}

impl<'a> OutfeedTracker<'a> {
    pub fn new(config: &TunnelConfig, tunnel: &'a SharedTunnel) -> Self {
        Self {
            occlusion: OcclusionTimer::new(SensorId::Outfeed, config.max_occlusion_ms),
            min_occlusion_ms: config.min_occlusion_ms,
            tunnel,
        }
    }
}

impl Tracker for OutfeedTracker<'_> {
    fn occlusion(&self) -> &OcclusionTimer {
        &self.occlusion
    }

    fn on_edge(&mut self, event: SensorEvent, sink: &mut impl EventSink) -> Result<(), TunnelFault> {
        let duration_ms = match self.occlusion.on_edge(event) {
            OcclusionStep::Started => {
                sink.emit(&TunnelEvent::Occluded {
                    sensor: SensorId::Outfeed,
                    at_ms: event.at_ms,
                });
                return Ok(());
            }
            OcclusionStep::Ignored => return Ok(()),
            OcclusionStep::Ended { duration_ms } => duration_ms,
        };

        if duration_ms < self.min_occlusion_ms {
            debug!("outfeed: {}ms occlusion below noise floor", duration_ms);
            sink.emit(&TunnelEvent::NoiseRejected {
                sensor: SensorId::Outfeed,
                duration_ms,
            });
            return Ok(());
        }

        match self.tunnel.release(duration_ms) {
            Release::Unexpected => {
                warn!("outfeed: {}ms sheet with empty tunnel, ignoring", duration_ms);
                sink.emit(&TunnelEvent::UnexpectedOutfeed { duration_ms });
                Ok(())
            }
            Release::Matched {
                expected_ms,
                queue_len,
                command,
            } => {
                sink.emit(&TunnelEvent::SheetMatched {
                    observed_ms: duration_ms,
                    expected_ms,
                    queue_len,
                });
                sink.emit(&TunnelEvent::Watchdog(command));
                Ok(())
            }
            Release::Mismatch { expected_ms } => {
                error!(
                    "outfeed: {}ms sheet does not match oldest {}ms",
                    duration_ms, expected_ms
                );
                sink.emit(&TunnelEvent::DurationMismatch {
                    observed_ms: duration_ms,
                    expected_ms,
                });
                Err(TunnelFault::DurationMismatch)
            }
        }
    }
}
