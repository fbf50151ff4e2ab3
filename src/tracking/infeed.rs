//! Infeed tracker: admits each sheet that clears the infeed sensor.

use log::{debug, error};

use super::Tracker;
use super::occlusion::{OcclusionStep, OcclusionTimer};
use super::tunnel::SharedTunnel;
use crate::app::events::TunnelEvent;
use crate::app::ports::EventSink;
use crate::config::TunnelConfig;
use crate::error::TunnelFault;
use crate::sensors::{SensorEvent, SensorId};

pub struct InfeedTracker<'a> {
    occlusion: OcclusionTimer,
    min_occlusion_ms: u32,
    tunnel: &'a SharedTunnel,
}

impl<'a> InfeedTracker<'a> {
    pub fn new(config: &TunnelConfig, tunnel: &'a SharedTunnel) -> Self {
        Self {
            occlusion: OcclusionTimer::new(SensorId::Infeed, config.max_occlusion_ms),
            min_occlusion_ms: config.min_occlusion_ms,
            tunnel,
        }
    }
}

impl Tracker for InfeedTracker<'_> {
    fn occlusion(&self) -> &OcclusionTimer {
        &self.occlusion
    }

    fn on_edge(&mut self, event: SensorEvent, sink: &mut impl EventSink) -> Result<(), TunnelFault> {
        let duration_ms = match self.occlusion.on_edge(event) {
            OcclusionStep::Started => {
                sink.emit(&TunnelEvent::Occluded {
                    sensor: SensorId::Infeed,
                    at_ms: event.at_ms,
                });
                return Ok(());
            }
            OcclusionStep::Ignored => return Ok(()),
            OcclusionStep::Ended { duration_ms } => duration_ms,
        };

        if duration_ms < self.min_occlusion_ms {
            debug!("infeed: {}ms occlusion below noise floor", duration_ms);
            sink.emit(&TunnelEvent::NoiseRejected {
                sensor: SensorId::Infeed,
                duration_ms,
            });
            return Ok(());
        }

        match self.tunnel.admit(duration_ms) {
            Ok(admission) => {
                if let Some(command) = admission.command {
                    sink.emit(&TunnelEvent::Watchdog(command));
                }
                sink.emit(&TunnelEvent::SheetAdmitted {
                    duration_ms,
                    queue_len: admission.queue_len,
                });
                Ok(())
            }
            Err(fault) => {
                error!("infeed: {}ms sheet exceeds tunnel capacity", duration_ms);
                Err(fault)
            }
        }
    }
}
