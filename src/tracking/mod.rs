//! Sheet tracking: the infeed/outfeed state machines and their task loop.
//!
//! ```text
//!  INFEED_EDGES ──▶ InfeedTracker ──admit──▶ ┌──────────────┐ ──Arm────────▶
//!                                            │ SharedTunnel │               Watchdog
//! OUTFEED_EDGES ──▶ OutfeedTracker ─release─▶│ queue + flag │ ──Reset/Disarm▶
//!                                            └──────────────┘
//!        any fault ──────────────────────────────────────────▶ FaultSink
//! ```
//!
//! Both trackers implement [`Tracker`] and run under [`run_tracker`],
//! which waits for the next edge, or for the next stuck-sensor check while
//! the sensor is covered.

pub mod infeed;
pub mod occlusion;
pub mod outfeed;
pub mod queue;
pub mod tunnel;

use core::time::Duration;

use async_io_mini::Timer;
use futures_lite::FutureExt;
use log::{error, info};

use crate::app::ports::{Clock, EventSink};
use crate::error::TunnelFault;
use crate::fault::FaultSink;
use crate::sensors::{EdgeChannel, SensorEvent, SensorId};
use occlusion::OcclusionTimer;

pub use infeed::InfeedTracker;
pub use outfeed::OutfeedTracker;
pub use tunnel::{SharedTunnel, Tunnel};

/// Whether an outfeed duration belongs to the same sheet as an infeed
/// duration.  Symmetric in its first two arguments.
pub fn durations_match(observed_ms: u32, expected_ms: u32, tolerance_ms: u32) -> bool {
    observed_ms.abs_diff(expected_ms) <= tolerance_ms
}

/// One sensor's tracking state machine.
pub trait Tracker {
    fn occlusion(&self) -> &OcclusionTimer;

    /// Handle one debounced edge.  `Err` is fatal.
    fn on_edge(&mut self, event: SensorEvent, sink: &mut impl EventSink) -> Result<(), TunnelFault>;

    fn sensor(&self) -> SensorId {
        self.occlusion().sensor()
    }

    fn is_occluded(&self) -> bool {
        self.occlusion().is_occluded()
    }

    /// Periodic stuck-sensor check while covered.
    fn on_check(&self, now_ms: u64) -> Result<(), TunnelFault> {
        let timer = self.occlusion();
        timer.check(now_ms).map_err(|elapsed| {
            error!("{}: covered for {}ms, limit exceeded", timer.sensor(), elapsed);
            timer.sensor().stuck_fault()
        })
    }
}

enum Wake {
    Edge(SensorEvent),
    Check,
}

/// Drive `tracker` from `edges` until a fault stops the system.
///
/// A fault raised by this tracker is reported once and ends the loop.  A
/// fault raised elsewhere ends the loop at the next wake-up.  The check
/// timer only exists while the sensor is covered and is dropped on every
/// exit path.
pub async fn run_tracker<T, C, S>(
    mut tracker: T,
    edges: &EdgeChannel,
    faults: &FaultSink,
    clock: &C,
    mut sink: S,
    check_interval: Duration,
) where
    T: Tracker,
    C: Clock,
    S: EventSink,
{
    let sensor = tracker.sensor();
    info!("{} tracker started (check every {}ms)", sensor, check_interval.as_millis());

    loop {
        let wake = if tracker.is_occluded() {
            async { Wake::Edge(edges.receive().await) }
                .or(async {
                    Timer::after(check_interval).await;
                    Wake::Check
                })
                .await
        } else {
            Wake::Edge(edges.receive().await)
        };

        if faults.is_faulted() {
            info!("{} tracker stopping: system faulted", sensor);
            return;
        }

        let step = match wake {
            Wake::Edge(event) => tracker.on_edge(event, &mut sink),
            Wake::Check => tracker.on_check(clock.now_ms()),
        };

        if let Err(fault) = step {
            faults.report(fault);
            return;
        }
    }
}
