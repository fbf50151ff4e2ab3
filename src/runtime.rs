//! Tracking runtime: the three tracking tasks plus the fault supervisor
//! on one cooperative executor.
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────────┐
//!  │  Tracking thread                                             │
//!  │  ┌────────────────────────────────────────────────────────┐  │
//!  │  │  futures_lite::block_on(executor.run(supervise))       │  │
//!  │  │  ┌──────────────────────────────────────────────────┐  │  │
//!  │  │  │  edge_executor::LocalExecutor                    │  │  │
//!  │  │  │  ┌─────────┐  ┌──────────┐  ┌──────────┐          │  │  │
//!  │  │  │  │ Infeed  │  │ Outfeed  │  │ Watchdog │          │  │  │
//!  │  │  │  │ edges ⏱ │  │ edges ⏱  │  │ signal ⏱ │          │  │  │
//!  │  │  │  └─────────┘  └──────────┘  └──────────┘          │  │  │
//!  │  │  └──────────────────────────────────────────────────┘  │  │
//!  │  └────────────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`run`] returns once the supervisor has shut the line down.  Dropping
//! the executor then cancels whatever tasks are still parked.

use edge_executor::LocalExecutor;
use log::info;

use crate::app::ports::{Clock, EventSink, ShutdownPort};
use crate::config::TunnelConfig;
use crate::error::TunnelFault;
use crate::fault::{FaultSink, supervise};
use crate::sensors::EdgeChannel;
use crate::tracking::{InfeedTracker, OutfeedTracker, SharedTunnel, run_tracker};
use crate::watchdog;

/// Everything the tracking tasks share.
pub struct Tracking<'a, C> {
    pub config: &'a TunnelConfig,
    pub tunnel: &'a SharedTunnel,
    pub faults: &'a FaultSink,
    pub infeed: &'a EdgeChannel,
    pub outfeed: &'a EdgeChannel,
    pub clock: C,
}

/// Run tracking until the first fault.  Blocks the calling thread and
/// returns the fault that stopped the line.
pub fn run<C, S, P>(tracking: &Tracking<'_, C>, mut sink: S, shutdown: &mut P) -> TunnelFault
where
    C: Clock,
    S: EventSink + Clone,
    P: ShutdownPort,
{
    let config = tracking.config;
    let clock = &tracking.clock;
    info!(
        "tracking: noise<{}ms stuck>{}ms tol={}ms max_sheets={} timeout={}s",
        config.min_occlusion_ms,
        config.max_occlusion_ms,
        config.max_duration_tolerance_ms,
        config.max_queue_len,
        config.tunnel_timeout_secs
    );

    let executor: LocalExecutor<'_, 4> = LocalExecutor::new();

    executor
        .spawn(run_tracker(
            InfeedTracker::new(config, tracking.tunnel),
            tracking.infeed,
            tracking.faults,
            clock,
            sink.clone(),
            config.check_interval(),
        ))
        .detach();
    executor
        .spawn(run_tracker(
            OutfeedTracker::new(config, tracking.tunnel),
            tracking.outfeed,
            tracking.faults,
            clock,
            sink.clone(),
            config.check_interval(),
        ))
        .detach();
    executor
        .spawn(watchdog::run(
            tracking.tunnel,
            tracking.faults,
            clock,
            config.tunnel_timeout(),
        ))
        .detach();

    futures_lite::future::block_on(executor.run(supervise(
        tracking.faults,
        tracking.tunnel,
        shutdown,
        &mut sink,
    )))
}
