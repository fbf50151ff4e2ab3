//! UV tunnel firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  MonotonicClock   LogEventSink   OutputShutdown   sensor ISRs  │
//! │  (Clock)          (EventSink)    (ShutdownPort)   (EdgeInput)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        Tracking runtime (APP core, own thread)         │    │
//! │  │  Infeed · Outfeed · Watchdog · Fault supervisor        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{error, info, warn};

use uvtunnel::adapters::log_sink::LogEventSink;
use uvtunnel::adapters::shutdown::OutputShutdown;
use uvtunnel::adapters::time::MonotonicClock;
use uvtunnel::config::TunnelConfig;
use uvtunnel::drivers::hw_init;
use uvtunnel::drivers::task_pin::{ThreadSpec, spawn_pinned};
use uvtunnel::fault::FaultSink;
use uvtunnel::runtime::{self, Tracking};
use uvtunnel::sensors::{INFEED_EDGES, INFEED_INPUT, OUTFEED_EDGES, OUTFEED_INPUT};
use uvtunnel::tracking::SharedTunnel;

static FAULTS: FaultSink = FaultSink::new();

/// Tracking thread: APP core, above the idle tasks, small stack.
const TRACKING_THREAD: ThreadSpec = ThreadSpec {
    name: "tracking\0",
    priority: 10,
    stack_kb: 8,
};

fn load_config() -> TunnelConfig {
    match option_env!("UVTUNNEL_CONFIG") {
        Some(json) => match TunnelConfig::from_json(json) {
            Ok(cfg) => {
                info!("Config loaded from build-time override");
                cfg
            }
            Err(e) => {
                warn!("Config override rejected ({}), using defaults", e);
                TunnelConfig::default()
            }
        },
        None => TunnelConfig::default(),
    }
}

fn main() -> Result<()> {
    // ── 1. Platform init ───────────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  UV tunnel v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config ──────────────────────────────────────────────
    let config: &'static TunnelConfig = Box::leak(Box::new(load_config()));

    // ── 3. Hardware ────────────────────────────────────────────
    hw_init::init_outputs().context("output init")?;
    hw_init::init_sensor_isr().context("sensor ISR init")?;

    // ── 4. Tracking runtime ────────────────────────────────────
    let tunnel: &'static SharedTunnel = Box::leak(Box::new(SharedTunnel::new(config)));

    let handle = spawn_pinned(TRACKING_THREAD, move || {
        let tracking = Tracking {
            config,
            tunnel,
            faults: &FAULTS,
            infeed: &INFEED_EDGES,
            outfeed: &OUTFEED_EDGES,
            clock: MonotonicClock::new(),
        };
        let mut shutdown = OutputShutdown::new();
        runtime::run(&tracking, LogEventSink::new(), &mut shutdown)
    })
    .context("tracking thread spawn")?;

    // ── 5. Halted ──────────────────────────────────────────────
    match handle.join() {
        Ok(fault) => error!("Line halted: {} (code {})", fault, fault.code()),
        Err(_) => error!("Tracking thread panicked, line halted"),
    }
    let snapshot = tunnel.snapshot();
    info!(
        "Totals: admitted={} matched={} | dropped edges: infeed={} outfeed={}",
        snapshot.admitted,
        snapshot.matched,
        INFEED_INPUT.dropped_edges(),
        OUTFEED_INPUT.dropped_edges()
    );
    info!("Manual restart required");

    loop {
        std::thread::park();
    }
}
