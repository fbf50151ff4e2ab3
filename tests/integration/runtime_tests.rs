//! Integration tests for the full tracking runtime.
//!
//! The runtime runs on a scoped thread exactly as it does on the APP
//! core; the test thread plays the sensor ISRs by pushing stamped edges
//! into the two channels.

use std::time::{Duration, Instant};

use embassy_sync::channel::Channel;

use uvtunnel::adapters::time::MonotonicClock;
use uvtunnel::app::events::TunnelEvent;
use uvtunnel::app::ports::Clock;
use uvtunnel::config::TunnelConfig;
use uvtunnel::error::TunnelFault;
use uvtunnel::fault::FaultSink;
use uvtunnel::runtime::{self, Tracking};
use uvtunnel::sensors::{EdgeChannel, SensorEvent};
use uvtunnel::tracking::SharedTunnel;
use uvtunnel::tracking::tunnel::TunnelSnapshot;

use super::mock_ports::{RecordingShutdown, RecordingSink};

// ── Harness ───────────────────────────────────────────────────

struct Line<'a> {
    tunnel: &'a SharedTunnel,
    infeed: &'a EdgeChannel,
    outfeed: &'a EdgeChannel,
    clock: MonotonicClock,
    sink: RecordingSink,
}

impl Line<'_> {
    /// One sheet covering `channel`'s sensor for `len_ms`.
    fn sheet(&self, channel: &EdgeChannel, len_ms: u64) {
        let t = self.clock.now_ms();
        channel.try_send(SensorEvent::activated(t)).unwrap();
        channel.try_send(SensorEvent::deactivated(t + len_ms)).unwrap();
    }

    fn cover(&self, channel: &EdgeChannel) {
        channel.try_send(SensorEvent::activated(self.clock.now_ms())).unwrap();
    }

    fn wait_until(&self, what: &str, cond: impl Fn(&Self) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(3);
        while !cond(self) {
            assert!(Instant::now() < deadline, "timed out waiting for {what}");
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

struct Outcome {
    fault: TunnelFault,
    events: Vec<TunnelEvent>,
    shutdowns: Vec<TunnelFault>,
    snapshot: TunnelSnapshot,
    latched: Option<TunnelFault>,
}

impl Outcome {
    fn shutdown_event(&self) -> Option<(TunnelFault, usize)> {
        self.events.iter().find_map(|e| match e {
            TunnelEvent::Shutdown { fault, drained } => Some((*fault, *drained)),
            _ => None,
        })
    }
}

fn run_line(config: TunnelConfig, drive: impl FnOnce(&Line<'_>)) -> Outcome {
    config.validate().unwrap();
    let tunnel = SharedTunnel::new(&config);
    let faults = FaultSink::new();
    let infeed: EdgeChannel = Channel::new();
    let outfeed: EdgeChannel = Channel::new();
    let clock = MonotonicClock::new();
    let sink = RecordingSink::new();
    let mut shutdown = RecordingShutdown::default();

    let fault = std::thread::scope(|s| {
        let handle = s.spawn(|| {
            let tracking = Tracking {
                config: &config,
                tunnel: &tunnel,
                faults: &faults,
                infeed: &infeed,
                outfeed: &outfeed,
                clock,
            };
            runtime::run(&tracking, sink.clone(), &mut shutdown)
        });

        drive(&Line {
            tunnel: &tunnel,
            infeed: &infeed,
            outfeed: &outfeed,
            clock,
            sink: sink.clone(),
        });
        handle.join().unwrap()
    });

    Outcome {
        fault,
        events: sink.events(),
        shutdowns: shutdown.calls,
        snapshot: tunnel.snapshot(),
        latched: faults.latched(),
    }
}

// ── Happy path, then overflow ─────────────────────────────────

#[test]
fn matched_sheet_then_overflow_shuts_down_once() {
    let out = run_line(TunnelConfig::default(), |line| {
        line.sheet(line.infeed, 500);
        line.wait_until("admission", |l| l.tunnel.snapshot().queue_len == 1);
        line.sheet(line.outfeed, 480);
        line.wait_until("match", |l| l.tunnel.snapshot().matched == 1);
        assert!(!line.tunnel.is_watchdog_armed());

        for _ in 0..4 {
            line.sheet(line.infeed, 500);
        }
    });

    assert_eq!(out.fault, TunnelFault::TooManySheets);
    assert_eq!(out.latched, Some(TunnelFault::TooManySheets));
    assert_eq!(out.shutdowns, vec![TunnelFault::TooManySheets]);
    assert_eq!(out.shutdown_event(), Some((TunnelFault::TooManySheets, 4)));
    assert_eq!(out.snapshot.queue_len, 0);
    assert!(!out.snapshot.watchdog_armed);
    assert_eq!(out.snapshot.admitted, 5);
    assert_eq!(out.snapshot.matched, 1);
}

// ── Fatal faults ──────────────────────────────────────────────

#[test]
fn mismatched_outfeed_shuts_down() {
    let out = run_line(TunnelConfig::default(), |line| {
        line.sheet(line.infeed, 500);
        line.wait_until("admission", |l| l.tunnel.snapshot().queue_len == 1);
        line.sheet(line.outfeed, 1_200);
    });

    assert_eq!(out.fault, TunnelFault::DurationMismatch);
    assert!(out.events.contains(&TunnelEvent::DurationMismatch {
        observed_ms: 1_200,
        expected_ms: 500
    }));
    assert_eq!(out.shutdown_event(), Some((TunnelFault::DurationMismatch, 1)));
    assert_eq!(out.shutdowns.len(), 1);
}

#[test]
fn sheet_that_never_leaves_trips_watchdog() {
    let config = TunnelConfig {
        tunnel_timeout_secs: 1,
        ..TunnelConfig::default()
    };
    let mut admitted_at = None;
    let out = run_line(config, |line| {
        line.sheet(line.infeed, 500);
        line.wait_until("admission", |l| l.tunnel.snapshot().queue_len == 1);
        admitted_at = Some(Instant::now());
    });

    assert_eq!(out.fault, TunnelFault::SheetStuckInTunnel);
    assert_eq!(out.shutdown_event(), Some((TunnelFault::SheetStuckInTunnel, 1)));
    assert!(admitted_at.unwrap().elapsed() >= Duration::from_millis(900));
}

#[test]
fn match_before_deadline_restarts_it_for_the_next_sheet() {
    let config = TunnelConfig {
        tunnel_timeout_secs: 1,
        ..TunnelConfig::default()
    };
    let mut reset_at = None;
    let out = run_line(config, |line| {
        line.sheet(line.infeed, 500);
        line.sheet(line.infeed, 1_500);
        line.wait_until("admissions", |l| l.tunnel.snapshot().queue_len == 2);

        std::thread::sleep(Duration::from_millis(700));
        reset_at = Some(Instant::now());
        line.sheet(line.outfeed, 480);
        line.wait_until("match", |l| l.tunnel.snapshot().matched == 1);
        assert!(line.tunnel.is_watchdog_armed());
    });

    // The first deadline fell ~300ms after the match; only the restarted
    // one may fire.
    assert_eq!(out.fault, TunnelFault::SheetStuckInTunnel);
    assert!(reset_at.unwrap().elapsed() >= Duration::from_millis(900));
    assert_eq!(out.shutdown_event(), Some((TunnelFault::SheetStuckInTunnel, 1)));
    assert_eq!(out.shutdowns, vec![TunnelFault::SheetStuckInTunnel]);
    assert_eq!(out.snapshot.matched, 1);
}

#[test]
fn last_match_before_deadline_keeps_line_running() {
    let config = TunnelConfig {
        tunnel_timeout_secs: 1,
        ..TunnelConfig::default()
    };
    let out = run_line(config, |line| {
        line.sheet(line.infeed, 500);
        line.wait_until("admission", |l| l.tunnel.snapshot().queue_len == 1);

        std::thread::sleep(Duration::from_millis(700));
        line.sheet(line.outfeed, 480);
        line.wait_until("match", |l| l.tunnel.snapshot().matched == 1);
        assert!(!line.tunnel.is_watchdog_armed());

        // Well past the deadline the first sheet armed.
        std::thread::sleep(Duration::from_millis(600));
        assert_eq!(
            line.sink.count(|e| matches!(e, TunnelEvent::Shutdown { .. })),
            0,
            "watchdog fired after the tunnel emptied"
        );

        for _ in 0..4 {
            line.sheet(line.infeed, 500);
        }
    });

    assert_eq!(out.fault, TunnelFault::TooManySheets);
    assert_eq!(out.shutdowns, vec![TunnelFault::TooManySheets]);
    assert_eq!(out.snapshot.admitted, 5);
    assert_eq!(out.snapshot.matched, 1);
}

#[test]
fn covered_infeed_sensor_faults() {
    let config = TunnelConfig {
        min_occlusion_ms: 100,
        max_occlusion_ms: 400,
        occlusion_check_interval_ms: 100,
        ..TunnelConfig::default()
    };
    let start = Instant::now();
    let out = run_line(config, |line| line.cover(line.infeed));

    assert_eq!(out.fault, TunnelFault::InfeedStuck);
    assert!(start.elapsed() >= Duration::from_millis(400));
    assert_eq!(out.shutdown_event(), Some((TunnelFault::InfeedStuck, 0)));
}

#[test]
fn covered_outfeed_sensor_faults() {
    let config = TunnelConfig {
        min_occlusion_ms: 100,
        max_occlusion_ms: 400,
        occlusion_check_interval_ms: 100,
        ..TunnelConfig::default()
    };
    let out = run_line(config, |line| line.cover(line.outfeed));

    assert_eq!(out.fault, TunnelFault::OutfeedStuck);
    assert_eq!(out.shutdowns, vec![TunnelFault::OutfeedStuck]);
}

// ── Non-fatal conditions ──────────────────────────────────────

#[test]
fn unexpected_outfeed_and_noise_keep_running() {
    let out = run_line(TunnelConfig::default(), |line| {
        line.sheet(line.outfeed, 500);
        line.wait_until("unexpected outfeed", |l| {
            l.sink
                .count(|e| matches!(e, TunnelEvent::UnexpectedOutfeed { .. }))
                == 1
        });
        line.sheet(line.infeed, 120);
        line.wait_until("noise", |l| {
            l.sink
                .count(|e| matches!(e, TunnelEvent::NoiseRejected { .. }))
                == 1
        });
        assert_eq!(line.tunnel.snapshot().queue_len, 0);

        for _ in 0..4 {
            line.sheet(line.infeed, 600);
        }
    });

    // Only the overflow stopped the line.
    assert_eq!(out.fault, TunnelFault::TooManySheets);
    assert_eq!(out.shutdowns, vec![TunnelFault::TooManySheets]);
}
