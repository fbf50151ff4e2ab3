//! Property tests for the tracking core's invariants.
//!
//! Runs on host only: proptest is not available for ESP32 targets.

#![cfg(not(target_os = "espidf"))]

use proptest::prelude::*;

use uvtunnel::config::TunnelConfig;
use uvtunnel::error::TunnelFault;
use uvtunnel::sensors::{DebouncedInput, SensorId};
use uvtunnel::tracking::durations_match;
use uvtunnel::tracking::tunnel::{Release, Tunnel};

#[derive(Debug, Clone)]
enum Op {
    Admit(u32),
    Release(u32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (300u32..2_000).prop_map(Op::Admit),
        (300u32..2_000).prop_map(Op::Release),
    ]
}

// ── Queue bound and watchdog flag ─────────────────────────────

proptest! {
    /// After every non-fault outcome the queue is within bounds, and the
    /// armed flag always mirrors a non-empty queue.
    #[test]
    fn queue_bounded_and_armed_iff_non_empty(
        max_len in 1u8..=7,
        ops in proptest::collection::vec(op(), 0..64),
    ) {
        let config = TunnelConfig { max_queue_len: max_len, ..TunnelConfig::default() };
        let mut tunnel = Tunnel::new(&config);

        for op in ops {
            match op {
                Op::Admit(d) => match tunnel.admit(d) {
                    Ok(a) => prop_assert!(a.queue_len <= usize::from(max_len)),
                    Err(fault) => {
                        prop_assert_eq!(fault, TunnelFault::TooManySheets);
                        prop_assert!(tunnel.is_watchdog_armed());
                        break;
                    }
                },
                Op::Release(d) => {
                    let before = tunnel.len();
                    match tunnel.release(d) {
                        Release::Matched { queue_len, .. } => prop_assert_eq!(queue_len, before - 1),
                        Release::Mismatch { .. } | Release::Unexpected => prop_assert_eq!(tunnel.len(), before),
                    }
                }
            }
            prop_assert!(tunnel.len() <= usize::from(max_len));
            prop_assert_eq!(tunnel.is_watchdog_armed(), !tunnel.is_empty());
        }
    }
}

// ── Matching rule ─────────────────────────────────────────────

proptest! {
    #[test]
    fn match_is_symmetric(a in any::<u32>(), b in any::<u32>(), tol in 0u32..5_000) {
        prop_assert_eq!(durations_match(a, b, tol), durations_match(b, a, tol));
    }

    #[test]
    fn match_boundary_at_default_tolerance(a in 0u32..1_000_000) {
        prop_assert!(durations_match(a, a + 299, 300));
        prop_assert!(durations_match(a, a + 300, 300));
        prop_assert!(!durations_match(a, a + 301, 300));
    }
}

// ── Debounce ──────────────────────────────────────────────────

proptest! {
    /// Repeating a level never produces an event.
    #[test]
    fn repeated_level_is_silent(level in any::<bool>(), repeats in 1usize..20) {
        let input = DebouncedInput::with_level(SensorId::Infeed, level);
        for _ in 0..repeats {
            prop_assert_eq!(input.on_raw_transition(level), None);
        }
    }

    /// N alternating levels produce exactly N events.
    #[test]
    fn alternating_levels_each_produce_one_event(n in 1usize..50) {
        let input = DebouncedInput::new(SensorId::Outfeed);
        let events = (0..n)
            .filter_map(|i| input.on_raw_transition(i % 2 == 1))
            .count();
        prop_assert_eq!(events, n);
    }
}
