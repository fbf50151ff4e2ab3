//! Fuzz target: both trackers fed an arbitrary edge stream
//!
//! Each input byte is one edge: bit 7 picks the sensor, bit 6 the edge
//! kind, the low six bits the gap since the previous edge (x50 ms).
//!
//! Invariants checked:
//! - No panics under any edge ordering
//! - The watchdog flag mirrors a non-empty tunnel after every edge
//! - The queue never exceeds its bound except on the edge that faults
//!
//! cargo fuzz run fuzz_edge_stream

#![no_main]

use libfuzzer_sys::fuzz_target;
use uvtunnel::app::events::TunnelEvent;
use uvtunnel::app::ports::EventSink;
use uvtunnel::config::TunnelConfig;
use uvtunnel::sensors::SensorEvent;
use uvtunnel::tracking::{InfeedTracker, OutfeedTracker, SharedTunnel, Tracker};

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &TunnelEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let config = TunnelConfig::default();
    let tunnel = SharedTunnel::new(&config);
    let mut infeed = InfeedTracker::new(&config, &tunnel);
    let mut outfeed = OutfeedTracker::new(&config, &tunnel);
    let mut sink = Discard;
    let mut now_ms = 0u64;

    for &byte in data {
        now_ms += u64::from(byte & 0x3F) * 50;
        let event = if byte & 0x40 == 0 {
            SensorEvent::activated(now_ms)
        } else {
            SensorEvent::deactivated(now_ms)
        };
        let step = if byte & 0x80 == 0 {
            infeed.on_edge(event, &mut sink)
        } else {
            outfeed.on_edge(event, &mut sink)
        };

        let snap = tunnel.snapshot();
        assert_eq!(snap.watchdog_armed, snap.queue_len > 0);
        if step.is_err() {
            return;
        }
        assert!(snap.queue_len <= usize::from(config.max_queue_len));
    }
});
