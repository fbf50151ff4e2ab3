//! Interrupt-side hand-off: debounce, timestamp, push.

use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::digital::InputPin;

use super::{DebouncedInput, Edge, EdgeChannel, SensorEvent, SensorId};

/// One sensor's ISR entry point.
///
/// Owns the debounce filter and borrows the channel that feeds the
/// sensor's tracker task.  Every method takes `&self` so the ISR can
/// reach it through a `'static` reference.
pub struct EdgeInput<'a> {
    debounce: DebouncedInput,
    edges: &'a EdgeChannel,
    dropped: AtomicU32,
}

impl<'a> EdgeInput<'a> {
    pub const fn new(sensor: SensorId, edges: &'a EdgeChannel) -> Self {
        Self {
            debounce: DebouncedInput::new(sensor),
            edges,
            dropped: AtomicU32::new(0),
        }
    }

    pub fn sensor(&self) -> SensorId {
        self.debounce.sensor()
    }

    /// Handle one raw level read at `at_ms`.
    ///
    /// Non-blocking: a full channel drops the edge and bumps the
    /// dropped-edge counter.  Returns the edge that was detected, whether
    /// or not it fit in the channel.
    pub fn on_level(&self, level: bool, at_ms: u64) -> Option<Edge> {
        let edge = self.debounce.on_raw_transition(level)?;
        if self.edges.try_send(SensorEvent { edge, at_ms }).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        Some(edge)
    }

    /// Sample `pin` and handle the level it reports.
    pub fn on_pin<P: InputPin>(&self, pin: &mut P, at_ms: u64) -> Result<Option<Edge>, P::Error> {
        let level = pin.is_high()?;
        Ok(self.on_level(level, at_ms))
    }

    /// Edges lost to a full channel since boot.
    pub fn dropped_edges(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}
