//! Edge debouncing for the photoelectric sheet sensors.
//!
//! ## Hardware
//!
//! Each sensor output is wired to a GPIO with the internal pull-up
//! enabled.  A sheet over the sensor pulls the line LOW, so a LOW reading
//! means "occluded" and maps to [`Edge::Activated`].
//!
//! The GPIO interrupt fires on both edges and may fire more than once per
//! physical transition.  Repeated readings of the same level are noise and
//! produce no event.

use core::sync::atomic::{AtomicBool, Ordering};

use super::{Edge, SensorId};

/// Last-reported-level filter for one sensor.
///
/// The level lives in an atomic so the interrupt handler can drive the
/// filter through a shared `&'static` reference.  Only that handler writes
/// it, so a plain `swap` is enough to detect a change.
pub struct DebouncedInput {
    sensor: SensorId,
    last_level: AtomicBool,
}

impl DebouncedInput {
    /// New filter assuming the sensor is clear (line pulled HIGH).
    pub const fn new(sensor: SensorId) -> Self {
        Self::with_level(sensor, true)
    }

    pub const fn with_level(sensor: SensorId, level: bool) -> Self {
        Self {
            sensor,
            last_level: AtomicBool::new(level),
        }
    }

    pub fn sensor(&self) -> SensorId {
        self.sensor
    }

    /// Last level that produced an event (or the initial level).
    pub fn last_level(&self) -> bool {
        self.last_level.load(Ordering::Acquire)
    }

    /// Feed one raw GPIO level.  Returns the logical edge if the level
    /// changed, `None` if it repeats the last reported level.
    ///
    /// Lock-free and bounded; safe to call from interrupt context.
    pub fn on_raw_transition(&self, level: bool) -> Option<Edge> {
        if self.last_level.swap(level, Ordering::AcqRel) == level {
            return None;
        }
        Some(if level { Edge::Deactivated } else { Edge::Activated })
    }
}
