//! GPIO pin assignments for the tunnel controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sheet sensors (photo-eyes, open-collector, active LOW)
// ---------------------------------------------------------------------------

/// Infeed sensor at the tunnel entrance.  LOW = sheet present.
pub const INFEED_GPIO: i32 = 12;
/// Outfeed sensor at the tunnel exit.  LOW = sheet present.
pub const OUTFEED_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Line outputs
// ---------------------------------------------------------------------------

/// Run-enable to the conveyor/lamp interlock relay.  HIGH = line may run.
pub const RUN_ENABLE_GPIO: i32 = 15;
/// Fault indicator lamp.  HIGH = faulted.
pub const FAULT_LED_GPIO: i32 = 14;
