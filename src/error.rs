//! Error types for the tunnel tracking firmware.
//!
//! [`TunnelFault`] is the fatal set the tasks report.  [`QueueError`] and
//! [`ConfigError`] stay local to their modules; the binary wraps startup
//! failures in `anyhow`.  All variants are `Copy` so they pass through
//! channels and atomics without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Tunnel faults
// ---------------------------------------------------------------------------

/// Fatal conditions raised by the tracking core.
///
/// Every fault stops the line and requires a physical inspection plus a
/// manual restart.  The discriminant is a stable non-zero code so the
/// [`FaultSink`](crate::fault::FaultSink) can latch it in an `AtomicU8`
/// (zero means "no fault").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TunnelFault {
    /// The infeed sensor stayed covered longer than `max_occlusion_ms`.
    InfeedStuck = 1,
    /// The outfeed sensor stayed covered longer than `max_occlusion_ms`.
    OutfeedStuck = 2,
    /// More sheets entered the tunnel than `max_queue_len`.
    TooManySheets = 3,
    /// The sheet leaving the tunnel does not match the oldest tracked sheet.
    DurationMismatch = 4,
    /// No sheet left the tunnel within `tunnel_timeout_secs`.
    SheetStuckInTunnel = 5,
}

impl TunnelFault {
    /// Stable wire/latch code for this fault.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`code`](Self::code).  `0` and unknown codes map to `None`.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::InfeedStuck),
            2 => Some(Self::OutfeedStuck),
            3 => Some(Self::TooManySheets),
            4 => Some(Self::DurationMismatch),
            5 => Some(Self::SheetStuckInTunnel),
            _ => None,
        }
    }
}

impl fmt::Display for TunnelFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InfeedStuck => write!(f, "infeed sensor covered too long"),
            Self::OutfeedStuck => write!(f, "outfeed sensor covered too long"),
            Self::TooManySheets => write!(f, "too many sheets in tunnel"),
            Self::DurationMismatch => write!(f, "outfeed duration does not match oldest sheet"),
            Self::SheetStuckInTunnel => write!(f, "sheet stuck in tunnel"),
        }
    }
}

impl std::error::Error for TunnelFault {}

// ---------------------------------------------------------------------------
// Queue errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// `pop_front` on an empty queue (caller skipped the length check).
    Empty,
    /// `push_back` went past the configured bound, or the backing store
    /// had no free slot.
    Full,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "sheet queue empty"),
            Self::Full => write!(f, "sheet queue full"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for [`TunnelConfig`](crate::config::TunnelConfig).
    Parse,
    /// A field failed range validation.  The message names the field.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "config parse failed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
