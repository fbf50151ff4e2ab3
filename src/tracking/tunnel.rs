//! Shared tunnel state: the sheet queue plus the watchdog's armed flag.
//!
//! These are the only resources both trackers mutate.  [`Tunnel`] is the
//! plain state machine; [`SharedTunnel`] wraps it in a critical-section
//! mutex and forwards watchdog commands to the watchdog task.
//!
//! Invariant: `watchdog_armed == !queue.is_empty()` after every call,
//! including calls that return a fault.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::debug;

use super::durations_match;
use super::queue::SheetQueue;
use crate::config::TunnelConfig;
use crate::error::TunnelFault;
use crate::watchdog::WatchdogCommand;

/// A sheet accepted at infeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub queue_len: usize,
    /// `Some(Arm)` on the 0→1 transition, `None` otherwise.
    pub command: Option<WatchdogCommand>,
}

/// Outcome of a qualifying occlusion at outfeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Nothing was tracked; the sheet is unaccounted for.
    Unexpected,
    /// Matched the oldest sheet, which was removed.
    Matched {
        expected_ms: u32,
        queue_len: usize,
        command: WatchdogCommand,
    },
    /// Did not match the oldest sheet.  The queue is unchanged.
    Mismatch { expected_ms: u32 },
}

/// Point-in-time view for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TunnelSnapshot {
    pub queue_len: usize,
    pub watchdog_armed: bool,
    pub admitted: u32,
    pub matched: u32,
}

#[derive(Debug)]
pub struct Tunnel {
    queue: SheetQueue,
    watchdog_armed: bool,
    tolerance_ms: u32,
    admitted: u32,
    matched: u32,
}

impl Tunnel {
    pub fn new(config: &TunnelConfig) -> Self {
        Self {
            queue: SheetQueue::new(usize::from(config.max_queue_len)),
            watchdog_armed: false,
            tolerance_ms: config.max_duration_tolerance_ms,
            admitted: 0,
            matched: 0,
        }
    }

    /// Track a sheet that cleared the infeed sensor after `duration_ms`.
    pub fn admit(&mut self, duration_ms: u32) -> Result<Admission, TunnelFault> {
        let command = if self.queue.is_empty() {
            self.watchdog_armed = true;
            Some(WatchdogCommand::Arm)
        } else {
            None
        };
        self.admitted = self.admitted.wrapping_add(1);
        let queue_len = self
            .queue
            .push_back(duration_ms)
            .map_err(|_| TunnelFault::TooManySheets)?;
        Ok(Admission { queue_len, command })
    }

    /// Match a sheet that cleared the outfeed sensor after `duration_ms`
    /// against the oldest tracked sheet.
    pub fn release(&mut self, duration_ms: u32) -> Release {
        if let Some(expected_ms) = self.queue.front() {
            if !durations_match(duration_ms, expected_ms, self.tolerance_ms) {
                return Release::Mismatch { expected_ms };
            }
        }
        let Ok(expected_ms) = self.queue.pop_front() else {
            return Release::Unexpected;
        };
        self.matched = self.matched.wrapping_add(1);

        let command = if self.queue.is_empty() {
            self.watchdog_armed = false;
            WatchdogCommand::Disarm
        } else {
            WatchdogCommand::Reset
        };
        Release::Matched {
            expected_ms,
            queue_len: self.queue.len(),
            command,
        }
    }

    /// Forcibly forget every tracked sheet (fault shutdown).
    pub fn drain(&mut self) -> usize {
        self.watchdog_armed = false;
        self.queue.drain()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_watchdog_armed(&self) -> bool {
        self.watchdog_armed
    }

    pub fn snapshot(&self) -> TunnelSnapshot {
        TunnelSnapshot {
            queue_len: self.queue.len(),
            watchdog_armed: self.watchdog_armed,
            admitted: self.admitted,
            matched: self.matched,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// SharedTunnel
// ───────────────────────────────────────────────────────────────

/// The tunnel as seen by the concurrent tasks.
///
/// Every queue mutation happens inside one critical section, and the
/// matching watchdog command is signalled before the section ends, so the
/// watchdog task converges on the state of the most recent mutation.
/// `Signal` keeps only the latest command, which is exactly that state.
pub struct SharedTunnel {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Tunnel>>,
    watchdog: Signal<CriticalSectionRawMutex, WatchdogCommand>,
}

impl SharedTunnel {
    pub fn new(config: &TunnelConfig) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Tunnel::new(config))),
            watchdog: Signal::new(),
        }
    }

    pub fn admit(&self, duration_ms: u32) -> Result<Admission, TunnelFault> {
        self.inner.lock(|cell| {
            let result = cell.borrow_mut().admit(duration_ms);
            if let Ok(Admission {
                command: Some(cmd), ..
            }) = result
            {
                self.watchdog.signal(cmd);
            }
            result
        })
    }

    pub fn release(&self, duration_ms: u32) -> Release {
        self.inner.lock(|cell| {
            let release = cell.borrow_mut().release(duration_ms);
            if let Release::Matched { command, .. } = release {
                self.watchdog.signal(command);
            }
            release
        })
    }

    /// Drain the queue and tell the watchdog to stand down.
    pub fn drain(&self) -> usize {
        self.inner.lock(|cell| {
            let drained = cell.borrow_mut().drain();
            self.watchdog.signal(WatchdogCommand::Disarm);
            debug!("tunnel drained ({} sheets)", drained);
            drained
        })
    }

    /// Whether sheets are still tracked.  The watchdog re-checks this
    /// before declaring a stuck sheet.
    pub fn is_watchdog_armed(&self) -> bool {
        self.inner.lock(|cell| cell.borrow().is_watchdog_armed())
    }

    pub fn snapshot(&self) -> TunnelSnapshot {
        self.inner.lock(|cell| cell.borrow().snapshot())
    }

    /// Wait for the next watchdog command.
    pub async fn next_command(&self) -> WatchdogCommand {
        self.watchdog.wait().await
    }

    /// Take a pending watchdog command without waiting.
    pub fn try_command(&self) -> Option<WatchdogCommand> {
        self.watchdog.try_take()
    }
}
