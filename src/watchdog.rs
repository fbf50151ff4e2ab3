//! Stuck-sheet watchdog.
//!
//! Armed while at least one sheet is inside the tunnel.  Every matched
//! sheet restarts the deadline; the last matched sheet disarms it.  If the
//! deadline passes while armed, a sheet is stuck between the sensors.
//!
//! [`StuckSheetWatchdog`] is the deadline state machine.  [`run`] is the
//! task that feeds it commands from the [`SharedTunnel`] and sleeps until
//! the deadline.

use core::fmt;
use core::time::Duration;

use async_io_mini::Timer;
use futures_lite::FutureExt;
use log::{debug, info};

use crate::app::ports::Clock;
use crate::error::TunnelFault;
use crate::fault::FaultSink;
use crate::tracking::SharedTunnel;

/// Commands from the trackers to the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogCommand {
    /// A sheet entered an empty tunnel.
    Arm,
    /// A sheet left but others remain; restart the deadline.
    Reset,
    /// The last sheet left.
    Disarm,
}

impl fmt::Display for WatchdogCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arm => write!(f, "arm"),
            Self::Reset => write!(f, "reset"),
            Self::Disarm => write!(f, "disarm"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogState {
    Disarmed,
    Armed { deadline_ms: u64 },
}

pub struct StuckSheetWatchdog {
    state: WatchdogState,
    timeout_ms: u64,
}

impl StuckSheetWatchdog {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: WatchdogState::Disarmed,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn state(&self) -> WatchdogState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, WatchdogState::Armed { .. })
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        match self.state {
            WatchdogState::Armed { deadline_ms } => Some(deadline_ms),
            WatchdogState::Disarmed => None,
        }
    }

    /// Apply `command` received at `now_ms`.
    ///
    /// `Arm` and `Reset` both start a fresh full timeout.  A `Reset` that
    /// reaches a disarmed watchdog arms it: the `Arm` it follows was
    /// overwritten before the task observed it.
    pub fn apply(&mut self, command: WatchdogCommand, now_ms: u64) {
        match command {
            WatchdogCommand::Arm | WatchdogCommand::Reset => {
                let deadline_ms = now_ms.saturating_add(self.timeout_ms);
                if command == WatchdogCommand::Reset && !self.is_armed() {
                    debug!("watchdog: reset while disarmed, arming");
                }
                self.state = WatchdogState::Armed { deadline_ms };
            }
            WatchdogCommand::Disarm => self.state = WatchdogState::Disarmed,
        }
    }

    /// Milliseconds until the deadline, `None` while disarmed.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.deadline_ms().map(|d| d.saturating_sub(now_ms))
    }

    /// `Err(SheetStuckInTunnel)` once armed and past the deadline.
    pub fn poll(&self, now_ms: u64) -> Result<(), TunnelFault> {
        match self.state {
            WatchdogState::Armed { deadline_ms } if now_ms >= deadline_ms => {
                Err(TunnelFault::SheetStuckInTunnel)
            }
            _ => Ok(()),
        }
    }
}

// ── Task ──────────────────────────────────────────────────────

enum Wake {
    Command(WatchdogCommand),
    Deadline,
}

/// Watchdog task: runs until a fault is latched anywhere.
pub async fn run<C: Clock>(tunnel: &SharedTunnel, faults: &FaultSink, clock: &C, timeout: Duration) {
    let mut watchdog = StuckSheetWatchdog::new(timeout);
    info!("watchdog started (timeout {}ms)", timeout.as_millis());

    loop {
        let wake = match watchdog.remaining_ms(clock.now_ms()) {
            Some(remaining) => {
                async { Wake::Command(tunnel.next_command().await) }
                    .or(async {
                        Timer::after(Duration::from_millis(remaining)).await;
                        Wake::Deadline
                    })
                    .await
            }
            None => Wake::Command(tunnel.next_command().await),
        };

        if faults.is_faulted() {
            info!("watchdog stopping: system faulted");
            return;
        }

        match wake {
            Wake::Command(command) => {
                debug!("watchdog: {}", command);
                watchdog.apply(command, clock.now_ms());
            }
            Wake::Deadline => {
                // A command raced the deadline; it wins.
                if let Some(command) = tunnel.try_command() {
                    watchdog.apply(command, clock.now_ms());
                    continue;
                }
                if watchdog.poll(clock.now_ms()).is_err() {
                    if tunnel.is_watchdog_armed() {
                        faults.report(TunnelFault::SheetStuckInTunnel);
                        return;
                    }
                    watchdog.apply(WatchdogCommand::Disarm, clock.now_ms());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watchdog() -> StuckSheetWatchdog {
        StuckSheetWatchdog::new(Duration::from_secs(5))
    }

    #[test]
    fn starts_disarmed_and_never_expires() {
        let w = watchdog();
        assert!(!w.is_armed());
        assert_eq!(w.poll(u64::MAX), Ok(()));
        assert_eq!(w.remaining_ms(0), None);
    }

    #[test]
    fn arm_sets_full_deadline() {
        let mut w = watchdog();
        w.apply(WatchdogCommand::Arm, 1_000);
        assert_eq!(w.state(), WatchdogState::Armed { deadline_ms: 6_000 });
        assert_eq!(w.poll(5_999), Ok(()));
        assert_eq!(w.poll(6_000), Err(TunnelFault::SheetStuckInTunnel));
    }

    #[test]
    fn reset_restarts_from_now() {
        let mut w = watchdog();
        w.apply(WatchdogCommand::Arm, 0);
        w.apply(WatchdogCommand::Reset, 4_000);
        assert_eq!(w.remaining_ms(4_000), Some(5_000));
        assert_eq!(w.poll(8_999), Ok(()));
    }

    #[test]
    fn reset_while_disarmed_arms() {
        let mut w = watchdog();
        w.apply(WatchdogCommand::Reset, 100);
        assert_eq!(w.deadline_ms(), Some(5_100));
    }

    #[test]
    fn disarm_cancels_deadline() {
        let mut w = watchdog();
        w.apply(WatchdogCommand::Arm, 0);
        w.apply(WatchdogCommand::Disarm, 1_000);
        assert!(!w.is_armed());
        assert_eq!(w.poll(10_000), Ok(()));
    }

    #[test]
    fn stale_deadline_after_tunnel_emptied_is_not_a_fault() {
        use crate::adapters::time::MonotonicClock;
        use crate::config::TunnelConfig;

        let tunnel = SharedTunnel::new(&TunnelConfig::default());
        let faults = FaultSink::new();
        let clock = MonotonicClock::new();
        tunnel.admit(500).unwrap();

        let line = async {
            Timer::after(Duration::from_millis(10)).await;
            // Empty the tunnel and swallow the Disarm, leaving the task
            // with only its local deadline.
            assert!(matches!(tunnel.release(480), crate::tracking::tunnel::Release::Matched { .. }));
            assert_eq!(tunnel.try_command(), Some(WatchdogCommand::Disarm));

            Timer::after(Duration::from_millis(100)).await;
            assert!(faults.report(TunnelFault::InfeedStuck), "watchdog latched a fault");
            // Wake the task so it sees the latch and stops.
            tunnel.admit(500).unwrap();
        };
        futures_lite::future::block_on(futures_lite::future::zip(
            run(&tunnel, &faults, &clock, Duration::from_millis(50)),
            line,
        ));

        assert_eq!(faults.latched(), Some(TunnelFault::InfeedStuck));
    }
}
