//! FIFO of expected outfeed durations, one entry per sheet in the tunnel.
//!
//! Push at the back on infeed, match and pop at the front on outfeed, so
//! the oldest sheet is always the first match candidate.  Backed by a
//! fixed-capacity `heapless::Deque`; no heap.
//!
//! Not internally synchronised.  [`SharedTunnel`](super::tunnel::SharedTunnel)
//! owns the only instance behind its mutex.

use heapless::Deque;

use crate::error::QueueError;

/// Backing storage slots.  The configured bound must stay below this so
/// the over-capacity entry still fits when it trips the fault.
pub const SHEET_SLOTS: usize = 8;

#[derive(Debug)]
pub struct SheetQueue {
    entries: Deque<u32, SHEET_SLOTS>,
    max_len: usize,
}

impl SheetQueue {
    /// `max_len` is clamped into `1..SHEET_SLOTS`.
    pub fn new(max_len: usize) -> Self {
        Self {
            entries: Deque::new(),
            max_len: max_len.clamp(1, SHEET_SLOTS - 1),
        }
    }

    /// Append the newest sheet's infeed duration.  Returns the new length.
    ///
    /// Past `max_len` the entry is still retained and `Full` is returned,
    /// so the drained queue on shutdown reflects every sheet that was
    /// seen.  Only when the backing storage itself is exhausted is the
    /// entry dropped.
    pub fn push_back(&mut self, duration_ms: u32) -> Result<usize, QueueError> {
        self.entries
            .push_back(duration_ms)
            .map_err(|_| QueueError::Full)?;
        let len = self.entries.len();
        if len > self.max_len {
            return Err(QueueError::Full);
        }
        Ok(len)
    }

    /// Oldest entry, without removing it.
    pub fn front(&self) -> Option<u32> {
        self.entries.front().copied()
    }

    /// Remove and return the oldest entry.
    pub fn pop_front(&mut self) -> Result<u32, QueueError> {
        self.entries.pop_front().ok_or(QueueError::Empty)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discard every entry.  Returns how many were removed.
    pub fn drain(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    /// Entries oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().copied()
    }
}
