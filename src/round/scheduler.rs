//! Deferred callbacks on a pausable clock.
//!
//! The round never sleeps or spawns threads. Anything that should happen
//! "later" (a flip settling, a mismatch delay expiring) is scheduled here
//! with a payload describing what to do, and handed back when the clock
//! reaches its due time. The owner drives the clock; not advancing it while
//! paused is what keeps remaining durations intact across a pause.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Handle for a scheduled callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Timer({})", self.0)
    }
}

#[derive(Clone, Debug)]
struct Entry<T> {
    id: TimerId,
    due_ms: u64,
    payload: T,
}

/// Pending deferred callbacks ordered by due time, then by scheduling order.
///
/// A round has at most a handful of callbacks in flight, so a small inline
/// vector beats a heap.
#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    entries: SmallVec<[Entry<T>; 4]>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            entries: SmallVec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock reading.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedule `payload` to come due `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u32, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due_ms: self.now_ms.saturating_add(u64::from(delay_ms)),
            payload,
        });
        id
    }

    /// Cancel every pending callback.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.entries.len();
        self.entries.clear();
        cancelled
    }

    /// Time left until a callback fires.
    #[must_use]
    pub fn remaining_ms(&self, id: TimerId) -> Option<u64> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.due_ms.saturating_sub(self.now_ms))
    }

    /// Pop the earliest callback due at or before `until_ms`, moving the
    /// clock to its due time.
    ///
    /// Callers loop on this so callbacks scheduled while handling one
    /// payload can still come due within the same advance.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<T> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due_ms <= until_ms)
            .min_by_key(|(_, entry)| (entry.due_ms, entry.id))
            .map(|(index, _)| index)?;

        let entry = self.entries.remove(index);
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some(entry.payload)
    }

    /// Move the clock forward without firing anything.
    ///
    /// Call after draining [`pop_due`](Self::pop_due) for the same target.
    pub fn advance_to(&mut self, target_ms: u64) {
        self.now_ms = self.now_ms.max(target_ms);
    }
}
