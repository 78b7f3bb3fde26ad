//! Inline expiry timer registry
//!
//! Each timed sanction may have one in-process timer. A timer is bound to
//! the `applied_at` of the record it was scheduled for, so a timer left over
//! from a replaced sanction can never claim the newer one.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::task::AbortHandle;

use mute_core::SanctionKey;

#[derive(Debug)]
struct TimerEntry {
    applied_at: DateTime<Utc>,
    handle: AbortHandle,
}

/// Pending inline timers keyed by sanction
#[derive(Debug, Default)]
pub struct TimerRegistry {
    entries: DashMap<SanctionKey, TimerEntry>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a timer, aborting any previous one for the key
    pub fn insert(&self, key: SanctionKey, applied_at: DateTime<Utc>, handle: AbortHandle) {
        if let Some(previous) = self.entries.insert(key, TimerEntry { applied_at, handle }) {
            previous.handle.abort();
        }
    }

    /// Called by a firing timer: take its own entry out of the registry
    ///
    /// Returns false when the timer was cancelled or superseded meanwhile.
    pub fn claim(&self, key: SanctionKey, applied_at: DateTime<Utc>) -> bool {
        self.entries
            .remove_if(&key, |_, entry| entry.applied_at == applied_at)
            .is_some()
    }

    /// Abort and forget the pending timer for `key`, if any
    pub fn cancel(&self, key: SanctionKey) -> bool {
        match self.entries.remove(&key) {
            Some((_, entry)) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: SanctionKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Abort every pending timer
    pub fn cancel_all(&self) {
        self.entries.retain(|_, entry| {
            entry.handle.abort();
            false
        });
    }
}
