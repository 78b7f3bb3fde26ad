//! Per-key mutual exclusion
//!
//! Operations on the same `(guild_id, user_id)` run one at a time; unrelated
//! keys proceed concurrently. Entries are dropped once nobody holds or waits
//! on them, so the table only grows with in-flight work.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use mute_core::SanctionKey;

type LockTable = DashMap<SanctionKey, Arc<Mutex<()>>>;

/// Table of per-key async locks
#[derive(Debug, Default, Clone)]
pub struct KeyLocks {
    table: Arc<LockTable>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn acquire(&self, key: SanctionKey) -> KeyGuard {
        let mutex = self.table.entry(key).or_default().value().clone();
        let guard = mutex.lock_owned().await;
        KeyGuard {
            key,
            table: Arc::clone(&self.table),
            _guard: guard,
        }
    }

    /// Keys currently held or waited on
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Exclusive access to one key, released on drop
#[derive(Debug)]
pub struct KeyGuard {
    key: SanctionKey,
    table: Arc<LockTable>,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        // One reference in the table plus the one inside our guard: nobody is waiting
        self.table
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) <= 2);
    }
}
