//! Wall-clock source
//!
//! Expiry is computed on wall-clock time, so adjusting the system clock
//! shifts when timed sanctions are reversed.

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;

/// Source of the current wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.write() = instant;
    }

    /// Move forward by `delta`
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.write();
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}
