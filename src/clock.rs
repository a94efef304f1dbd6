//! Wall-clock abstraction.
//!
//! Token expiry and request timestamps both read the clock through [`Clock`], so tests can pin
//! or advance time without sleeping.

use {
    chrono::{DateTime, Duration, Utc},
    parking_lot::Mutex,
    std::{fmt::Debug, sync::Arc},
};

/// Source of the current time.
pub trait Clock: Debug + Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock pinned to `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Create a clock pinned to `secs` seconds after the Unix epoch.
    pub fn at_epoch_seconds(secs: i64) -> Self {
        Self::new(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }

    /// Set the current time.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    /// Set the current time to `secs` seconds after the Unix epoch.
    pub fn set_epoch_seconds(&self, secs: i64) {
        self.set(DateTime::from_timestamp(secs, 0).unwrap_or_default());
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
