//! Time sources
//!
//! The engine never measures time itself; it reads a [`Clock`] and only
//! compares against deadlines.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// A monotonically non-decreasing source of "now"
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Errors from moving a [`ManualClock`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("clock cannot move backwards from {current} to {requested}")]
    Backwards {
        current: DateTime<Utc>,
        requested: DateTime<Utc>,
    },
}

/// Manually driven clock; clones share the same instant
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Start at the current wall-clock time
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move forward by `by`; negative durations are ignored
    pub fn advance(&self, by: Duration) -> DateTime<Utc> {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        if by > Duration::zero() {
            *now += by;
        }
        *now
    }

    /// Jump to `instant`, which must not be earlier than the current time
    pub fn set(&self, instant: DateTime<Utc>) -> Result<(), ClockError> {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        if instant < *now {
            return Err(ClockError::Backwards {
                current: *now,
                requested: instant,
            });
        }
        *now = instant;
        Ok(())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_clones_share_time() {
        let clock = ManualClock::new(start());
        let handle = clock.clone();
        handle.advance(Duration::days(4));
        assert_eq!(clock.now(), start() + Duration::days(4));
    }

    #[test]
    fn test_never_moves_backwards() {
        let clock = ManualClock::new(start());
        clock.advance(Duration::seconds(-10));
        assert_eq!(clock.now(), start());

        assert!(clock.set(start() - Duration::seconds(1)).is_err());
        clock.set(start() + Duration::hours(1)).unwrap();
        assert_eq!(clock.now(), start() + Duration::hours(1));
    }

    #[test]
    fn test_system_clock_is_recent() {
        let before = Utc::now();
        assert!(SystemClock.now() >= before);
    }
}
