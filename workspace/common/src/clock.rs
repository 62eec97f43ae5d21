use std::fmt::Debug;
use std::sync::Mutex;

use chrono::{Duration, NaiveDateTime, SubsecRound, Utc};

/// Source of "now" for every timestamp the application writes.
///
/// Rows get their `created_at`/`updated_at` from here instead of relying on
/// the database default, so tests can pin time.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in UTC.
///
/// Truncated to microseconds, the resolution of a Postgres `timestamp`, so a
/// stamped value reads back unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc().trunc_subsecs(6)
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        // A poisoned lock still holds a valid timestamp
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn fixed_clock_moves_only_when_told() {
        let clock = FixedClock::new(noon());
        assert_eq!(clock.now(), noon());
        assert_eq!(clock.now(), noon());

        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), noon() + Duration::minutes(5));

        clock.set(noon());
        assert_eq!(clock.now(), noon());
    }

    #[test]
    fn system_clock_has_microsecond_resolution() {
        let now = SystemClock.now();
        assert_eq!(now.nanosecond() % 1_000, 0);
    }
}
