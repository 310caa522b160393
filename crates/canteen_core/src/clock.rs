//! Clock port: the current local wall-clock instant.
//!
//! Deadline checks read the clock at request time through this trait so
//! tests can pin or advance the instant.

use chrono::{Local, NaiveDateTime};
use std::cell::Cell;

/// Supplies "now" in the canteen's local time zone.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Production clock backed by the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Test clock that returns a settable instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Moves the clock to `now`; callers may move it backwards.
    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};
    use chrono::NaiveDate;

    #[test]
    fn fixed_clock_returns_last_set_instant_through_references() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 9)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid instant");
        let later = start + chrono::TimeDelta::hours(5);
        let clock = FixedClock::new(start);
        let by_ref: &FixedClock = &clock;

        assert_eq!(by_ref.now(), start);
        clock.set(later);
        assert_eq!(by_ref.now(), later);
    }
}
