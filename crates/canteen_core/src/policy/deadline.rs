//! Deadline policy for reservation mutations.
//!
//! # Responsibility
//! - Compute the order cutoff (00:00 of the meal date) and the exchange
//!   cutoff (12:00 of the meal date) in local time.
//! - Decide whether a release is allowed at a given instant.
//!
//! # Invariants
//! - Both predicates are monotonic in `now` for a fixed `date`.
//! - The cutoff instant itself counts as passed.
//! - Nothing here reads the clock; callers pass the request instant.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Hours after the order cutoff at which the exchange pool closes for a date.
pub const EXCHANGE_CUTOFF_HOURS: i64 = 12;

/// Which time rule rejected a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineRule {
    /// Placing, changing and cancelling closed at 00:00 of the meal date.
    OrderCutoff,
    /// Entering the exchange pool closed at 12:00 of the meal date.
    ExchangeCutoff,
    /// Release opens only once cancellation has closed.
    ReleaseNotYetOpen,
}

impl DeadlineRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OrderCutoff => "order_cutoff",
            Self::ExchangeCutoff => "exchange_cutoff",
            Self::ReleaseNotYetOpen => "release_not_yet_open",
        }
    }
}

impl Display for DeadlineRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn order_cutoff_at(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn exchange_cutoff_at(date: NaiveDate) -> NaiveDateTime {
    order_cutoff_at(date) + TimeDelta::hours(EXCHANGE_CUTOFF_HOURS)
}

/// No new reservation, change or cancellation for `date` once true.
pub fn order_cutoff_passed(date: NaiveDate, now: NaiveDateTime) -> bool {
    now >= order_cutoff_at(date)
}

/// No reservation for `date` may newly enter the exchange pool once true.
pub fn exchange_cutoff_passed(date: NaiveDate, now: NaiveDateTime) -> bool {
    now >= exchange_cutoff_at(date)
}

/// Release is open strictly between the two cutoffs: after the order cutoff
/// (cancellation no longer possible) and before the exchange cutoff.
pub fn check_release_window(date: NaiveDate, now: NaiveDateTime) -> Result<(), DeadlineRule> {
    if !order_cutoff_passed(date, now) {
        return Err(DeadlineRule::ReleaseNotYetOpen);
    }
    if exchange_cutoff_passed(date, now) {
        return Err(DeadlineRule::ExchangeCutoff);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date")
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("valid instant")
    }

    #[test]
    fn order_cutoff_is_midnight_starting_the_meal_date() {
        assert!(!order_cutoff_passed(meal_date(), at(9, 23, 59)));
        assert!(order_cutoff_passed(meal_date(), at(10, 0, 0)));
        assert!(order_cutoff_passed(meal_date(), at(11, 8, 0)));
    }

    #[test]
    fn exchange_cutoff_is_noon_of_the_meal_date() {
        assert_eq!(exchange_cutoff_at(meal_date()), at(10, 12, 0));
        assert!(!exchange_cutoff_passed(meal_date(), at(10, 11, 59)));
        assert!(exchange_cutoff_passed(meal_date(), at(10, 12, 0)));
    }

    #[test]
    fn release_window_is_between_the_cutoffs() {
        assert_eq!(
            check_release_window(meal_date(), at(9, 18, 0)),
            Err(DeadlineRule::ReleaseNotYetOpen)
        );
        assert_eq!(check_release_window(meal_date(), at(10, 0, 0)), Ok(()));
        assert_eq!(check_release_window(meal_date(), at(10, 11, 59)), Ok(()));
        assert_eq!(
            check_release_window(meal_date(), at(10, 12, 0)),
            Err(DeadlineRule::ExchangeCutoff)
        );
    }

    #[test]
    fn predicates_stay_true_once_passed() {
        let mut now = at(10, 0, 0);
        for _ in 0..72 {
            assert!(order_cutoff_passed(meal_date(), now));
            now += TimeDelta::hours(1);
        }
        assert!(exchange_cutoff_passed(meal_date(), now));
    }
}
