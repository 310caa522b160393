//! Calendar inputs: meal dates (`YYYY-MM-DD`) and report months (`YYYY-MM`).
//!
//! # Invariants
//! - Dates and months are parsed strictly; no time component is accepted.
//! - `MonthKey` ordering is chronological.
//! - Month membership is a prefix match on the `YYYY-MM-DD` rendering.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));
static MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("valid month regex"));

/// Storage/wire format of meal dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    InvalidDate(String),
    InvalidMonth(String),
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(value) => write!(f, "expected date as YYYY-MM-DD, got `{value}`"),
            Self::InvalidMonth(value) => write!(f, "expected month as YYYY-MM, got `{value}`"),
        }
    }
}

impl Error for CalendarError {}

/// Parses a meal date in strict `YYYY-MM-DD` form.
pub fn parse_date(value: &str) -> Result<NaiveDate, CalendarError> {
    let trimmed = value.trim();
    if !DATE_RE.is_match(trimmed) {
        return Err(CalendarError::InvalidDate(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| CalendarError::InvalidDate(trimmed.to_string()))
}

/// Renders a meal date in its storage form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// One calendar month, used as the payroll reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// Month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn parse(value: &str) -> Result<Self, CalendarError> {
        let trimmed = value.trim();
        let invalid = || CalendarError::InvalidMonth(trimmed.to_string());
        let caps = MONTH_RE.captures(trimmed).ok_or_else(invalid)?;
        let year = caps[1].parse::<i32>().map_err(|_| invalid())?;
        let month = caps[2].parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }

    pub fn first_day(self) -> NaiveDate {
        // Constructors only admit valid (year, month) pairs.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// `YYYY-MM-` prefix shared by every date in this month.
    pub fn date_prefix(self) -> String {
        format!("{self}-")
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
