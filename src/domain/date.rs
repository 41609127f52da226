//! Calendar dates for bottles
//!
//! Dates are written `dd.mm.yyyy` with zero-padded day and month
//! (e.g. `05.01.2030`). Input is more lenient: `5.1.2030` is accepted and
//! canonicalized.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const CANONICAL_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid date format '{0}': expected dd.mm.yyyy")]
    Format(String),

    #[error("Invalid date '{0}': day and month must be numbers and the year must have 4 digits")]
    Digits(String),

    #[error("Invalid date '{0}': month must be 1-12 and day must be 1-31")]
    Range(String),

    #[error("Invalid date '{0}': no such day in the calendar")]
    Calendar(String),
}

/// A validated calendar date in canonical `dd.mm.yyyy` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BottleDate(NaiveDate);

impl BottleDate {
    /// Wraps an already-valid date
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Signed number of days from `self` to `later`
    pub fn days_until(&self, later: BottleDate) -> i64 {
        (later.0 - self.0).num_days()
    }
}

/// Parses and canonicalizes a `dd.mm.yyyy` date
///
/// The checks run from coarse to fine: shape, digits, ranges, and finally
/// the calendar itself, so the reason reported is the first one that fails.
pub fn validate(raw: &str) -> Result<BottleDate, DateError> {
    let input = raw.trim();
    let parts: Vec<&str> = input.split('.').collect();

    let &[day, month, year] = parts.as_slice() else {
        return Err(DateError::Format(input.to_string()));
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(day) || !all_digits(month) || year.len() != 4 || !all_digits(year) {
        return Err(DateError::Digits(input.to_string()));
    }

    // Digit-only strings only fail to parse on overflow, which is out of range anyway
    let range_err = || DateError::Range(input.to_string());
    let day: u32 = day.parse().map_err(|_| range_err())?;
    let month: u32 = month.parse().map_err(|_| range_err())?;
    let year: i32 = year.parse().map_err(|_| range_err())?;

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(range_err());
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .map(BottleDate)
        .ok_or_else(|| DateError::Calendar(input.to_string()))
}

impl fmt::Display for BottleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CANONICAL_FORMAT))
    }
}

impl FromStr for BottleDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

impl TryFrom<String> for BottleDate {
    type Error = DateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BottleDate> for String {
    fn from(date: BottleDate) -> Self {
        date.to_string()
    }
}

/// English ordinal for a day of the month: 1st, 2nd, 3rd, 4th, 11th, 21st
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// English month name, 1-based
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown")
}
