//! Source of "today"
//!
//! Readiness and elapsed-day figures depend on the current date. Everything
//! that needs it takes a [`Clock`] so tests can pin the date.

use chrono::{Local, NaiveDate};

use super::date::BottleDate;

pub trait Clock {
    fn today(&self) -> BottleDate;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> BottleDate {
        BottleDate::from_naive(Local::now().date_naive())
    }
}

/// A clock stuck on one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub BottleDate);

impl FixedClock {
    pub fn ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(|d| Self(BottleDate::from_naive(d)))
    }
}

impl Clock for FixedClock {
    fn today(&self) -> BottleDate {
        self.0
    }
}
