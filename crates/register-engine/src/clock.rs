//! # Clock Abstraction
//!
//! The one place the engine reads the time. Everything downstream -
//! suspension timestamps, daily sequence ids, the "has the calendar day
//! advanced" cleanup guard - takes time from this trait, so tests drive a
//! fake clock instead of sleeping against the wall clock.

use chrono::{DateTime, NaiveDate, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Today's calendar date, derived from [`now`](Clock::now).
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
