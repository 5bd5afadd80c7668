//! Calendar clock port
//!
//! "Today" is a plain calendar date in the process-local timezone. Services
//! take the clock by injection so tests can pin the date.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of the current calendar date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    /// Calendar date of `instant` in the timezone `today` is reckoned in.
    fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate;
}

/// Process-local wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&Local).date_naive()
    }
}

/// Clock pinned to a fixed date, reckoned in UTC
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }

    fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.date_naive()
    }
}
