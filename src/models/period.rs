use std::fmt;

use chrono::{Datelike, Local, Months, NaiveDate};

use crate::error::{FinTrackError, Result};

// ---------------------------------------------------------------------------
// Period: a (year, month) pair
// ---------------------------------------------------------------------------

/// A calendar month. Expense and budget queries are scoped by period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    first_day: NaiveDate,
}

impl Period {
    /// Create a period; `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| {
                FinTrackError::InvalidArgument(format!("invalid period {}-{:02}", year, month))
            })
    }

    /// The period containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The period containing today's local date.
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    /// Parse `YYYY-MM`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || FinTrackError::InvalidArgument(format!("expected YYYY-MM, got {:?}", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// First day of the following period (exclusive upper bound of this one).
    pub fn end_exclusive(&self) -> NaiveDate {
        self.next().first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end_exclusive().pred_opt().unwrap_or(self.first_day)
    }

    pub fn days(&self) -> u32 {
        self.last_day().day()
    }

    pub fn next(&self) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_add_months(Months::new(1))
                .unwrap_or(self.first_day),
        }
    }

    pub fn previous(&self) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.first_day),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date < self.end_exclusive()
    }

    /// Short chart label, `MM/YY`.
    pub fn label(&self) -> String {
        format!("{:02}/{:02}", self.month(), self.year().rem_euclid(100))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year(), self.month())
    }
}
