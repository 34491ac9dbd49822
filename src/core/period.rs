//! Calendar-month period keys (`YYYY-MM`), the time axis of every series.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month, parsed from and displayed as `YYYY-MM`.
///
/// Internally pinned to the first day of the month so that ordering and
/// month stepping come from chrono rather than hand-rolled date math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(NaiveDate);

impl Period {
    /// Parse a `YYYY-MM` key. Strict: four digit year, two digit month 01-12.
    pub fn parse(key: &str) -> Result<Self> {
        let bytes = key.as_bytes();
        let shape_ok = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !shape_ok {
            return Err(ForecastError::InvalidPeriodKey(key.to_string()));
        }
        let date = NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d")
            .map_err(|_| ForecastError::InvalidPeriodKey(key.to_string()))?;
        Ok(Period(date))
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// The 1-based calendar month.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Zero-based month-of-year index, used for seasonal bucketing.
    pub fn month_index(&self) -> usize {
        (self.0.month0()) as usize
    }

    /// The following calendar month.
    pub fn next(&self) -> Self {
        // Adding one month to a first-of-month date cannot overflow within
        // any plausible forecasting range.
        Period(self.0 + Months::new(1))
    }

    /// The period `n` months after this one.
    pub fn add_months(&self, n: u32) -> Self {
        Period(self.0 + Months::new(n))
    }

    /// Whole months from `self` to `other` (positive when `other` is later).
    pub fn months_until(&self, other: &Period) -> i64 {
        let years = i64::from(other.year() - self.year());
        years * 12 + i64::from(other.month()) - i64::from(self.month())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for Period {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        Period::parse(s)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
