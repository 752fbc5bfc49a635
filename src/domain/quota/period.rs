//! Calendar-month usage period.
//!
//! Usage counters reset at calendar-month boundaries in UTC. Pinning the
//! reference timezone here keeps callers in different zones from deriving
//! different buckets for the same instant.

use chrono::{Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Identifier of one calendar-month usage bucket, e.g. `2026-08`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// The bucket containing the given instant (UTC calendar month).
    pub fn containing(ts: Timestamp) -> Self {
        let dt = ts.as_datetime();
        Self {
            year: dt.year(),
            month: dt.month(),
        }
    }

    /// The following bucket.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First instant of this bucket.
    pub fn starts_at(&self) -> Timestamp {
        let dt = Utc
            .with_ymd_and_hms(self.year, self.month, 1, 0, 0, 0)
            .single()
            .expect("first day of month is always a valid instant");
        Timestamp::from_datetime(dt)
    }

    /// The instant counters for this bucket reset (start of the next one).
    pub fn resets_at(&self) -> Timestamp {
        self.next().starts_at()
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::invalid_format("period_key", "expected YYYY-MM");
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}
