//! Period keys: the calendar grouping that names each journal file.
//!
//! A period is either a single day (`DD-MM-YYYY`) or a calendar month
//! (`YYYY-MM`). The key string is also the filename stem. Day stems do not
//! sort chronologically as plain strings, so ordering always goes through the
//! parsed start date.

use crate::constants;
use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How entries are grouped into files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeriodGranularity {
    /// One file per calendar day, named `DD-MM-YYYY.md`.
    Day,
    /// One file per calendar month, named `YYYY-MM.md`.
    Month,
}

impl PeriodGranularity {
    fn key_format(self) -> &'static str {
        match self {
            PeriodGranularity::Day => constants::DAY_KEY_FORMAT,
            PeriodGranularity::Month => constants::MONTH_KEY_FORMAT,
        }
    }
}

impl FromStr for PeriodGranularity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(PeriodGranularity::Day),
            "month" | "monthly" => Ok(PeriodGranularity::Month),
            other => Err(AppError::Config(format!(
                "Unknown period '{}': expected 'day' or 'month'",
                other
            ))),
        }
    }
}

impl fmt::Display for PeriodGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodGranularity::Day => write!(f, "day"),
            PeriodGranularity::Month => write!(f, "month"),
        }
    }
}

/// Identifies one period file.
///
/// Ordering is calendar order of the period's first day.
///
/// # Examples
///
/// ```
/// use devjournal::journal_core::{PeriodGranularity, PeriodKey};
///
/// let key = PeriodKey::parse(PeriodGranularity::Day, "01-05-2025").unwrap();
/// assert_eq!(key.file_name(), "01-05-2025.md");
///
/// let month = PeriodKey::parse(PeriodGranularity::Month, "2025-05").unwrap();
/// assert_eq!(month.to_string(), "2025-05");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    start: NaiveDate,
    granularity: PeriodGranularity,
}

impl PeriodKey {
    /// The period containing `date`.
    pub fn for_date(granularity: PeriodGranularity, date: NaiveDate) -> Self {
        let start = match granularity {
            PeriodGranularity::Day => date,
            // Day 1 always exists.
            PeriodGranularity::Month => date.with_day(1).unwrap_or(date),
        };
        PeriodKey { start, granularity }
    }

    /// The period containing `timestamp`.
    pub fn for_datetime(granularity: PeriodGranularity, timestamp: &NaiveDateTime) -> Self {
        Self::for_date(granularity, timestamp.date())
    }

    /// Parses a filename stem.
    ///
    /// Only canonical, zero-padded stems are accepted, so every key has exactly
    /// one spelling on disk.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Journal` when the stem is not a valid key for the
    /// granularity.
    pub fn parse(granularity: PeriodGranularity, stem: &str) -> AppResult<Self> {
        let parsed = match granularity {
            PeriodGranularity::Day => NaiveDate::parse_from_str(stem, constants::DAY_KEY_FORMAT),
            PeriodGranularity::Month => {
                NaiveDate::parse_from_str(&format!("{}-01", stem), "%Y-%m-%d")
            }
        };

        let date = parsed.map_err(|_| invalid_key(granularity, stem))?;
        let key = Self::for_date(granularity, date);
        if key.stem() != stem {
            return Err(invalid_key(granularity, stem));
        }
        Ok(key)
    }

    /// The granularity this key was built for.
    pub fn granularity(&self) -> PeriodGranularity {
        self.granularity
    }

    /// First day covered by the period.
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Filename stem, which is also the key's canonical spelling.
    pub fn stem(&self) -> String {
        self.start
            .format(self.granularity.key_format())
            .to_string()
    }

    /// Filename of the period file, including the extension.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.stem(), constants::JOURNAL_FILE_EXTENSION)
    }

    /// Human-readable label, e.g. "Thursday, 01 May 2025" or "May 2025".
    pub fn display_label(&self) -> String {
        let format = match self.granularity {
            PeriodGranularity::Day => constants::DAY_LABEL_FORMAT,
            PeriodGranularity::Month => constants::MONTH_LABEL_FORMAT,
        };
        self.start.format(format).to_string()
    }
}

fn invalid_key(granularity: PeriodGranularity, stem: &str) -> AppError {
    let expected = match granularity {
        PeriodGranularity::Day => "DD-MM-YYYY",
        PeriodGranularity::Month => "YYYY-MM",
    };
    AppError::Journal(format!(
        "Invalid {} period '{}': expected {}",
        granularity, stem, expected
    ))
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem())
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.stem())
    }
}
