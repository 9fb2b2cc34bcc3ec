//! Budget period kinds
//!
//! A budget covers an inclusive date range. The period kind records how the
//! range was chosen and can compute the range of a period containing a given
//! date.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a budget's date range was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
    /// Explicit start and end dates
    Custom,
}

impl PeriodKind {
    /// All period kinds in display order
    pub fn all() -> &'static [Self] {
        &[
            Self::Daily,
            Self::Weekly,
            Self::Monthly,
            Self::Yearly,
            Self::Custom,
        ]
    }

    /// The inclusive range of the period of this kind that contains `date`.
    ///
    /// Weeks are ISO weeks (Monday through Sunday). Returns `None` for
    /// `Custom`, whose range is always supplied explicitly.
    pub fn range_containing(&self, date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Self::Daily => Some((date, date)),
            Self::Weekly => {
                let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
                Some((start, start + Duration::days(6)))
            }
            Self::Monthly => {
                let start = date.with_day(1)?;
                let end = start.checked_add_months(Months::new(1))? - Duration::days(1);
                Some((start, end))
            }
            Self::Yearly => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1)?;
                let end = NaiveDate::from_ymd_opt(date.year(), 12, 31)?;
                Some((start, end))
            }
            Self::Custom => None,
        }
    }

    /// The range of the period immediately after the one starting at `start`
    /// and ending at `end`
    pub fn following(&self, start: NaiveDate, end: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Self::Custom => {
                let length = end - start;
                let next_start = end + Duration::days(1);
                Some((next_start, next_start + length))
            }
            _ => self.range_containing(end + Duration::days(1)),
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for PeriodKind {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" | "annual" => Ok(Self::Yearly),
            "custom" => Ok(Self::Custom),
            other => Err(PeriodParseError::UnknownKind(other.to_string())),
        }
    }
}

/// Error type for period parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    UnknownKind(String),
}

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind(s) => write!(
                f,
                "Unknown period '{}', expected daily, weekly, monthly, yearly or custom",
                s
            ),
        }
    }
}

impl std::error::Error for PeriodParseError {}
