//! Calendar-aware date offsets
//!
//! Days and weeks are exact multiples of a day. Months, quarters and years move
//! the calendar fields, and a day of month that does not exist in the target
//! month is clamped to that month's last day (Jan 31 + 1 month = Feb 29 in 2024,
//! Feb 29 2024 + 1 year = Feb 28 2025). All arithmetic is done in UTC.

use crate::{Result, SeriesError};
use chrono::{DateTime, Days, Months, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar unit used for shifting dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarUnit {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl fmt::Display for CalendarUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarUnit::Day => write!(f, "day"),
            CalendarUnit::Week => write!(f, "week"),
            CalendarUnit::Month => write!(f, "month"),
            CalendarUnit::Quarter => write!(f, "quarter"),
            CalendarUnit::Year => write!(f, "year"),
        }
    }
}

impl FromStr for CalendarUnit {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(CalendarUnit::Day),
            "week" => Ok(CalendarUnit::Week),
            "month" => Ok(CalendarUnit::Month),
            "quarter" => Ok(CalendarUnit::Quarter),
            "year" => Ok(CalendarUnit::Year),
            other => Err(SeriesError::InvalidConfig(format!(
                "Unknown calendar unit '{}'",
                other
            ))),
        }
    }
}

/// Add `periods` units to `date`.
///
/// Negative `periods` move backwards. Zero periods always returns `date`
/// unchanged. Fails with [`SeriesError::DateOutOfRange`] when the result
/// cannot be represented.
pub fn apply_calendar_offset(
    date: DateTime<Utc>,
    periods: i32,
    unit: CalendarUnit,
) -> Result<DateTime<Utc>> {
    let periods = i64::from(periods);
    let shifted = match unit {
        CalendarUnit::Day => add_days(date, periods),
        CalendarUnit::Week => add_days(date, periods * 7),
        CalendarUnit::Month => add_months(date, periods),
        CalendarUnit::Quarter => add_months(date, periods * 3),
        CalendarUnit::Year => add_months(date, periods * 12),
    };

    shifted.ok_or_else(|| {
        SeriesError::DateOutOfRange(format!(
            "cannot shift {} by {} {}(s)",
            date.to_rfc3339(),
            periods,
            unit
        ))
    })
}

/// Strip the time of day, keeping the UTC calendar date
pub fn normalize_to_midnight(date: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.date_naive().and_time(NaiveTime::default()))
}

pub(crate) fn add_days(date: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

fn add_months(date: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}
