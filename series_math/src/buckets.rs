//! Calendar buckets for group-by aggregation.
//!
//! Group-by aggregation and selection normalization both go through
//! [`bucket_key_and_representative_date`], so a selected date always lands on
//! the same representative date the aggregated series uses.
//!
//! Weeks are ISO weeks (Monday to Sunday). The representative date of every
//! bucket is its first day at midnight UTC.

use crate::aggregation::GroupByPeriod;
use crate::{Result, SeriesError};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use std::fmt;

/// Identity of a calendar bucket.
///
/// Ordering follows time: `year` first, then the position of the bucket
/// inside that year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub period: GroupByPeriod,
    /// Calendar year, or ISO week-year for weekly buckets
    pub year: i32,
    /// ISO week (1-53), month (1-12), quarter (1-4), or 1 for yearly buckets
    pub index: u32,
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.period {
            GroupByPeriod::Week => write!(f, "{}-W{:02}", self.year, self.index),
            GroupByPeriod::Month => write!(f, "{}-{:02}", self.year, self.index),
            GroupByPeriod::Quarter => write!(f, "{}-Q{}", self.year, self.index),
            GroupByPeriod::Year => write!(f, "{}", self.year),
        }
    }
}

/// Bucket key and representative date (bucket start, midnight UTC) for `date`
pub fn bucket_key_and_representative_date(
    date: DateTime<Utc>,
    period: GroupByPeriod,
) -> Result<(BucketKey, DateTime<Utc>)> {
    let day = date.date_naive();

    let (key, start) = match period {
        GroupByPeriod::Week => {
            let week = day.iso_week();
            let start = NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon);
            (bucket(period, week.year(), week.week()), start)
        }
        GroupByPeriod::Month => {
            let start = NaiveDate::from_ymd_opt(day.year(), day.month(), 1);
            (bucket(period, day.year(), day.month()), start)
        }
        GroupByPeriod::Quarter => {
            let quarter = day.month0() / 3 + 1;
            let start = NaiveDate::from_ymd_opt(day.year(), (quarter - 1) * 3 + 1, 1);
            (bucket(period, day.year(), quarter), start)
        }
        GroupByPeriod::Year => {
            let start = NaiveDate::from_ymd_opt(day.year(), 1, 1);
            (bucket(period, day.year(), 1), start)
        }
    };

    let start = start.ok_or_else(|| {
        SeriesError::DateOutOfRange(format!("no {} bucket start for {}", period, day))
    })?;

    Ok((key, Utc.from_utc_datetime(&start.and_time(NaiveTime::default()))))
}

fn bucket(period: GroupByPeriod, year: i32, index: u32) -> BucketKey {
    BucketKey {
        period,
        year,
        index,
    }
}
