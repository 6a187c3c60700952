//! Aggregation of a raw series into a displayable one
//!
//! Two modes are supported:
//! - **Smoothing**: trailing rolling window of `period` `unit`s, one output
//!   point per input point
//! - **Group-by**: calendar buckets (week, month, quarter, year), one output
//!   point per non-empty bucket
//!
//! Smoothing sums numerators and denominators over the window and divides the
//! sums, so points with large denominators weigh more than a plain mean of
//! ratios would give them. Points whose ratio is not finite contribute nothing.

use crate::buckets::{bucket_key_and_representative_date, BucketKey};
use crate::calendar::{apply_calendar_offset, normalize_to_midnight, CalendarUnit};
use crate::rolling::RatioWindow;
use crate::{Result, SeriesError, TimePoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Smallest accepted smoothing period
pub const MIN_PERIOD: i32 = 1;
/// Largest accepted smoothing period
pub const MAX_PERIOD: i32 = 99;

/// Which aggregation is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregationMode {
    Smoothing,
    GroupBy,
}

/// Length unit of the smoothing window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingUnit {
    Days,
    Weeks,
    Months,
    Years,
}

/// Calendar bucket used by group-by aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupByPeriod {
    Week,
    Month,
    Quarter,
    Year,
}

impl SmoothingUnit {
    fn calendar_unit(self) -> CalendarUnit {
        match self {
            SmoothingUnit::Days => CalendarUnit::Day,
            SmoothingUnit::Weeks => CalendarUnit::Week,
            SmoothingUnit::Months => CalendarUnit::Month,
            SmoothingUnit::Years => CalendarUnit::Year,
        }
    }
}

impl FromStr for AggregationMode {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "smoothing" => Ok(AggregationMode::Smoothing),
            "groupBy" => Ok(AggregationMode::GroupBy),
            other => Err(SeriesError::InvalidConfig(format!(
                "Unknown aggregation mode '{}'",
                other
            ))),
        }
    }
}

impl FromStr for SmoothingUnit {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "days" => Ok(SmoothingUnit::Days),
            "weeks" => Ok(SmoothingUnit::Weeks),
            "months" => Ok(SmoothingUnit::Months),
            "years" => Ok(SmoothingUnit::Years),
            other => Err(SeriesError::InvalidConfig(format!(
                "Unknown smoothing unit '{}'",
                other
            ))),
        }
    }
}

impl FromStr for GroupByPeriod {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "week" => Ok(GroupByPeriod::Week),
            "month" => Ok(GroupByPeriod::Month),
            "quarter" => Ok(GroupByPeriod::Quarter),
            "year" => Ok(GroupByPeriod::Year),
            other => Err(SeriesError::InvalidConfig(format!(
                "Unknown group-by period '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMode::Smoothing => write!(f, "smoothing"),
            AggregationMode::GroupBy => write!(f, "groupBy"),
        }
    }
}

impl fmt::Display for SmoothingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmoothingUnit::Days => write!(f, "days"),
            SmoothingUnit::Weeks => write!(f, "weeks"),
            SmoothingUnit::Months => write!(f, "months"),
            SmoothingUnit::Years => write!(f, "years"),
        }
    }
}

impl fmt::Display for GroupByPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupByPeriod::Week => write!(f, "week"),
            GroupByPeriod::Month => write!(f, "month"),
            GroupByPeriod::Quarter => write!(f, "quarter"),
            GroupByPeriod::Year => write!(f, "year"),
        }
    }
}

/// Aggregation settings for one chart.
///
/// Only the fields of the active `mode` are read: `period` and `unit` for
/// smoothing, `group_by_period` for group-by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationConfig {
    pub enabled: bool,
    pub mode: AggregationMode,
    pub period: i32,
    pub unit: SmoothingUnit,
    pub group_by_period: GroupByPeriod,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: AggregationMode::Smoothing,
            period: 7,
            unit: SmoothingUnit::Days,
            group_by_period: GroupByPeriod::Month,
        }
    }
}

impl AggregationConfig {
    /// Enabled smoothing over `period` `unit`s
    pub fn smoothing(period: i32, unit: SmoothingUnit) -> Self {
        Self {
            enabled: true,
            mode: AggregationMode::Smoothing,
            period,
            unit,
            ..Self::default()
        }
    }

    /// Enabled calendar group-by
    pub fn group_by(group_by_period: GroupByPeriod) -> Self {
        Self {
            enabled: true,
            mode: AggregationMode::GroupBy,
            group_by_period,
            ..Self::default()
        }
    }

    /// Whether this config groups points into calendar buckets
    pub fn is_group_by(&self) -> bool {
        self.enabled && self.mode == AggregationMode::GroupBy
    }

    /// Smoothing period clamped to [`MIN_PERIOD`], [`MAX_PERIOD`]
    pub fn effective_period(&self) -> i32 {
        self.period.clamp(MIN_PERIOD, MAX_PERIOD)
    }
}

/// Apply `config` to `series`.
///
/// Disabled configs return the series unchanged. Smoothing keeps the input
/// order and dates. Group-by output is sorted by bucket start.
pub fn apply_aggregation(series: &[TimePoint], config: &AggregationConfig) -> Result<Vec<TimePoint>> {
    if !config.enabled {
        return Ok(series.to_vec());
    }

    let aggregated = match config.mode {
        AggregationMode::Smoothing => {
            let period = config.effective_period();
            if period != config.period {
                warn!(
                    requested = config.period,
                    applied = period,
                    "smoothing period out of range, clamped"
                );
            }
            smooth(series, period, config.unit)?
        }
        AggregationMode::GroupBy => group_by(series, config.group_by_period)?,
    };

    debug!(
        mode = %config.mode,
        input = series.len(),
        output = aggregated.len(),
        "aggregated series"
    );

    Ok(aggregated)
}

fn smooth(series: &[TimePoint], period: i32, unit: SmoothingUnit) -> Result<Vec<TimePoint>> {
    // Window membership is decided on calendar days, whatever the time of day
    let days: Vec<DateTime<Utc>> = series.iter().map(|p| normalize_to_midnight(p.date)).collect();
    let mut order: Vec<usize> = (0..series.len()).collect();
    order.sort_by_key(|&i| days[i]);

    let mut smoothed = series.to_vec();
    let mut window = RatioWindow::new();
    let mut next = 0;

    for &idx in &order {
        let day = days[idx];

        // Points on the same day all belong to each other's window
        while next < order.len() && days[order[next]] <= day {
            let member = series[order[next]];
            window.push(TimePoint::new(days[order[next]], member.numerator, member.denominator));
            next += 1;
        }

        let boundary = apply_calendar_offset(day, -period, unit.calendar_unit())?;
        window.evict_through(boundary);

        let (numerator, denominator) = window.means();
        smoothed[idx].numerator = numerator;
        smoothed[idx].denominator = denominator;
    }

    Ok(smoothed)
}

fn group_by(series: &[TimePoint], period: GroupByPeriod) -> Result<Vec<TimePoint>> {
    let mut buckets: BTreeMap<BucketKey, TimePoint> = BTreeMap::new();

    for point in series {
        let (key, start) = bucket_key_and_representative_date(point.date, period)?;
        let bucket = buckets
            .entry(key)
            .or_insert_with(|| TimePoint::new(start, 0.0, 0.0));
        bucket.numerator += point.numerator;
        bucket.denominator += point.denominator;
    }

    Ok(buckets.into_values().collect())
}
