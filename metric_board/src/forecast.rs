//! Request/response contract of the external forecasting service
//!
//! The service itself is a black box reached over HTTP. This module builds the
//! request body from a ratio series, checks it against the service's
//! acceptance rules before it is sent, and reads the reply back into a form
//! the comparison evaluator and the transformations can use.

use crate::config::ForecastSettings;
use crate::error::{BoardError, Result};
use crate::utils::{date_parser, format_iso_date};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use series_math::{SeriesError, TimePoint};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Fewest points the service accepts
pub const MIN_POINTS: usize = 10;
/// Longest horizon the service accepts
pub const MAX_HORIZON: u32 = 365;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Model requested from the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastModelKind {
    #[default]
    Auto,
    Arima,
    Ets,
    Theta,
}

impl fmt::Display for ForecastModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastModelKind::Auto => write!(f, "auto"),
            ForecastModelKind::Arima => write!(f, "arima"),
            ForecastModelKind::Ets => write!(f, "ets"),
            ForecastModelKind::Theta => write!(f, "theta"),
        }
    }
}

impl FromStr for ForecastModelKind {
    type Err = SeriesError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ForecastModelKind::Auto),
            "arima" => Ok(ForecastModelKind::Arima),
            "ets" => Ok(ForecastModelKind::Ets),
            "theta" => Ok(ForecastModelKind::Theta),
            other => Err(SeriesError::InvalidConfig(format!(
                "Unknown forecast model '{}'",
                other
            ))),
        }
    }
}

/// Sampling frequency of a series, as inferred from its date gaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Infer the frequency from the median gap between consecutive dates.
    ///
    /// Fewer than two dates are treated as daily.
    pub fn infer(dates: &[DateTime<Utc>]) -> Self {
        let mut sorted = dates.to_vec();
        sorted.sort();

        let mut gaps: Vec<f64> = sorted
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_seconds() as f64)
            .collect();
        if gaps.is_empty() {
            return Frequency::Daily;
        }

        gaps.sort_by(f64::total_cmp);
        let mid = gaps.len() / 2;
        let median = if gaps.len() % 2 == 0 {
            (gaps[mid - 1] + gaps[mid]) / 2.0
        } else {
            gaps[mid]
        };

        match (median / SECONDS_PER_DAY).floor() as i64 {
            days if days <= 1 => Frequency::Daily,
            days if days <= 8 => Frequency::Weekly,
            days if days <= 32 => Frequency::Monthly,
            days if days <= 100 => Frequency::Quarterly,
            _ => Frequency::Yearly,
        }
    }

    /// Usual seasonal cycle length at this frequency
    pub fn default_season_length(self) -> u32 {
        match self {
            Frequency::Daily => 7,
            Frequency::Weekly => 52,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Yearly => 1,
        }
    }
}

/// Single dated value, as exchanged with the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    pub value: f64,
}

/// Body of a forecast request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub data: Vec<ForecastPoint>,
    pub horizon: u32,
    pub model: ForecastModelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_length: Option<u32>,
    pub confidence_levels: Vec<u32>,
}

impl ForecastRequest {
    /// Build a request from a ratio series.
    ///
    /// Each point is resolved to its ratio; points without a finite ratio are
    /// dropped. When `settings` has no season length, one is inferred from the
    /// date spacing and used if it is greater than one.
    pub fn from_series(points: &[TimePoint], settings: &ForecastSettings) -> Self {
        let usable = finite_ratios(points);

        let season_length = settings.season_length.or_else(|| {
            let dates: Vec<DateTime<Utc>> = usable.iter().map(|&(date, _)| date).collect();
            let frequency = Frequency::infer(&dates);
            let inferred = frequency.default_season_length();
            debug!(?frequency, season_length = inferred, "inferred season length");
            (inferred > 1).then_some(inferred)
        });

        Self {
            data: to_wire_points(usable),
            horizon: settings.horizon,
            model: settings.model,
            season_length,
            confidence_levels: settings.confidence_levels.clone(),
        }
    }

    /// Check the request against the service's acceptance rules
    pub fn validate(&self) -> Result<()> {
        if self.data.len() < MIN_POINTS {
            return Err(BoardError::ValidationError(format!(
                "Forecast needs at least {} points with a value, have {}",
                MIN_POINTS,
                self.data.len()
            )));
        }

        if self.horizon == 0 || self.horizon > MAX_HORIZON {
            return Err(BoardError::InvalidParameter(format!(
                "Horizon must be between 1 and {}, got {}",
                MAX_HORIZON, self.horizon
            )));
        }

        validate_season_length(self.season_length)?;

        if let Some(level) = self
            .confidence_levels
            .iter()
            .find(|&&level| level == 0 || level >= 100)
        {
            return Err(BoardError::InvalidParameter(format!(
                "Confidence level must be between 1 and 99, got {}",
                level
            )));
        }

        validate_points(&self.data, "forecast")
    }

    /// Validated request for a chart, `None` when the chart has forecasting off
    pub fn for_chart(points: &[TimePoint], settings: Option<&ForecastSettings>) -> Result<Option<Self>> {
        match settings {
            Some(settings) if settings.enabled => {
                let request = Self::from_series(points, settings);
                request.validate()?;
                Ok(Some(request))
            }
            _ => Ok(None),
        }
    }

    /// Serialize the request body
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Diagnostics returned with a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    #[serde(default)]
    pub aic: Option<f64>,
    #[serde(default)]
    pub bic: Option<f64>,
    #[serde(default)]
    pub mape: Option<f64>,
    pub computation_time_ms: f64,
}

/// Body of a forecast reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub forecast: Vec<ForecastPoint>,
    /// Bounds keyed `lower_<level>` / `upper_<level>`, aligned with `forecast`
    #[serde(default)]
    pub confidence_intervals: BTreeMap<String, Vec<f64>>,
    pub model_used: String,
    pub metrics: ForecastMetrics,
}

impl ForecastResponse {
    /// Parse a reply body
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Forecast value on the calendar day of `date`
    pub fn value_at(&self, date: DateTime<Utc>) -> Option<f64> {
        let day = format_iso_date(date);
        self.forecast
            .iter()
            .find(|p| p.date == day)
            .map(|p| p.value)
            .filter(|v| v.is_finite())
    }

    /// Lower and upper bounds for a confidence level, if the service returned them
    pub fn interval(&self, level: u32) -> Option<(&[f64], &[f64])> {
        let lower = self.confidence_intervals.get(&format!("lower_{}", level))?;
        let upper = self.confidence_intervals.get(&format!("upper_{}", level))?;
        Some((lower.as_slice(), upper.as_slice()))
    }

    /// The forecast as a ratio series over a denominator of 1
    pub fn to_time_points(&self) -> Result<Vec<TimePoint>> {
        self.forecast
            .iter()
            .map(|p| -> Result<TimePoint> {
                Ok(TimePoint::new(date_parser::parse_date(&p.date)?, p.value, 1.0))
            })
            .collect()
    }
}

/// Finite ratios of `points` with their dates, in date order
pub(crate) fn finite_ratios(points: &[TimePoint]) -> Vec<(DateTime<Utc>, f64)> {
    let mut usable: Vec<(DateTime<Utc>, f64)> = points
        .iter()
        .filter_map(|p| p.finite_ratio().map(|ratio| (p.date, ratio)))
        .collect();
    usable.sort_by_key(|&(date, _)| date);
    usable
}

pub(crate) fn to_wire_points(usable: Vec<(DateTime<Utc>, f64)>) -> Vec<ForecastPoint> {
    usable
        .into_iter()
        .map(|(date, value)| ForecastPoint {
            date: format_iso_date(date),
            value,
        })
        .collect()
}

pub(crate) fn validate_season_length(season_length: Option<u32>) -> Result<()> {
    match season_length {
        Some(length) if length <= 1 => Err(BoardError::InvalidParameter(format!(
            "Season length must be greater than 1, got {}",
            length
        ))),
        _ => Ok(()),
    }
}

/// Every value finite and every date distinct
pub(crate) fn validate_points(data: &[ForecastPoint], purpose: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for point in data {
        if !point.value.is_finite() {
            return Err(BoardError::ValidationError(format!(
                "Invalid value at {}: {}",
                point.date, point.value
            )));
        }
        if !seen.insert(point.date.as_str()) {
            return Err(BoardError::ValidationError(format!(
                "Duplicate date {} in {} input",
                point.date, purpose
            )));
        }
    }
    Ok(())
}
