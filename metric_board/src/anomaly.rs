//! Request/response contract of the anomaly-detection endpoint
//!
//! The forecasting service also flags points of a series that fall outside a
//! band around their local level. Requests carry the same `{date, value}`
//! points as forecast requests.

use crate::error::{BoardError, Result};
use crate::forecast::{finite_ratios, to_wire_points, validate_points, validate_season_length, ForecastPoint};
use crate::utils::format_iso_date;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use series_math::{SeriesError, TimePoint};
use std::fmt;
use std::str::FromStr;

/// Fewest points the endpoint accepts
pub const MIN_ANOMALY_POINTS: usize = 20;

/// How strict the detection band is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    /// Confidence level, in percent, of the band points are checked against
    pub fn confidence_level(self) -> u32 {
        match self {
            Sensitivity::Low => 90,
            Sensitivity::Medium => 95,
            Sensitivity::High => 99,
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sensitivity::Low => write!(f, "low"),
            Sensitivity::Medium => write!(f, "medium"),
            Sensitivity::High => write!(f, "high"),
        }
    }
}

impl FromStr for Sensitivity {
    type Err = SeriesError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(Sensitivity::Low),
            "medium" => Ok(Sensitivity::Medium),
            "high" => Ok(Sensitivity::High),
            other => Err(SeriesError::InvalidConfig(format!(
                "Unknown sensitivity '{}'",
                other
            ))),
        }
    }
}

/// Severity the service assigns to a flagged point
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Severity for a deviation measured in band half-widths.
    ///
    /// Stricter sensitivities escalate at smaller deviations.
    pub fn classify(deviation: f64, sensitivity: Sensitivity) -> Self {
        let (high, medium) = match sensitivity {
            Sensitivity::Low => (3.0, 2.0),
            Sensitivity::Medium => (2.0, 1.5),
            Sensitivity::High => (1.5, 1.0),
        };

        if deviation > high {
            Severity::High
        } else if deviation > medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

fn default_show_bands() -> bool {
    true
}

/// Body of an anomaly-detection request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRequest {
    pub data: Vec<ForecastPoint>,
    #[serde(default)]
    pub sensitivity: Sensitivity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_length: Option<u32>,
    #[serde(default = "default_show_bands")]
    pub show_confidence_bands: bool,
}

impl AnomalyRequest {
    /// Build a request from a ratio series, dropping points without a finite ratio.
    ///
    /// The season length is left to the service unless set with
    /// [`AnomalyRequest::with_season_length`].
    pub fn from_series(points: &[TimePoint], sensitivity: Sensitivity) -> Self {
        Self {
            data: to_wire_points(finite_ratios(points)),
            sensitivity,
            season_length: None,
            show_confidence_bands: true,
        }
    }

    pub fn with_season_length(mut self, season_length: u32) -> Self {
        self.season_length = Some(season_length);
        self
    }

    pub fn with_confidence_bands(mut self, show: bool) -> Self {
        self.show_confidence_bands = show;
        self
    }

    /// Check the request against the endpoint's acceptance rules
    pub fn validate(&self) -> Result<()> {
        if self.data.len() < MIN_ANOMALY_POINTS {
            return Err(BoardError::ValidationError(format!(
                "Anomaly detection needs at least {} points with a value, have {}",
                MIN_ANOMALY_POINTS,
                self.data.len()
            )));
        }

        validate_season_length(self.season_length)?;
        validate_points(&self.data, "anomaly")
    }

    /// Serialize the request body
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Band a point was expected to fall in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedRange {
    pub lower: f64,
    pub upper: f64,
}

impl ExpectedRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// One flagged point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyPoint {
    pub date: String,
    pub value: f64,
    pub severity: Severity,
    pub expected_range: ExpectedRange,
    /// Distance from the band centre in band half-widths
    pub deviation: f64,
}

/// Detection band on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub date: String,
    pub lower: f64,
    pub upper: f64,
}

/// Reply of the anomaly-detection endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyResponse {
    pub anomalies: Vec<AnomalyPoint>,
    pub total_points: usize,
    pub anomaly_count: usize,
    /// Share of flagged points, 0 to 1
    pub anomaly_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_bands: Option<Vec<ConfidenceBand>>,
    pub model_used: String,
    pub sensitivity: Sensitivity,
    pub computation_time_ms: f64,
}

impl AnomalyResponse {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Flagged point on the calendar day of `date`
    pub fn anomaly_at(&self, date: DateTime<Utc>) -> Option<&AnomalyPoint> {
        let day = format_iso_date(date);
        self.anomalies.iter().find(|a| a.date == day)
    }

    /// Flagged points at or above `severity`
    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &AnomalyPoint> {
        self.anomalies.iter().filter(move |a| a.severity >= severity)
    }
}
