//! Persisted chart configuration
//!
//! A [`ChartConfig`] is the JSON document stored per chart. It only holds
//! settings; derived series are recomputed from it on every render.

use crate::error::{BoardError, Result};
use crate::forecast::ForecastModelKind;
use crate::goals::Goal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use series_math::{normalize_to_midnight, AggregationConfig, Shadow};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Inclusive date range a user has focused on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FocusPeriod {
    /// Create a focus period, rejecting an end before the start
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let period = Self { start, end };
        period.validate()?;
        Ok(period)
    }

    /// Whether `date` falls inside the period, compared by calendar day
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        let day = normalize_to_midnight(date);
        day >= normalize_to_midnight(self.start) && day <= normalize_to_midnight(self.end)
    }

    fn validate(&self) -> Result<()> {
        if normalize_to_midnight(self.end) < normalize_to_midnight(self.start) {
            return Err(BoardError::ValidationError(format!(
                "Focus period ends ({}) before it starts ({})",
                self.end.to_rfc3339(),
                self.start.to_rfc3339()
            )));
        }
        Ok(())
    }
}

/// Free-text note pinned to a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub date: DateTime<Utc>,
    pub text: String,
}

/// Forecast options stored with a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSettings {
    pub enabled: bool,
    pub horizon: u32,
    pub model: ForecastModelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_length: Option<u32>,
    #[serde(default = "default_confidence_levels")]
    pub confidence_levels: Vec<u32>,
}

fn default_confidence_levels() -> Vec<u32> {
    vec![95]
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            horizon: 30,
            model: ForecastModelKind::Auto,
            season_length: None,
            confidence_levels: default_confidence_levels(),
        }
    }
}

/// Everything persisted for one chart
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub shadows: Vec<Shadow>,
    /// Draw one mean band instead of a line per shadow
    #[serde(default)]
    pub average_shadows: bool,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_period: Option<FocusPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<ForecastSettings>,
}

impl ChartConfig {
    /// Parse and validate a config from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a config from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the config to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if let Some(focus) = &self.focus_period {
            focus.validate()?;
        }

        let mut ids = HashSet::new();
        for shadow in &self.shadows {
            if !ids.insert(shadow.id.as_str()) {
                return Err(BoardError::ValidationError(format!(
                    "Duplicate shadow id '{}'",
                    shadow.id
                )));
            }
        }

        for goal in &self.goals {
            goal.validate()?;
        }

        Ok(())
    }

    /// Shadows that are switched on
    pub fn enabled_shadows(&self) -> impl Iterator<Item = &Shadow> {
        self.shadows.iter().filter(|s| s.enabled)
    }
}
