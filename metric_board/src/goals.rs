//! Goal lines drawn over a metric

use crate::error::{BoardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use series_math::normalize_to_midnight;

/// Target value of a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GoalTarget {
    /// Same target on every date
    Constant { value: f64 },
    /// Target moving linearly between two dated values
    #[serde(rename_all = "camelCase")]
    Linear {
        start_date: DateTime<Utc>,
        start_value: f64,
        end_date: DateTime<Utc>,
        end_value: f64,
    },
}

/// A named goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub label: String,
    pub target: GoalTarget,
}

impl Goal {
    /// Goal with a constant target
    pub fn constant(id: &str, label: &str, value: f64) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            target: GoalTarget::Constant { value },
        }
    }

    /// Goal value on `date`, or `None` outside a linear goal's date range
    pub fn value_at(&self, date: DateTime<Utc>) -> Option<f64> {
        match self.target {
            GoalTarget::Constant { value } => Some(value),
            GoalTarget::Linear {
                start_date,
                start_value,
                end_date,
                end_value,
            } => {
                let day = normalize_to_midnight(date);
                let start = normalize_to_midnight(start_date);
                let end = normalize_to_midnight(end_date);
                if day < start || day > end {
                    return None;
                }

                let span = (end - start).num_days();
                if span == 0 {
                    return Some(end_value);
                }

                let fraction = (day - start).num_days() as f64 / span as f64;
                Some(start_value + (end_value - start_value) * fraction)
            }
        }
    }

    /// Reject non-finite targets and linear goals that end before they start
    pub fn validate(&self) -> Result<()> {
        match self.target {
            GoalTarget::Constant { value } if !value.is_finite() => Err(self.invalid("a non-finite target")),
            GoalTarget::Linear {
                start_value,
                end_value,
                ..
            } if !start_value.is_finite() || !end_value.is_finite() => {
                Err(self.invalid("a non-finite target"))
            }
            GoalTarget::Linear {
                start_date,
                end_date,
                ..
            } if normalize_to_midnight(end_date) < normalize_to_midnight(start_date) => {
                Err(self.invalid("an end date before its start date"))
            }
            _ => Ok(()),
        }
    }

    fn invalid(&self, problem: &str) -> BoardError {
        BoardError::ValidationError(format!("Goal '{}' has {}", self.id, problem))
    }
}
