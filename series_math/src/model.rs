use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of a ratio metric, e.g. conversions over sessions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// Observation date; no particular time of day is assumed
    pub date: DateTime<Utc>,
    /// Numerator of the ratio
    pub numerator: f64,
    /// Denominator of the ratio, may be zero
    pub denominator: f64,
}

impl TimePoint {
    /// Create a new time point
    pub fn new(date: DateTime<Utc>, numerator: f64, denominator: f64) -> Self {
        Self {
            date,
            numerator,
            denominator,
        }
    }

    /// Raw ratio, which is NaN or infinite when the denominator is zero
    pub fn ratio(&self) -> f64 {
        self.numerator / self.denominator
    }

    /// Ratio if it is a finite number, `None` otherwise.
    ///
    /// Downstream consumers must go through this rather than [`TimePoint::ratio`]
    /// so that a zero denominator reads as "no value".
    pub fn finite_ratio(&self) -> Option<f64> {
        let ratio = self.ratio();
        ratio.is_finite().then_some(ratio)
    }
}
