//! Metric-row evaluation: the numbers shown next to a chart
//!
//! For one displayed series this computes the value at the selected date,
//! summary statistics over the focus period, and deltas against every
//! reference line (shadows, the shadow average, goals and the forecast).

use crate::config::FocusPeriod;
use crate::error::Result;
use crate::forecast::ForecastResponse;
use crate::goals::Goal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use series_math::{
    normalize_selection_date, normalize_to_midnight, AggregationConfig, AveragedShadowData,
    ShadowData, TimePoint,
};
use statrs::statistics::Statistics;

/// Kind of reference a comparison is made against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonKind {
    Shadow,
    ShadowAverage,
    Goal,
    Forecast,
}

/// Current value against one reference value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub kind: ComparisonKind,
    pub label: String,
    pub reference: f64,
    /// `current - reference`
    pub absolute_delta: f64,
    /// Delta relative to `|reference|`, in percent; `None` for a zero reference
    pub percent_delta: Option<f64>,
}

/// Statistics of the finite ratios inside the focus period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FocusStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Everything shown for one metric row
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRow {
    /// Day the row was evaluated at, `None` for an empty series without selection
    pub evaluated_at: Option<DateTime<Utc>>,
    pub selection_value: Option<f64>,
    pub focus: Option<FocusStats>,
    pub comparisons: Vec<Comparison>,
}

/// Inputs of [`evaluate_metric_row`]
#[derive(Debug, Clone, Copy)]
pub struct MetricRowInput<'a> {
    /// Series as displayed, i.e. after aggregation
    pub series: &'a [TimePoint],
    pub selection: Option<DateTime<Utc>>,
    /// Aggregation the series went through, used to normalize the selection
    pub aggregation: Option<&'a AggregationConfig>,
    pub focus_period: Option<&'a FocusPeriod>,
    pub shadows: &'a [ShadowData],
    pub shadow_average: Option<&'a [AveragedShadowData]>,
    pub goals: &'a [Goal],
    pub forecast: Option<&'a ForecastResponse>,
}

impl<'a> MetricRowInput<'a> {
    /// Input with only the displayed series set
    pub fn new(series: &'a [TimePoint]) -> Self {
        Self {
            series,
            selection: None,
            aggregation: None,
            focus_period: None,
            shadows: &[],
            shadow_average: None,
            goals: &[],
            forecast: None,
        }
    }

    pub fn with_selection(mut self, selection: DateTime<Utc>) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_aggregation(mut self, aggregation: &'a AggregationConfig) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn with_focus_period(mut self, focus_period: &'a FocusPeriod) -> Self {
        self.focus_period = Some(focus_period);
        self
    }

    pub fn with_shadows(mut self, shadows: &'a [ShadowData]) -> Self {
        self.shadows = shadows;
        self
    }

    pub fn with_shadow_average(mut self, average: &'a [AveragedShadowData]) -> Self {
        self.shadow_average = Some(average);
        self
    }

    pub fn with_goals(mut self, goals: &'a [Goal]) -> Self {
        self.goals = goals;
        self
    }

    pub fn with_forecast(mut self, forecast: &'a ForecastResponse) -> Self {
        self.forecast = Some(forecast);
        self
    }
}

/// Percent change from `reference` to `current`, `None` for a zero or non-finite reference
pub fn percent_change(current: f64, reference: f64) -> Option<f64> {
    if reference == 0.0 || !reference.is_finite() {
        return None;
    }
    Some((current - reference) / reference.abs() * 100.0)
}

/// Evaluate one metric row.
///
/// The row is evaluated at the selection date, normalized through the
/// aggregation, or at the latest point when nothing is selected.
pub fn evaluate_metric_row(input: &MetricRowInput<'_>) -> Result<MetricRow> {
    let evaluated_at = match input.selection {
        Some(selected) => Some(normalize_selection_date(selected, input.aggregation)?),
        None => input.series.iter().map(|p| p.date).max(),
    }
    .map(normalize_to_midnight);

    let selection_value = evaluated_at.and_then(|day| value_on(input.series, day));
    let focus = input.focus_period.and_then(|focus| focus_stats(input.series, focus));

    let comparisons = match (evaluated_at, selection_value) {
        (Some(day), Some(current)) => references(input, day)?
            .into_iter()
            .map(|(kind, label, reference)| Comparison {
                kind,
                label,
                reference,
                absolute_delta: current - reference,
                percent_delta: percent_change(current, reference),
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(MetricRow {
        evaluated_at,
        selection_value,
        focus,
        comparisons,
    })
}

/// Finite ratio of the first point on the calendar day `day`
fn value_on(points: &[TimePoint], day: DateTime<Utc>) -> Option<f64> {
    points
        .iter()
        .filter(|p| normalize_to_midnight(p.date) == day)
        .find_map(TimePoint::finite_ratio)
}

fn focus_stats(points: &[TimePoint], focus: &FocusPeriod) -> Option<FocusStats> {
    let values: Vec<f64> = points
        .iter()
        .filter(|p| focus.contains(p.date))
        .filter_map(TimePoint::finite_ratio)
        .collect();

    if values.is_empty() {
        return None;
    }

    Some(FocusStats {
        mean: values.iter().mean(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        count: values.len(),
    })
}

/// Day a reference point is compared on.
///
/// Under group-by this is the bucket's representative date, so references
/// shifted off the bucket grid still meet the displayed point.
fn grid_day(date: DateTime<Utc>, aggregation: Option<&AggregationConfig>) -> Result<DateTime<Utc>> {
    Ok(normalize_to_midnight(normalize_selection_date(date, aggregation)?))
}

/// Pooled ratio of the shadow points landing on `day`
fn shadow_value_on(
    points: &[TimePoint],
    day: DateTime<Utc>,
    aggregation: Option<&AggregationConfig>,
) -> Result<Option<f64>> {
    let mut pooled: Option<TimePoint> = None;

    for point in points.iter().filter(|p| p.finite_ratio().is_some()) {
        if grid_day(point.date, aggregation)? != day {
            continue;
        }
        let total = pooled.get_or_insert(TimePoint::new(day, 0.0, 0.0));
        total.numerator += point.numerator;
        total.denominator += point.denominator;
    }

    Ok(pooled.and_then(|total| total.finite_ratio()))
}

fn references(
    input: &MetricRowInput<'_>,
    day: DateTime<Utc>,
) -> Result<Vec<(ComparisonKind, String, f64)>> {
    let mut found = Vec::new();

    for shadow in input.shadows {
        if let Some(value) = shadow_value_on(&shadow.data, day, input.aggregation)? {
            found.push((ComparisonKind::Shadow, shadow.shadow.label.clone(), value));
        }
    }

    if let Some(average) = input.shadow_average {
        let mut means = Vec::new();
        for entry in average {
            if grid_day(entry.date, input.aggregation)? == day {
                means.push(entry.mean);
            }
        }
        if !means.is_empty() {
            found.push((ComparisonKind::ShadowAverage, "Shadow average".to_string(), means.iter().mean()));
        }
    }

    for goal in input.goals {
        if let Some(value) = goal.value_at(day).filter(|v| v.is_finite()) {
            found.push((ComparisonKind::Goal, goal.label.clone(), value));
        }
    }

    if let Some(forecast) = input.forecast {
        if let Some(value) = forecast.value_at(day) {
            found.push((ComparisonKind::Forecast, forecast.model_used.clone(), value));
        }
    }

    Ok(found)
}
