//! Running numerator/denominator sums over a date-bounded window

use crate::TimePoint;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Trailing window holding the points that contribute to a smoothed value.
///
/// Only points with a finite ratio are admitted; everything else contributes
/// nothing to either sum.
#[derive(Debug, Clone, Default)]
pub(crate) struct RatioWindow {
    points: VecDeque<TimePoint>,
    numerator_sum: f64,
    denominator_sum: f64,
}

impl RatioWindow {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a point at the leading edge. Points must arrive in date order.
    pub(crate) fn push(&mut self, point: TimePoint) {
        let finite_parts = point.numerator.is_finite() && point.denominator.is_finite();
        if !finite_parts || point.finite_ratio().is_none() {
            return;
        }

        self.numerator_sum += point.numerator;
        self.denominator_sum += point.denominator;
        self.points.push_back(point);
    }

    /// Drop every point dated at or before `boundary`
    pub(crate) fn evict_through(&mut self, boundary: DateTime<Utc>) {
        while let Some(oldest) = self.points.front() {
            if oldest.date > boundary {
                break;
            }
            if let Some(old) = self.points.pop_front() {
                self.numerator_sum -= old.numerator;
                self.denominator_sum -= old.denominator;
            }
        }

        if self.points.is_empty() {
            self.reset();
        }
    }

    /// Mean numerator and mean denominator of the contributing points.
    ///
    /// An empty window yields `(0.0, 0.0)`, whose ratio is not finite.
    pub(crate) fn means(&self) -> (f64, f64) {
        if self.points.is_empty() {
            return (0.0, 0.0);
        }

        let count = self.points.len() as f64;
        (self.numerator_sum / count, self.denominator_sum / count)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }

    fn reset(&mut self) {
        self.points.clear();
        self.numerator_sum = 0.0;
        self.denominator_sum = 0.0;
    }
}
