//! Mean and dispersion across several shadows
//!
//! Instead of drawing N overlapping shadow lines, a chart can draw one mean
//! line with a band of one population standard deviation on each side.

use crate::calendar::normalize_to_midnight;
use crate::shadows::ShadowData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Summary of all shadow values observed on one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AveragedShadowData {
    pub date: DateTime<Utc>,
    pub mean: f64,
    /// Population standard deviation (divides by N)
    pub std_dev: f64,
}

/// Average the shadows date by date.
///
/// Only finite ratios are used. Dates without any finite ratio are left out,
/// and the result is sorted by date.
pub fn calculate_shadow_average(shadows_data: &[ShadowData]) -> Vec<AveragedShadowData> {
    let mut by_date: BTreeMap<DateTime<Utc>, Vec<f64>> = BTreeMap::new();

    for point in shadows_data.iter().flat_map(|s| s.data.iter()) {
        if let Some(ratio) = point.finite_ratio() {
            by_date
                .entry(normalize_to_midnight(point.date))
                .or_default()
                .push(ratio);
        }
    }

    by_date
        .into_iter()
        .map(|(date, values)| {
            let std_dev = if values.len() == 1 {
                0.0
            } else {
                values.iter().population_std_dev()
            };

            AveragedShadowData {
                date,
                mean: values.iter().mean(),
                std_dev,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shadows::{Shadow, ShadowUnit};
    use crate::TimePoint;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn shadow_data(id: &str, data: Vec<TimePoint>) -> ShadowData {
        ShadowData {
            shadow: Shadow::new(id, 1, ShadowUnit::Week, id),
            data,
            color: "#404040".to_string(),
        }
    }

    #[test]
    fn test_mean_and_population_std_dev() {
        let shadows = vec![
            shadow_data("a", vec![TimePoint::new(utc(2024, 1, 1), 2.0, 10.0)]),
            shadow_data("b", vec![TimePoint::new(utc(2024, 1, 1), 4.0, 10.0)]),
            shadow_data("c", vec![TimePoint::new(utc(2024, 1, 1), 9.0, 10.0)]),
        ];

        let averaged = calculate_shadow_average(&shadows);
        assert_eq!(averaged.len(), 1);
        assert_relative_eq!(averaged[0].mean, 0.5, epsilon = 1e-12);
        // Values 0.2, 0.4, 0.9: population variance = 0.0866..
        let expected = ((0.09 + 0.01 + 0.16) / 3.0_f64).sqrt();
        assert_relative_eq!(averaged[0].std_dev, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_single_value_has_zero_std_dev() {
        let shadows = vec![
            shadow_data("a", vec![TimePoint::new(utc(2024, 1, 1), 3.0, 4.0)]),
            shadow_data("b", vec![TimePoint::new(utc(2024, 1, 1), 3.0, 0.0)]),
        ];

        let averaged = calculate_shadow_average(&shadows);
        assert_eq!(averaged.len(), 1);
        assert_relative_eq!(averaged[0].mean, 0.75);
        assert_eq!(averaged[0].std_dev, 0.0);
    }

    #[test]
    fn test_dates_without_finite_values_are_omitted() {
        let shadows = vec![
            shadow_data(
                "a",
                vec![
                    TimePoint::new(utc(2024, 1, 2), 1.0, 0.0),
                    TimePoint::new(utc(2024, 1, 3), 1.0, 2.0),
                ],
            ),
            shadow_data("b", vec![TimePoint::new(utc(2024, 1, 2), 0.0, 0.0)]),
        ];

        let averaged = calculate_shadow_average(&shadows);
        let dates: Vec<_> = averaged.iter().map(|a| a.date).collect();
        assert_eq!(dates, vec![utc(2024, 1, 3)]);
    }

    #[test]
    fn test_grouping_uses_midnight_and_sorts() {
        let shadows = vec![
            shadow_data(
                "a",
                vec![
                    TimePoint::new(utc(2024, 1, 9), 1.0, 1.0),
                    TimePoint::new(Utc.with_ymd_and_hms(2024, 1, 5, 18, 0, 0).unwrap(), 1.0, 4.0),
                ],
            ),
            shadow_data("b", vec![TimePoint::new(utc(2024, 1, 5), 3.0, 4.0)]),
        ];

        let averaged = calculate_shadow_average(&shadows);
        assert_eq!(averaged.len(), 2);
        assert_eq!(averaged[0].date, utc(2024, 1, 5));
        assert_relative_eq!(averaged[0].mean, 0.5);
        assert_relative_eq!(averaged[0].std_dev, 0.25);
        assert_eq!(averaged[1].date, utc(2024, 1, 9));
    }

    #[test]
    fn test_empty_input() {
        assert!(calculate_shadow_average(&[]).is_empty());
    }
}
