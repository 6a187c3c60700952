//! Mapping a selected date onto the point the aggregated chart actually shows

use crate::aggregation::AggregationConfig;
use crate::buckets::bucket_key_and_representative_date;
use crate::Result;
use chrono::{DateTime, Utc};

/// Normalize a selected date for the given aggregation.
///
/// Under group-by aggregation the date becomes the representative date of its
/// bucket, which is the date of the aggregated point for that bucket. Without
/// aggregation, or with smoothing, the date is returned unchanged.
pub fn normalize_selection_date(
    date: DateTime<Utc>,
    config: Option<&AggregationConfig>,
) -> Result<DateTime<Utc>> {
    match config {
        Some(config) if config.is_group_by() => {
            let (_, representative) = bucket_key_and_representative_date(date, config.group_by_period)?;
            Ok(representative)
        }
        _ => Ok(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{apply_aggregation, GroupByPeriod, SmoothingUnit};
    use crate::TimePoint;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_identity_without_group_by() {
        let date = Utc.with_ymd_and_hms(2024, 5, 17, 15, 0, 0).unwrap();

        assert_eq!(normalize_selection_date(date, None).unwrap(), date);

        let smoothing = AggregationConfig::smoothing(7, SmoothingUnit::Days);
        assert_eq!(normalize_selection_date(date, Some(&smoothing)).unwrap(), date);

        let mut disabled = AggregationConfig::group_by(GroupByPeriod::Month);
        disabled.enabled = false;
        assert_eq!(normalize_selection_date(date, Some(&disabled)).unwrap(), date);
    }

    #[rstest]
    #[case(GroupByPeriod::Week)]
    #[case(GroupByPeriod::Month)]
    #[case(GroupByPeriod::Quarter)]
    #[case(GroupByPeriod::Year)]
    fn test_selection_lands_on_an_aggregated_point(#[case] period: GroupByPeriod) {
        let series: Vec<TimePoint> = (0..200)
            .map(|i| TimePoint::new(utc(2024, 1, 1) + Duration::days(i * 2), 1.0, 2.0))
            .collect();
        let config = AggregationConfig::group_by(period);
        let aggregated = apply_aggregation(&series, &config).unwrap();

        for point in &series {
            let selected = point.date + Duration::hours(13);
            let normalized = normalize_selection_date(selected, Some(&config)).unwrap();
            assert!(aggregated.iter().any(|p| p.date == normalized));
        }
    }

    #[test]
    fn test_month_selection() {
        let config = AggregationConfig::group_by(GroupByPeriod::Month);
        let normalized = normalize_selection_date(utc(2024, 2, 17), Some(&config)).unwrap();
        assert_eq!(normalized, utc(2024, 2, 1));
    }
}
