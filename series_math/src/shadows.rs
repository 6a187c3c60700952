//! Shadows: historical echoes of a series shifted forward onto the current axis
//!
//! A shadow of "1 year" takes the value observed a year ago and plots it at
//! today's position. Each point keeps its numerator and denominator; only the
//! date moves. With day-of-week alignment every shifted date is nudged by at
//! most three days so it falls on the same weekday as the original point.

use crate::calendar::{add_days, apply_calendar_offset, normalize_to_midnight};
use crate::{Result, SeriesError, TimePoint};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

pub use crate::calendar::CalendarUnit as ShadowUnit;

/// A "N units ago" comparison template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub id: String,
    pub enabled: bool,
    pub periods: i32,
    pub unit: ShadowUnit,
    pub label: String,
    #[serde(default)]
    pub align_day_of_week: bool,
}

impl Shadow {
    /// Enabled shadow without day-of-week alignment
    pub fn new(id: &str, periods: i32, unit: ShadowUnit, label: &str) -> Self {
        Self {
            id: id.to_string(),
            enabled: true,
            periods,
            unit,
            label: label.to_string(),
            align_day_of_week: false,
        }
    }

    /// Same shadow with day-of-week alignment switched on or off
    pub fn aligned(mut self, align: bool) -> Self {
        self.align_day_of_week = align;
        self
    }
}

/// One shadow applied to one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowData {
    pub shadow: Shadow,
    pub data: Vec<TimePoint>,
    /// Grayscale hex color, e.g. `#404040`
    pub color: String,
}

/// Grayscale anchors for shadow lines.
///
/// The first enabled shadow is drawn with `dark`, the last with `light`, and
/// the ones in between are interpolated linearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowPalette {
    pub dark: u8,
    pub light: u8,
}

impl Default for ShadowPalette {
    fn default() -> Self {
        Self {
            dark: 0x40,
            light: 0xc0,
        }
    }
}

impl ShadowPalette {
    /// Color of shadow `index` among `count` enabled shadows
    pub fn color(&self, index: usize, count: usize) -> String {
        let fraction = if count <= 1 {
            0.0
        } else {
            index.min(count - 1) as f64 / (count - 1) as f64
        };
        let dark = f64::from(self.dark);
        let level = (dark + (f64::from(self.light) - dark) * fraction).round() as u8;
        format!("#{level:02x}{level:02x}{level:02x}")
    }
}

/// Shift every point of `data` forward by the shadow's offset.
///
/// Disabled shadows produce an empty series. Dates are normalized to
/// midnight UTC before shifting.
pub fn create_shadow_data(data: &[TimePoint], shadow: &Shadow) -> Result<Vec<TimePoint>> {
    if !shadow.enabled {
        return Ok(Vec::new());
    }

    data.iter()
        .map(|point| -> Result<TimePoint> {
            let original = normalize_to_midnight(point.date);
            let mut shifted = apply_calendar_offset(original, shadow.periods, shadow.unit)?;

            if shadow.align_day_of_week {
                shifted = align_weekday(shifted, original)?;
            }

            Ok(TimePoint::new(shifted, point.numerator, point.denominator))
        })
        .collect()
}

/// Apply every enabled shadow to `data`, colored with the default palette
pub fn generate_shadows_data(data: &[TimePoint], shadows: &[Shadow]) -> Result<Vec<ShadowData>> {
    generate_shadows_data_with_palette(data, shadows, &ShadowPalette::default())
}

/// Apply every enabled shadow to `data`, colored with `palette`
pub fn generate_shadows_data_with_palette(
    data: &[TimePoint],
    shadows: &[Shadow],
    palette: &ShadowPalette,
) -> Result<Vec<ShadowData>> {
    let enabled: Vec<&Shadow> = shadows.iter().filter(|s| s.enabled).collect();
    let count = enabled.len();

    enabled
        .into_iter()
        .enumerate()
        .map(|(index, shadow)| -> Result<ShadowData> {
            Ok(ShadowData {
                shadow: shadow.clone(),
                data: create_shadow_data(data, shadow)?,
                color: palette.color(index, count),
            })
        })
        .collect()
}

/// Signed day shift of smallest magnitude that moves `shifted` onto the
/// weekday of `original`. The result is always within -3..=3.
pub fn weekday_correction(shifted: DateTime<Utc>, original: DateTime<Utc>) -> i64 {
    let target = i64::from(original.weekday().num_days_from_monday());
    let current = i64::from(shifted.weekday().num_days_from_monday());
    let forward = (target - current).rem_euclid(7);

    if forward <= 3 {
        forward
    } else {
        forward - 7
    }
}

fn align_weekday(shifted: DateTime<Utc>, original: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let correction = weekday_correction(shifted, original);
    add_days(shifted, correction).ok_or_else(|| {
        SeriesError::DateOutOfRange(format!(
            "cannot align {} by {} day(s)",
            shifted.to_rfc3339(),
            correction
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn daily_series(start: DateTime<Utc>, days: i64) -> Vec<TimePoint> {
        (0..days)
            .map(|i| TimePoint::new(start + Duration::days(i) + Duration::hours(i % 24), i as f64, 10.0))
            .collect()
    }

    #[test]
    fn test_one_week_shadow() {
        let series = vec![
            TimePoint::new(utc(2024, 1, 1), 10.0, 100.0),
            TimePoint::new(utc(2024, 1, 8), 20.0, 100.0),
        ];
        let shadow = Shadow::new("w1", 1, ShadowUnit::Week, "Last week");

        assert_eq!(
            create_shadow_data(&series, &shadow).unwrap(),
            vec![
                TimePoint::new(utc(2024, 1, 8), 10.0, 100.0),
                TimePoint::new(utc(2024, 1, 15), 20.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_seven_day_shift_is_exact() {
        let series = daily_series(utc(2023, 12, 20), 60);
        let shadow = Shadow::new("d7", 7, ShadowUnit::Day, "7 days ago");

        let shifted = create_shadow_data(&series, &shadow).unwrap();
        assert_eq!(shifted.len(), series.len());
        for (out, input) in shifted.iter().zip(&series) {
            assert_eq!(out.date, normalize_to_midnight(input.date) + Duration::days(7));
            assert_eq!(out.numerator, input.numerator);
            assert_eq!(out.denominator, input.denominator);
        }
    }

    #[test]
    fn test_disabled_shadow_is_empty() {
        let series = daily_series(utc(2024, 1, 1), 5);
        let mut shadow = Shadow::new("y1", 1, ShadowUnit::Year, "Last year");
        shadow.enabled = false;

        assert!(create_shadow_data(&series, &shadow).unwrap().is_empty());
    }

    #[test]
    fn test_empty_series() {
        let shadow = Shadow::new("y1", 1, ShadowUnit::Year, "Last year").aligned(true);
        assert!(create_shadow_data(&[], &shadow).unwrap().is_empty());
    }

    #[rstest]
    #[case(1, ShadowUnit::Year)]
    #[case(2, ShadowUnit::Year)]
    #[case(1, ShadowUnit::Month)]
    #[case(1, ShadowUnit::Quarter)]
    #[case(10, ShadowUnit::Day)]
    fn test_alignment_matches_weekday_within_bound(#[case] periods: i32, #[case] unit: ShadowUnit) {
        // Spans a leap day so a fixed shift would drift across the series
        let series = daily_series(utc(2023, 12, 1), 500);
        let shadow = Shadow::new("s", periods, unit, "shadow").aligned(true);

        let aligned = create_shadow_data(&series, &shadow).unwrap();
        for (out, input) in aligned.iter().zip(&series) {
            let original = normalize_to_midnight(input.date);
            let unaligned = apply_calendar_offset(original, periods, unit).unwrap();

            assert_eq!(out.date.weekday(), original.weekday());
            assert!((out.date - unaligned).num_days().abs() <= 4);
        }
    }

    #[test]
    fn test_year_shadow_alignment_example() {
        // Monday 2024-01-01 + 1 year = Wednesday 2025-01-01, pulled back to Monday
        let series = vec![TimePoint::new(utc(2024, 1, 1), 1.0, 2.0)];
        let shadow = Shadow::new("y1", 1, ShadowUnit::Year, "Last year").aligned(true);

        let aligned = create_shadow_data(&series, &shadow).unwrap();
        assert_eq!(aligned[0].date, utc(2024, 12, 30));
    }

    #[rstest]
    #[case(utc(2024, 1, 3), utc(2024, 1, 1), -2)]
    #[case(utc(2024, 1, 5), utc(2024, 1, 1), 3)]
    #[case(utc(2024, 1, 4), utc(2024, 1, 1), -3)]
    #[case(utc(2024, 1, 1), utc(2024, 1, 8), 0)]
    fn test_weekday_correction(
        #[case] shifted: DateTime<Utc>,
        #[case] original: DateTime<Utc>,
        #[case] expected: i64,
    ) {
        assert_eq!(weekday_correction(shifted, original), expected);
    }

    #[test]
    fn test_generate_filters_and_colors() {
        let series = daily_series(utc(2024, 1, 1), 3);
        let mut disabled = Shadow::new("off", 2, ShadowUnit::Week, "Off");
        disabled.enabled = false;
        let shadows = vec![
            Shadow::new("w1", 1, ShadowUnit::Week, "1w"),
            disabled,
            Shadow::new("w2", 2, ShadowUnit::Week, "2w"),
            Shadow::new("w3", 3, ShadowUnit::Week, "3w"),
        ];

        let generated = generate_shadows_data(&series, &shadows).unwrap();
        let ids: Vec<&str> = generated.iter().map(|s| s.shadow.id.as_str()).collect();
        assert_eq!(ids, vec!["w1", "w2", "w3"]);

        let colors: Vec<&str> = generated.iter().map(|s| s.color.as_str()).collect();
        assert_eq!(colors, vec!["#404040", "#808080", "#c0c0c0"]);
        assert!(generated.iter().all(|s| s.data.len() == 3));
    }

    #[test]
    fn test_single_shadow_gets_darkest_color() {
        let series = daily_series(utc(2024, 1, 1), 2);
        let shadows = vec![Shadow::new("m1", 1, ShadowUnit::Month, "Last month")];

        let palette = ShadowPalette { dark: 0x10, light: 0xf0 };
        let generated = generate_shadows_data_with_palette(&series, &shadows, &palette).unwrap();
        assert_eq!(generated[0].color, "#101010");
    }

    #[test]
    fn test_shadow_json_defaults_alignment_off() {
        let json = r#"{"id":"y1","enabled":true,"periods":1,"unit":"year","label":"Last year"}"#;
        let shadow: Shadow = serde_json::from_str(json).unwrap();
        assert!(!shadow.align_day_of_week);

        let json = serde_json::to_string(&shadow.clone().aligned(true)).unwrap();
        assert!(json.contains("\"alignDayOfWeek\":true"));

        let bad = r#"{"id":"y1","enabled":true,"periods":1,"unit":"years","label":"x"}"#;
        assert!(serde_json::from_str::<Shadow>(bad).is_err());
    }
}
