//! Walk through the transformations on a synthetic weekly-seasonal series.
//!
//! Run with `cargo run --example shadow_walkthrough`.

use bialy_workspace::metric_board::comparison::{evaluate_metric_row, MetricRowInput};
use bialy_workspace::metric_board::Goal;
use bialy_workspace::series_math::{
    apply_aggregation, calculate_shadow_average, generate_shadows_data, AggregationConfig,
    GroupByPeriod, Shadow, ShadowUnit, SmoothingUnit, TimePoint,
};
use chrono::{Datelike, Duration, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    let series: Vec<TimePoint> = (0..540)
        .map(|i| {
            let date = start + Duration::days(i);
            // Weekends convert worse, and the trend drifts upward
            let weekend = date.weekday().num_days_from_monday() >= 5;
            let base = if weekend { 30.0 } else { 50.0 };
            let conversions = base + i as f64 * 0.05;
            TimePoint::new(date, conversions, 1000.0)
        })
        .collect();

    println!("=== Weekly grouping ===");
    let weekly = apply_aggregation(&series, &AggregationConfig::group_by(GroupByPeriod::Week))?;
    for point in weekly.iter().rev().take(4).rev() {
        println!("{}  {:.4}", point.date.format("%Y-%m-%d"), point.ratio());
    }

    println!("\n=== 4-week smoothing ===");
    let smoothed = apply_aggregation(&series, &AggregationConfig::smoothing(4, SmoothingUnit::Weeks))?;
    let latest = smoothed.last().ok_or("empty series")?;
    println!("{}  {:.4}", latest.date.format("%Y-%m-%d"), latest.ratio());

    println!("\n=== Year-over-year shadows ===");
    let shadows = vec![
        Shadow::new("y1", 1, ShadowUnit::Year, "Last year"),
        Shadow::new("y1-aligned", 1, ShadowUnit::Year, "Last year (weekday aligned)").aligned(true),
    ];
    let shadow_data = generate_shadows_data(&series, &shadows)?;
    let goals = vec![Goal::constant("target", "Target", 0.07)];

    let input = MetricRowInput::new(&series)
        .with_shadows(&shadow_data)
        .with_goals(&goals);
    let row = evaluate_metric_row(&input)?;
    println!("Value: {:?}", row.selection_value);
    for comparison in &row.comparisons {
        println!(
            "  vs {:<30} {:.4} ({:+.1}%)",
            comparison.label,
            comparison.reference,
            comparison.percent_delta.unwrap_or(f64::NAN)
        );
    }

    println!("\n=== Shadow band ===");
    let band = calculate_shadow_average(&shadow_data);
    if let Some(last) = band.last() {
        println!(
            "{}  {:.4} +/- {:.4}",
            last.date.format("%Y-%m-%d"),
            last.mean,
            last.std_dev
        );
    }

    Ok(())
}
