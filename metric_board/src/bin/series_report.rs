use metric_board::comparison::{evaluate_metric_row, MetricRow, MetricRowInput};
use metric_board::{BoardError, ChartConfig, ForecastRequest, Series, SeriesLoader};
use series_math::{
    apply_aggregation, calculate_shadow_average, generate_shadows_data, AveragedShadowData,
    ShadowData, TimePoint,
};
use std::env;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: series_report <data.csv> [chart.json]";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.len() > 2 {
        eprintln!("{}", USAGE);
        process::exit(1);
    }

    if let Err(e) = run(&args[0], args.get(1).map(String::as_str)) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(data_path: &str, config_path: Option<&str>) -> Result<(), BoardError> {
    let series = SeriesLoader::from_csv(data_path)?;
    let config = match config_path {
        Some(path) => ChartConfig::from_json_file(path)?,
        None => ChartConfig::default(),
    };
    info!(series = %series.name, points = series.len(), "loaded");

    let displayed = apply_aggregation(&series.points, &config.aggregation)?;
    let shadows = generate_shadows_data(&displayed, &config.shadows)?;
    let average = if config.average_shadows {
        Some(calculate_shadow_average(&shadows))
    } else {
        None
    };

    let mut input = MetricRowInput::new(&displayed)
        .with_aggregation(&config.aggregation)
        .with_shadows(&shadows)
        .with_goals(&config.goals);
    if let Some(focus) = &config.focus_period {
        input = input.with_focus_period(focus);
    }
    if let Some(average) = &average {
        // The band replaces the individual shadow lines
        input = input.with_shadows(&[]).with_shadow_average(average);
    }

    let row = evaluate_metric_row(&input)?;
    let forecast = ForecastRequest::for_chart(&displayed, config.forecast.as_ref())?;

    print_series(&series, &displayed);
    print_shadows(&shadows, average.as_deref());
    print_row(&row);
    if let Some(request) = &forecast {
        print_forecast_request(request);
    }

    Ok(())
}

fn print_series(series: &Series, displayed: &[TimePoint]) {
    println!("Series: {} ({} points, {} displayed)", series.name, series.len(), displayed.len());
    if let Some((first, last)) = series.date_range() {
        println!("  Range: {} .. {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"));
    }

    for point in displayed.iter().rev().take(5).rev() {
        println!("  {}  {}", point.date.format("%Y-%m-%d"), format_value(point.finite_ratio()));
    }
}

fn print_shadows(shadows: &[ShadowData], average: Option<&[AveragedShadowData]>) {
    if shadows.is_empty() {
        return;
    }

    println!("Shadows:");
    for shadow in shadows {
        println!(
            "  {:<20} {} points  {}",
            shadow.shadow.label,
            shadow.data.len(),
            shadow.color
        );
    }

    if let Some(latest) = average.and_then(|a| a.last()) {
        println!(
            "  Average on {}: {:.4} +/- {:.4}",
            latest.date.format("%Y-%m-%d"),
            latest.mean,
            latest.std_dev
        );
    }
}

fn print_row(row: &MetricRow) {
    println!("Metric row:");
    if let Some(day) = row.evaluated_at {
        println!("  At {}: {}", day.format("%Y-%m-%d"), format_value(row.selection_value));
    }

    if let Some(focus) = row.focus {
        println!(
            "  Focus: mean {:.4}, range {:.4} .. {:.4} over {} points",
            focus.mean, focus.min, focus.max, focus.count
        );
    }

    for comparison in &row.comparisons {
        let percent = comparison
            .percent_delta
            .map(|p| format!("{:+.1}%", p))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  vs {:<20} {:.4}  delta {:+.4} ({})",
            comparison.label, comparison.reference, comparison.absolute_delta, percent
        );
    }
}

fn print_forecast_request(request: &ForecastRequest) {
    let season = request
        .season_length
        .map(|s| s.to_string())
        .unwrap_or_else(|| "auto".to_string());
    println!(
        "Forecast request: {} model, {} points, horizon {}, season {}",
        request.model,
        request.data.len(),
        request.horizon,
        season
    );
}

fn format_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "-".to_string())
}
