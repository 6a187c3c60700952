//! # Metric Board
//!
//! Dashboard-side plumbing around the `series_math` transformations.
//!
//! ## Features
//!
//! - Loading uploaded `date,numerator,denominator` CSV files into a [`Series`]
//! - Persisted per-chart configuration ([`ChartConfig`]) as JSON
//! - Goals drawn as constant or linear target lines
//! - The request/response contracts of the external forecasting service,
//!   for forecasts and for anomaly detection
//! - Metric-row evaluation: selection value, focus-period statistics and deltas
//!   against shadows, goals and forecasts
//!
//! ## Quick Start
//!
//! ```no_run
//! use metric_board::comparison::{evaluate_metric_row, MetricRowInput};
//! use metric_board::{ChartConfig, SeriesLoader};
//! use series_math::{apply_aggregation, generate_shadows_data};
//!
//! # fn main() -> metric_board::Result<()> {
//! let series = SeriesLoader::from_csv("conversions.csv")?;
//! let config = ChartConfig::from_json_file("chart.json")?;
//!
//! let displayed = apply_aggregation(&series.points, &config.aggregation)?;
//! let shadows = generate_shadows_data(&displayed, &config.shadows)?;
//!
//! let input = MetricRowInput::new(&displayed)
//!     .with_aggregation(&config.aggregation)
//!     .with_shadows(&shadows)
//!     .with_goals(&config.goals);
//! let row = evaluate_metric_row(&input)?;
//! println!("{:?}", row.selection_value);
//! # Ok(())
//! # }
//! ```

pub mod anomaly;
pub mod comparison;
pub mod config;
pub mod data;
pub mod error;
pub mod forecast;
pub mod goals;
pub mod utils;

// Re-export commonly used types
pub use crate::anomaly::{AnomalyRequest, AnomalyResponse, Sensitivity};
pub use crate::comparison::{evaluate_metric_row, MetricRow, MetricRowInput};
pub use crate::config::{Annotation, ChartConfig, FocusPeriod, ForecastSettings};
pub use crate::data::{Series, SeriesLoader};
pub use crate::error::{BoardError, Result};
pub use crate::forecast::{ForecastModelKind, ForecastRequest, ForecastResponse};
pub use crate::goals::{Goal, GoalTarget};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
