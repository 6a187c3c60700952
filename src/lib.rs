//! # Bialy
//!
//! Workspace facade re-exporting the dashboard crates:
//!
//! - [`series_math`]: aggregation, shadows, selection and averaging of ratio series
//! - [`metric_board`]: CSV loading, chart configuration, forecast contract and
//!   metric-row comparisons
//!
//! ## Example
//!
//! ```
//! use bialy_workspace::series_math::{apply_aggregation, AggregationConfig, GroupByPeriod, TimePoint};
//! use chrono::{TimeZone, Utc};
//!
//! let series = vec![
//!     TimePoint::new(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(), 10.0, 100.0),
//!     TimePoint::new(Utc.with_ymd_and_hms(2024, 1, 24, 0, 0, 0).unwrap(), 20.0, 100.0),
//!     TimePoint::new(Utc.with_ymd_and_hms(2024, 2, 7, 0, 0, 0).unwrap(), 5.0, 50.0),
//! ];
//!
//! let monthly = apply_aggregation(&series, &AggregationConfig::group_by(GroupByPeriod::Month)).unwrap();
//! assert_eq!(monthly.len(), 2);
//! assert_eq!(monthly[0].numerator, 30.0);
//! ```

pub use metric_board;
pub use series_math;
