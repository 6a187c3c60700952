//! # Series Math
//!
//! Pure transformations for ratio time series (numerator / denominator pairs).
//! Every function here takes its configuration as an argument and returns a
//! freshly allocated result; nothing is cached between calls.
//!
//! - [`calendar`]: calendar-aware date offsets
//! - [`buckets`]: calendar bucket keys shared by group-by aggregation and selection
//! - [`aggregation`]: trailing-window smoothing and calendar group-by
//! - [`shadows`]: forward-shifted historical echoes of a series
//! - [`selection`]: mapping a selected date onto its aggregation bucket
//! - [`averaging`]: mean and dispersion across several shadows
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use series_math::shadows::{create_shadow_data, Shadow, ShadowUnit};
//! use series_math::TimePoint;
//!
//! let series = vec![
//!     TimePoint::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 10.0, 100.0),
//!     TimePoint::new(Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap(), 20.0, 100.0),
//! ];
//! let shadow = Shadow::new("last-week", 1, ShadowUnit::Week, "Last week");
//!
//! let echoed = create_shadow_data(&series, &shadow).unwrap();
//! assert_eq!(echoed[0].date, Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap());
//! assert_eq!(echoed[1].numerator, 20.0);
//! ```

use thiserror::Error;

pub mod aggregation;
pub mod averaging;
pub mod buckets;
pub mod calendar;
mod model;
mod rolling;
pub mod selection;
pub mod shadows;

pub use aggregation::{apply_aggregation, AggregationConfig, AggregationMode, GroupByPeriod, SmoothingUnit};
pub use averaging::{calculate_shadow_average, AveragedShadowData};
pub use buckets::{bucket_key_and_representative_date, BucketKey};
pub use calendar::{apply_calendar_offset, normalize_to_midnight};
pub use model::TimePoint;
pub use selection::normalize_selection_date;
pub use shadows::{create_shadow_data, generate_shadows_data, Shadow, ShadowData, ShadowPalette, ShadowUnit};

/// Errors that can occur while transforming a series
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),
}

/// Result type for series transformations
pub type Result<T> = std::result::Result<T, SeriesError>;
