//! Utility functions for the metric_board crate

use chrono::{DateTime, Utc};

/// Format a date the way the forecasting service and CSV uploads expect (`YYYY-MM-DD`)
pub fn format_iso_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Date parsing for uploaded data and persisted configuration
pub mod date_parser {
    use crate::error::{BoardError, Result};
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    /// Parse a date or timestamp into UTC.
    ///
    /// Accepted: `2023-01-15`, `01/15/2023`, `20230115`, `2023-01-15T14:30:45`,
    /// `2023-01-15 14:30:45` and RFC 3339 with any offset. Values without an
    /// offset are read as UTC.
    pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
        let trimmed = input.trim();

        if let Ok(date) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(date.with_timezone(&Utc));
        }

        for format in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Utc.from_utc_datetime(&naive));
            }
        }

        for format in DATE_FORMATS {
            if let Ok(day) = NaiveDate::parse_from_str(trimmed, format) {
                return Ok(Utc.from_utc_datetime(&day.and_time(NaiveTime::default())));
            }
        }

        Err(BoardError::DataError(format!(
            "Unrecognized date '{}'",
            trimmed
        )))
    }
}
