//! Ratio series and CSV loading

use crate::error::{BoardError, Result};
use crate::utils::date_parser;
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use series_math::TimePoint;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// A named ratio series.
///
/// `name` and `labels` are display metadata; the transformations only look at
/// `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub points: Vec<TimePoint>,
}

impl Series {
    /// Create a new series without labels
    pub fn new(name: &str, points: Vec<TimePoint>) -> Self {
        Self {
            name: name.to_string(),
            labels: Vec::new(),
            points,
        }
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Copy of the series in chronological order
    pub fn sorted(&self) -> Self {
        let mut points = self.points.clone();
        points.sort_by_key(|p| p.date);
        Self {
            name: self.name.clone(),
            labels: self.labels.clone(),
            points,
        }
    }

    /// Earliest and latest date, if any
    pub fn date_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.points.iter().map(|p| p.date).min()?;
        let last = self.points.iter().map(|p| p.date).max()?;
        Some((first, last))
    }

    /// Latest point by date
    pub fn latest(&self) -> Option<&TimePoint> {
        self.points.iter().max_by_key(|p| p.date)
    }
}

/// Column positions found in a CSV header
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    numerator: usize,
    denominator: Option<usize>,
}

/// Loader for uploaded `date,numerator,denominator` files
#[derive(Debug)]
pub struct SeriesLoader;

impl SeriesLoader {
    /// Load a series from a CSV file, named after the file stem
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Series> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("series")
            .to_string();
        let file = File::open(path)?;

        Self::from_reader(&name, file)
    }

    /// Load a series from any CSV source
    pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Series> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns = Self::detect_columns(reader.headers()?)?;

        let mut points = Vec::new();
        let mut skipped = 0usize;

        for (i, record) in reader.records().enumerate() {
            let record = record?;
            // Header is line 1
            let line = i + 2;

            let numerator = field(&record, Some(columns.numerator));
            if numerator.is_empty() {
                skipped += 1;
                continue;
            }

            let date = date_parser::parse_date(field(&record, Some(columns.date))).map_err(|e| {
                BoardError::DataError(format!("Invalid date at line {}: {}", line, e))
            })?;

            let numerator = numerator.parse::<f64>().map_err(|e| {
                BoardError::DataError(format!("Invalid numerator at line {}: {}", line, e))
            })?;

            let denominator = match field(&record, columns.denominator) {
                "" => 1.0,
                raw => raw.parse::<f64>().map_err(|e| {
                    BoardError::DataError(format!("Invalid denominator at line {}: {}", line, e))
                })?,
            };

            points.push(TimePoint::new(date, numerator, denominator));
        }

        if skipped > 0 {
            warn!(series = name, skipped, "skipped rows without a numerator");
        }
        debug!(series = name, rows = points.len(), "loaded series");

        Ok(Series::new(name, points))
    }

    /// Detect the date, numerator and denominator columns in a header row
    fn detect_columns(headers: &StringRecord) -> Result<Columns> {
        let names: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();

        let find = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|candidate| names.iter().position(|name| name == candidate))
        };

        let date = find(&["date", "day", "timestamp", "time"])
            .or_else(|| names.iter().position(|n| n.contains("date")))
            .ok_or_else(|| BoardError::DataError("No date column found in data".to_string()))?;

        let numerator = find(&["numerator", "num", "value"]).ok_or_else(|| {
            BoardError::DataError("No numerator column found in data".to_string())
        })?;

        let denominator = find(&["denominator", "den"]);

        Ok(Columns {
            date,
            numerator,
            denominator,
        })
    }
}

fn field(record: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| record.get(i)).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_column_order_is_free() {
        let csv = "Denominator,Numerator,Date\n100,10,2024-01-01\n";
        let series = SeriesLoader::from_reader("visits", csv.as_bytes()).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.points[0].numerator, 10.0);
        assert_eq!(series.points[0].denominator, 100.0);
        assert_eq!(
            series.points[0].date,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_denominator_reads_as_one() {
        let csv = "date,value\n2024-01-01,21.5\n2024-01-02,\n2024-01-03,19\n";
        let series = SeriesLoader::from_reader("tmax", csv.as_bytes()).unwrap();

        assert_eq!(series.len(), 2);
        assert!(series.points.iter().all(|p| p.denominator == 1.0));
    }

    #[test]
    fn test_latest_and_range() {
        let csv = "date,numerator,denominator\n2024-01-05,1,2\n2024-01-01,1,2\n2024-01-03,1,2\n";
        let series = SeriesLoader::from_reader("s", csv.as_bytes()).unwrap();

        let (first, last) = series.date_range().unwrap();
        assert_eq!(first, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(last, Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap());
        assert_eq!(series.latest().unwrap().date, last);
        assert_eq!(series.sorted().points[1].date.format("%d").to_string(), "03");
    }

    #[test]
    fn test_labels_are_optional_metadata() {
        let json = r#"{"name":"signups","labels":["web","eu"],"points":[]}"#;
        let series: Series = serde_json::from_str(json).unwrap();
        assert_eq!(series.labels, vec!["web", "eu"]);

        let series: Series = serde_json::from_str(r#"{"name":"signups","points":[]}"#).unwrap();
        assert!(series.labels.is_empty());
    }
}
