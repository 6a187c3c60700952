use chrono::{TimeZone, Utc};
use metric_board::data::SeriesLoader;
use metric_board::BoardError;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_series_loader_from_csv() {
    // Create a temporary CSV file
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,numerator,denominator").unwrap();
    writeln!(file, "2024-01-01,10,100").unwrap();
    writeln!(file, "2024-01-02,12,110").unwrap();
    writeln!(file, "2024-01-03,9,0").unwrap();

    let series = SeriesLoader::from_csv(file.path()).unwrap();

    assert_eq!(series.len(), 3);
    assert!(!series.is_empty());
    assert_eq!(series.points[1].numerator, 12.0);
    assert_eq!(series.points[1].denominator, 110.0);
    // A zero denominator is kept; it reads as "no value" downstream
    assert_eq!(series.points[2].finite_ratio(), None);
}

#[test]
fn test_series_name_comes_from_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signups.csv");
    std::fs::write(&path, "date,numerator,denominator\n2024-02-01,1,3\n").unwrap();

    let series = SeriesLoader::from_csv(&path).unwrap();
    assert_eq!(series.name, "signups");
}

#[test]
fn test_header_only_file_is_empty_series() {
    let series = SeriesLoader::from_reader("new", "date,numerator,denominator\n".as_bytes()).unwrap();
    assert!(series.is_empty());
    assert_eq!(series.date_range(), None);
}

#[test]
fn test_mixed_date_formats() {
    let csv = "date,numerator,denominator\n01/15/2023,1,2\n20230116,1,2\n2023-01-17T08:30:00,1,2\n";
    let series = SeriesLoader::from_reader("mixed", csv.as_bytes()).unwrap();

    assert_eq!(series.points[0].date, Utc.with_ymd_and_hms(2023, 1, 15, 0, 0, 0).unwrap());
    assert_eq!(series.points[1].date, Utc.with_ymd_and_hms(2023, 1, 16, 0, 0, 0).unwrap());
    assert_eq!(series.points[2].date, Utc.with_ymd_and_hms(2023, 1, 17, 8, 30, 0).unwrap());
}

#[test]
fn test_series_loader_error_handling() {
    // Test with non-existent file
    let result = SeriesLoader::from_csv("nonexistent_file.csv");
    assert!(matches!(result, Err(BoardError::IoError(_))));

    // Missing numerator column
    let result = SeriesLoader::from_reader("bad", "date,clicks\n2024-01-01,3\n".as_bytes());
    assert!(matches!(result, Err(BoardError::DataError(_))));

    // Non-numeric numerator names the line
    let csv = "date,numerator,denominator\n2024-01-01,1,2\n2024-01-02,lots,2\n";
    match SeriesLoader::from_reader("bad", csv.as_bytes()) {
        Err(BoardError::DataError(msg)) => assert!(msg.contains("line 3")),
        other => panic!("Expected DataError, got {:?}", other),
    }

    // Unparseable date
    let csv = "date,numerator,denominator\nyesterday,1,2\n";
    assert!(SeriesLoader::from_reader("bad", csv.as_bytes()).is_err());
}
