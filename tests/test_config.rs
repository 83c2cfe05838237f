//! Integration tests for loading parser configuration from disk.

use std::io::Write;

use tempfile::NamedTempFile;
use volley_report::config::{ReportConfig, DEFAULT_FIXED_COLUMNS};
use volley_report::report::{Locale, MatchReportParser};
use volley_report::Error;

fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = config_file(
        r#"{
            "line_tolerance": 3.0,
            "set_count": 5,
            "number_search_window": 2,
            "fixed_columns": ["Vote", "Pts"],
            "locales": ["english", "portuguese"],
            "placeholder": "-"
        }"#,
    );

    let config = ReportConfig::from_json_file(file.path()).unwrap();

    assert_eq!(config.line_tolerance, 3.0);
    assert_eq!(config.effective_set_count(), 5);
    assert_eq!(config.number_search_window, 2);
    assert_eq!(config.fixed_columns, vec!["Vote", "Pts"]);
    assert_eq!(config.locales, vec![Locale::English, Locale::Portuguese]);
    assert_eq!(config.placeholder, "-");
    // Untouched fields keep their defaults
    assert_eq!(config.overlap_tolerance, 14.0);
}

#[test]
fn test_empty_object_is_default() {
    let file = config_file("{}");
    let config = ReportConfig::from_json_file(file.path()).unwrap();

    assert_eq!(config, ReportConfig::default());
    assert_eq!(config.fixed_columns.len(), DEFAULT_FIXED_COLUMNS.len());
}

#[test]
fn test_invalid_values_are_rejected() {
    let file = config_file(r#"{"line_tolerance": -1.0}"#);
    let err = ReportConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));

    let file = config_file(r#"{"locales": []}"#);
    assert!(matches!(
        ReportConfig::from_json_file(file.path()),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn test_malformed_json_is_a_json_error() {
    let file = config_file(r#"{"set_count": "four"}"#);
    assert!(matches!(ReportConfig::from_json_file(file.path()), Err(Error::Json(_))));

    let file = config_file(r#"{"locales": ["klingon"]}"#);
    assert!(matches!(ReportConfig::from_json_file(file.path()), Err(Error::Json(_))));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    assert!(matches!(ReportConfig::from_json_file(path), Err(Error::Io(_))));
}

#[test]
fn test_portuguese_config_drives_segmentation() {
    let file = config_file(r#"{"locales": ["portuguese"], "set_count": 3}"#);
    let parser = MatchReportParser::new(ReportConfig::from_json_file(file.path()).unwrap()).unwrap();

    assert!(parser.keywords().players_total.iter().any(|k| k == "total jogadores"));
    assert!(!parser.keywords().players_total.iter().any(|k| k == "players total"));
}

#[test]
fn test_parser_rejects_invalid_builder_config() {
    let result = MatchReportParser::new(ReportConfig::new().with_line_tolerance(f32::NAN));
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}
