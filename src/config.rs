//! Configuration for match-report parsing.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::report::keywords::{KeywordTable, Locale};

/// Smallest number of set columns a report can carry.
pub const MIN_SET_COUNT: usize = 1;
/// Largest number of set columns a report can carry.
pub const MAX_SET_COUNT: usize = 5;

/// Post-set statistical columns of the standard report layout, in print order.
pub const DEFAULT_FIXED_COLUMNS: [&str; 17] = [
    "Vote",
    "Points Tot",
    "Brake Points",
    "Points Won-Lost",
    "Serves Tot",
    "Serves Err",
    "Serves Pts",
    "Receptions Tot",
    "Receptions Err",
    "Receptions Pos%",
    "Receptions Exc%",
    "Attacks Tot",
    "Attacks Err",
    "Attacks Blocked",
    "Attacks Pts",
    "Attacks Pts%",
    "BK Pts",
];

/// Match-report parsing configuration.
///
/// Every field has a default, so a JSON file only needs to list the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Maximum vertical distance between tokens of the same line.
    pub line_tolerance: f32,

    /// Number of set columns assumed when the header row does not say otherwise.
    pub set_count: usize,

    /// How many leading tokens of a line are searched for the jersey number.
    pub number_search_window: usize,

    /// Labels of the columns printed after the set columns.
    pub fixed_columns: Vec<String>,

    /// Locales whose keywords are recognised.
    pub locales: Vec<Locale>,

    /// Height difference tolerated between a token and an anchor before it is penalised.
    pub height_tolerance: f32,

    /// Horizontal slack allowed when testing token/anchor overlap.
    pub overlap_tolerance: f32,

    /// Score added when a token does not overlap an anchor.
    pub overlap_penalty: f32,

    /// Value written into cells that received no token.
    pub placeholder: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            line_tolerance: 2.5,
            set_count: 4,
            number_search_window: 3,
            fixed_columns: DEFAULT_FIXED_COLUMNS.iter().map(|s| s.to_string()).collect(),
            locales: vec![Locale::English],
            height_tolerance: 5.0,
            overlap_tolerance: 14.0,
            overlap_penalty: 25.0,
            placeholder: ".".to_string(),
        }
    }

    /// Load a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Set the default number of set columns.
    pub fn with_set_count(mut self, set_count: usize) -> Self {
        self.set_count = set_count;
        self
    }

    /// Set the vertical line-clustering tolerance.
    pub fn with_line_tolerance(mut self, tolerance: f32) -> Self {
        self.line_tolerance = tolerance;
        self
    }

    /// Set the recognised keyword locales.
    pub fn with_locales(mut self, locales: Vec<Locale>) -> Self {
        self.locales = locales;
        self
    }

    /// Replace the post-set column labels.
    pub fn with_fixed_columns<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixed_columns = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set how many leading tokens are searched for a jersey number.
    pub fn with_number_search_window(mut self, window: usize) -> Self {
        self.number_search_window = window;
        self
    }

    /// The configured set count clamped to the supported range.
    pub fn effective_set_count(&self) -> usize {
        self.set_count.clamp(MIN_SET_COUNT, MAX_SET_COUNT)
    }

    /// Keyword table built from the union of the configured locales.
    pub fn keywords(&self) -> KeywordTable {
        KeywordTable::for_locales(&self.locales)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.line_tolerance.is_nan() || self.line_tolerance <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "line_tolerance must be positive, got {}",
                self.line_tolerance
            )));
        }
        if self.height_tolerance < 0.0 || self.overlap_tolerance < 0.0 || self.overlap_penalty < 0.0
        {
            return Err(Error::InvalidConfig(
                "anchor tolerances and penalty must not be negative".to_string(),
            ));
        }
        if self.number_search_window == 0 {
            return Err(Error::InvalidConfig(
                "number_search_window must be at least 1".to_string(),
            ));
        }
        if self.fixed_columns.is_empty() {
            return Err(Error::InvalidConfig("fixed_columns must not be empty".to_string()));
        }
        if self.locales.is_empty() {
            return Err(Error::InvalidConfig("at least one locale is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.line_tolerance, 2.5);
        assert_eq!(config.set_count, 4);
        assert_eq!(config.number_search_window, 3);
        assert_eq!(config.fixed_columns.len(), DEFAULT_FIXED_COLUMNS.len());
        assert_eq!(config.fixed_columns[0], "Vote");
        assert_eq!(config.fixed_columns.last().map(String::as_str), Some("BK Pts"));
        assert_eq!(config.placeholder, ".");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_set_count_is_clamped() {
        assert_eq!(ReportConfig::new().with_set_count(0).effective_set_count(), 1);
        assert_eq!(ReportConfig::new().with_set_count(9).effective_set_count(), 5);
        assert_eq!(ReportConfig::new().with_set_count(3).effective_set_count(), 3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ReportConfig::from_json_str(r#"{"set_count": 3, "locales": ["portuguese"]}"#)
            .unwrap();
        assert_eq!(config.set_count, 3);
        assert_eq!(config.locales, vec![Locale::Portuguese]);
        assert_eq!(config.line_tolerance, 2.5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ReportConfig::new().with_line_tolerance(0.0).validate().is_err());
        assert!(ReportConfig::new().with_number_search_window(0).validate().is_err());
        assert!(ReportConfig::new()
            .with_fixed_columns(Vec::<String>::new())
            .validate()
            .is_err());
        assert!(ReportConfig::new().with_locales(vec![]).validate().is_err());
    }
}
