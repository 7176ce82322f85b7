//! Rollup configuration
//!
//! Loaded from TOML, YAML or JSON, picked by file extension. Every field
//! has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! exclude_not_started = false
//! fiscal_year_start_month = 7
//! top_indicator_limit = 10
//! on_target_threshold = 100.0
//! trend_window_days = 90
//! trend_min_points = 3
//! ```

use pmis_model::DEFAULT_FISCAL_START_MONTH;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Failure to load or validate a [`RollupConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed YAML
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed JSON
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Extension not one of toml, yaml, yml, json
    #[error("unsupported configuration format '{0}'")]
    UnsupportedFormat(String),

    /// Value out of range
    #[error("invalid configuration value: {0}")]
    Invalid(String),
}

/// Tunables for summaries and dashboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RollupConfig {
    /// Leave not-started indicators out of the poor band
    pub exclude_not_started: bool,
    /// Calendar month (1-12) a fiscal year starts in
    pub fiscal_year_start_month: u32,
    /// Length of the top indicator list
    pub top_indicator_limit: usize,
    /// Achievement at or above which an indicator counts as on target
    pub on_target_threshold: f64,
    /// Days of score history a trend looks back over
    pub trend_window_days: u32,
    /// Fewest scores in the window for a trend to be reported
    pub trend_min_points: usize,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            exclude_not_started: false,
            fiscal_year_start_month: DEFAULT_FISCAL_START_MONTH,
            top_indicator_limit: 10,
            on_target_threshold: 100.0,
            trend_window_days: 90,
            trend_min_points: 3,
        }
    }
}

impl RollupConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With not-started indicators excluded from the distribution
    #[inline]
    #[must_use]
    pub fn with_exclude_not_started(mut self, exclude: bool) -> Self {
        self.exclude_not_started = exclude;
        self
    }

    /// With a fiscal year start month
    #[inline]
    #[must_use]
    pub fn with_fiscal_year_start_month(mut self, month: u32) -> Self {
        self.fiscal_year_start_month = month;
        self
    }

    /// With a top indicator limit
    #[inline]
    #[must_use]
    pub fn with_top_indicator_limit(mut self, limit: usize) -> Self {
        self.top_indicator_limit = limit;
        self
    }

    /// With a trend look-back window and minimum number of scores
    #[inline]
    #[must_use]
    pub fn with_trend_window(mut self, days: u32, min_points: usize) -> Self {
        self.trend_window_days = days;
        self.trend_min_points = min_points;
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a start month outside 1..=12, a
    /// threshold outside 0..=100 or an empty trend window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=12).contains(&self.fiscal_year_start_month) {
            return Err(ConfigError::Invalid(format!(
                "fiscal_year_start_month must be 1-12, got {}",
                self.fiscal_year_start_month
            )));
        }
        if !(0.0..=100.0).contains(&self.on_target_threshold) {
            return Err(ConfigError::Invalid(format!(
                "on_target_threshold must be 0-100, got {}",
                self.on_target_threshold
            )));
        }
        if self.trend_window_days == 0 {
            return Err(ConfigError::Invalid("trend_window_days must be positive".into()));
        }
        Ok(())
    }

    /// Parse TOML text
    ///
    /// # Errors
    ///
    /// Returns an error for malformed or out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML text
    ///
    /// # Errors
    ///
    /// Returns an error for malformed or out-of-range values.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON text
    ///
    /// # Errors
    ///
    /// Returns an error for malformed or out-of-range values.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, format chosen by extension
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown
    /// extension, or holds malformed or out-of-range values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let text = std::fs::read_to_string(path)?;
        let config = match extension.as_str() {
            "toml" => Self::from_toml_str(&text)?,
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        tracing::debug!(path = %path.display(), "rollup configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(RollupConfig::from_toml_str("").unwrap(), RollupConfig::default());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = RollupConfig::from_yaml_str("exclude_not_started: true\n").unwrap();
        assert!(config.exclude_not_started);
        assert_eq!(config.fiscal_year_start_month, 7);
        assert_eq!(config.top_indicator_limit, 10);
        assert_eq!(config.trend_window_days, 90);
        assert_eq!(config.trend_min_points, 3);
    }

    #[test]
    fn rejects_empty_trend_window() {
        let err = RollupConfig::from_toml_str("trend_window_days = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_month() {
        let err = RollupConfig::from_json_str(r#"{"fiscal_year_start_month": 13}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(RollupConfig::from_toml_str("colour = 'blue'").is_err());
    }

    #[test]
    fn load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollup.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "top_indicator_limit = 3").unwrap();
        assert_eq!(RollupConfig::load(&path).unwrap().top_indicator_limit, 3);

        let other = dir.path().join("rollup.ini");
        std::fs::write(&other, "").unwrap();
        assert!(matches!(
            RollupConfig::load(&other),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
