//! Narrative Configuration Management
//!
//! Provides the tunables for report generation:
//! - Display sizes (how many buzzwords and key words to list)
//! - Statistical thresholds (outlier cut-off, trend significance levels)
//! - Geographic sentinel and calendar offset
//! - Logging
//!
//! # Example
//!
//! ```rust,ignore
//! use nlgkernel_core::config::NarrativeConfig;
//!
//! // Load from environment
//! let config = NarrativeConfig::from_env()?;
//!
//! // Or load from file
//! let config = NarrativeConfig::from_file("config/narrative.toml")?;
//! config.validate()?;
//! ```

use crate::error::{KernelError, Result};
use crate::observability::{LogConfig, LogLevel};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted calendar offset (±14 hours).
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Unified narrative configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Number of buzzwords / key words / topic keywords displayed
    pub words_display_num: usize,
    /// Modified z-score above which a member is an outlier
    pub outlier_threshold: f64,
    /// Significance level for the Mann-Kendall test reported on raw series
    pub trend_alpha: f64,
    /// Significance level for the Mann-Kendall test run on decomposed trends
    pub exploratory_alpha: f64,
    /// Region name that marks documents without a known origin
    pub unknown_region: String,
    /// Fixed offset from UTC used when rendering calendar labels
    pub utc_offset_minutes: i32,
    /// Logging configuration
    pub logging: LogConfig,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            words_display_num: 5,
            outlier_threshold: 3.5,
            trend_alpha: 0.05,
            exploratory_alpha: 0.5,
            unknown_region: "Unknown".to_string(),
            utc_offset_minutes: 0,
            logging: LogConfig::default(),
        }
    }
}

impl NarrativeConfig {
    /// Create development configuration
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// `NLG_ENV=development` selects the development preset; individual
    /// `NLG_*` variables override single fields. Unparseable values are
    /// rejected rather than ignored.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("NLG_ENV").as_deref() {
            Ok("development") | Ok("dev") => Self::development(),
            _ => Self::default(),
        };

        if let Ok(val) = std::env::var("NLG_WORDS_DISPLAY_NUM") {
            config.words_display_num = parse_env("NLG_WORDS_DISPLAY_NUM", &val)?;
        }

        if let Ok(val) = std::env::var("NLG_OUTLIER_THRESHOLD") {
            config.outlier_threshold = parse_env("NLG_OUTLIER_THRESHOLD", &val)?;
        }

        if let Ok(val) = std::env::var("NLG_TREND_ALPHA") {
            config.trend_alpha = parse_env("NLG_TREND_ALPHA", &val)?;
        }

        if let Ok(val) = std::env::var("NLG_EXPLORATORY_ALPHA") {
            config.exploratory_alpha = parse_env("NLG_EXPLORATORY_ALPHA", &val)?;
        }

        if let Ok(name) = std::env::var("NLG_UNKNOWN_REGION") {
            config.unknown_region = name;
        }

        if let Ok(val) = std::env::var("NLG_UTC_OFFSET_MINUTES") {
            config.utc_offset_minutes = parse_env("NLG_UTC_OFFSET_MINUTES", &val)?;
        }

        // Logging overrides
        if let Ok(val) = std::env::var("NLG_LOG_LEVEL") {
            config.logging.level = val
                .parse::<LogLevel>()
                .map_err(KernelError::ConfigError)?;
        }

        if std::env::var("NLG_LOG_JSON").is_ok() {
            config.logging.structured = true;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| KernelError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| KernelError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Render configuration as TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| KernelError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| KernelError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.words_display_num == 0 {
            return Err(KernelError::ConfigError(
                "words_display_num must be at least 1".to_string(),
            ));
        }

        if !(self.outlier_threshold.is_finite() && self.outlier_threshold > 0.0) {
            return Err(KernelError::ConfigError(format!(
                "outlier_threshold must be positive, got {}",
                self.outlier_threshold
            )));
        }

        for (name, alpha) in [
            ("trend_alpha", self.trend_alpha),
            ("exploratory_alpha", self.exploratory_alpha),
        ] {
            if !(alpha > 0.0 && alpha < 1.0) {
                return Err(KernelError::ConfigError(format!(
                    "{} must lie in (0, 1), got {}",
                    name, alpha
                )));
            }
        }

        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(KernelError::ConfigError(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }

        if self.unknown_region.trim().is_empty() {
            tracing::warn!("Empty unknown_region; no region will be treated as unknown");
        }

        Ok(())
    }

    /// Set number of displayed words
    pub fn with_words_display_num(mut self, n: usize) -> Self {
        self.words_display_num = n;
        self
    }

    /// Set outlier threshold
    pub fn with_outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = threshold;
        self
    }

    /// Set trend significance level
    pub fn with_trend_alpha(mut self, alpha: f64) -> Self {
        self.trend_alpha = alpha;
        self
    }

    /// Set exploratory significance level
    pub fn with_exploratory_alpha(mut self, alpha: f64) -> Self {
        self.exploratory_alpha = alpha;
        self
    }

    /// Set unknown region sentinel
    pub fn with_unknown_region(mut self, name: impl Into<String>) -> Self {
        self.unknown_region = name.into();
        self
    }

    /// Set calendar offset
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Set logging configuration
    pub fn with_logging(mut self, config: LogConfig) -> Self {
        self.logging = config;
        self
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, val: &str) -> Result<T> {
    val.trim()
        .parse()
        .map_err(|_| KernelError::ConfigError(format!("Invalid value for {}: {}", key, val)))
}

/// Configuration builder
#[derive(Default)]
pub struct NarrativeConfigBuilder {
    config: NarrativeConfig,
}

impl NarrativeConfigBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from development preset
    pub fn development() -> Self {
        Self {
            config: NarrativeConfig::development(),
        }
    }

    /// Set number of displayed words
    pub fn words_display_num(mut self, n: usize) -> Self {
        self.config.words_display_num = n;
        self
    }

    /// Set outlier threshold
    pub fn outlier_threshold(mut self, threshold: f64) -> Self {
        self.config.outlier_threshold = threshold;
        self
    }

    /// Set trend significance level
    pub fn trend_alpha(mut self, alpha: f64) -> Self {
        self.config.trend_alpha = alpha;
        self
    }

    /// Set unknown region sentinel
    pub fn unknown_region(mut self, name: impl Into<String>) -> Self {
        self.config.unknown_region = name.into();
        self
    }

    /// Set calendar offset
    pub fn utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.config.utc_offset_minutes = minutes;
        self
    }

    /// Configure logging
    pub fn logging(mut self, f: impl FnOnce(LogConfig) -> LogConfig) -> Self {
        self.config.logging = f(self.config.logging);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<NarrativeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> NarrativeConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NarrativeConfig::default();
        assert_eq!(config.words_display_num, 5);
        assert_eq!(config.outlier_threshold, 3.5);
        assert_eq!(config.trend_alpha, 0.05);
        assert_eq!(config.exploratory_alpha, 0.5);
        assert_eq!(config.unknown_region, "Unknown");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_development_config() {
        let config = NarrativeConfig::development();
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_builder() {
        let config = NarrativeConfigBuilder::new()
            .words_display_num(3)
            .unknown_region("N/A")
            .utc_offset_minutes(-300)
            .logging(|l| l.with_structured(true))
            .build()
            .unwrap();

        assert_eq!(config.words_display_num, 3);
        assert_eq!(config.unknown_region, "N/A");
        assert_eq!(config.utc_offset_minutes, -300);
        assert!(config.logging.structured);
    }

    #[test]
    fn test_config_validation() {
        assert!(NarrativeConfig::default()
            .with_trend_alpha(1.0)
            .validate()
            .is_err());
        assert!(NarrativeConfig::default()
            .with_exploratory_alpha(0.0)
            .validate()
            .is_err());
        assert!(NarrativeConfig::default()
            .with_words_display_num(0)
            .validate()
            .is_err());
        assert!(NarrativeConfig::default()
            .with_outlier_threshold(-1.0)
            .validate()
            .is_err());
        assert!(NarrativeConfig::default()
            .with_utc_offset_minutes(15 * 60)
            .validate()
            .is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = NarrativeConfig::default().with_outlier_threshold(3.0);
        let text = config.to_toml().unwrap();
        let parsed = NarrativeConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = NarrativeConfig::from_toml("words_display_num = 8\n").unwrap();
        assert_eq!(parsed.words_display_num, 8);
        assert_eq!(parsed.outlier_threshold, 3.5);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("nlgkernel-config-{}.toml", std::process::id()));
        let config = NarrativeConfig::default().with_unknown_region("Elsewhere");
        config.to_file(&path).unwrap();
        let loaded = NarrativeConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.unknown_region, "Elsewhere");
    }
}
