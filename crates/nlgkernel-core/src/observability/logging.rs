//! Structured Logging
//!
//! Installs the `tracing` subscriber used by the engine and the CLI.
//!
//! # Features
//!
//! - Plain or JSON structured output
//! - `RUST_LOG` overrides the configured level
//! - Per-domain log levels, mapped onto crate targets
//! - Output always goes to stderr; stdout carries the narrative
//!
//! # Example
//!
//! ```rust,ignore
//! use nlgkernel_core::observability::logging::LogConfig;
//!
//! LogConfig::development().init()?;
//! tracing::info!(records = 3, "Report generation started");
//! ```

use crate::error::{KernelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level
    #[default]
    Info,
    /// Warning level
    Warn,
    /// Error level
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level
    pub level: LogLevel,
    /// Enable structured JSON output
    pub structured: bool,
    /// Include timestamps
    pub include_timestamps: bool,
    /// Include caller location
    pub include_location: bool,
    /// Include thread IDs
    pub include_thread_ids: bool,
    /// Per-domain log levels, keyed by domain feature name ("temporal", ...)
    pub domain_levels: BTreeMap<String, LogLevel>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            structured: false,
            include_timestamps: true,
            include_location: false,
            include_thread_ids: false,
            domain_levels: BTreeMap::new(),
        }
    }
}

impl LogConfig {
    /// Development configuration
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            include_location: true,
            ..Default::default()
        }
    }

    /// Set the default level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Toggle JSON output
    pub fn with_structured(mut self, structured: bool) -> Self {
        self.structured = structured;
        self
    }

    /// Set log level for a specific domain
    pub fn with_domain_level(mut self, domain: impl Into<String>, level: LogLevel) -> Self {
        self.domain_levels.insert(domain.into(), level);
        self
    }

    /// Filter directive string, e.g. `warn,nlgkernel_temporal=debug`.
    pub fn directives(&self) -> String {
        let mut directives = vec![self.level.to_string()];
        for (domain, level) in &self.domain_levels {
            directives.push(format!("nlgkernel_{}={}", domain, level));
        }
        directives.join(",")
    }

    /// Initialize logging
    ///
    /// A second call is a no-op; the first installed subscriber wins.
    pub fn init(&self) -> Result<()> {
        use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(self.directives())
                .map_err(|e| KernelError::ConfigError(format!("Invalid log filter: {}", e)))?,
        };

        let subscriber = tracing_subscriber::registry().with(filter);

        // `without_time` changes the layer type, so each branch installs its own.
        match (self.structured, self.include_timestamps) {
            (true, true) => {
                let layer = fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_thread_ids(self.include_thread_ids)
                    .with_file(self.include_location)
                    .with_line_number(self.include_location);
                subscriber.with(layer).try_init().ok();
            }
            (true, false) => {
                let layer = fmt::layer()
                    .json()
                    .without_time()
                    .with_writer(std::io::stderr)
                    .with_thread_ids(self.include_thread_ids)
                    .with_file(self.include_location)
                    .with_line_number(self.include_location);
                subscriber.with(layer).try_init().ok();
            }
            (false, true) => {
                let layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_thread_ids(self.include_thread_ids)
                    .with_file(self.include_location)
                    .with_line_number(self.include_location);
                subscriber.with(layer).try_init().ok();
            }
            (false, false) => {
                let layer = fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr)
                    .with_thread_ids(self.include_thread_ids)
                    .with_file(self.include_location)
                    .with_line_number(self.include_location);
                subscriber.with(layer).try_init().ok();
            }
        }

        Ok(())
    }
}
