//! Logging infrastructure for the gallery backend.
//!
//! `RUST_LOG`, when set, overrides the configured level entirely.

use std::str::FromStr;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Crates whose events are shown at the configured level.
const GALLERY_TARGETS: &[&str] = &["gallery_core", "gallery_api", "gallery_cli"];

/// Errors raised while setting up logging.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log level '{0}' (expected trace, debug, info, warn or error)")]
    InvalidLevel(String),

    #[error("Failed to install global subscriber: {0}")]
    Init(String),
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level.
    pub level: Level,
    /// Whether to use JSON format.
    pub json_format: bool,
    /// Whether to include span open/close events.
    pub include_spans: bool,
    /// Whether to include file/line info.
    pub include_location: bool,
    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            include_spans: false,
            include_location: false,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Verbose human-readable output.
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            json_format: false,
            include_spans: true,
            include_location: true,
            include_target: true,
        }
    }

    /// JSON lines for log aggregation.
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            json_format: true,
            include_spans: false,
            include_location: false,
            include_target: true,
        }
    }

    /// Builds a configuration from the textual level used in config files.
    pub fn from_level_str(level: &str, json_format: bool) -> Result<Self, LoggingError> {
        let level = Level::from_str(level.trim())
            .map_err(|_| LoggingError::InvalidLevel(level.to_string()))?;
        Ok(Self {
            level,
            json_format,
            ..Self::default()
        })
    }

    /// Filter directives applied when `RUST_LOG` is unset.
    pub fn default_directives(&self) -> String {
        let level = self.level.to_string().to_lowercase();
        let mut directives: Vec<String> = GALLERY_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect();
        directives.push(format!("tower_http={level}"));
        directives.push("sqlx=warn".to_string());
        directives.join(",")
    }
}

/// Initializes the logging system with default configuration.
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with_config(LoggingConfig::default())
}

/// Initializes the logging system with the given configuration.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging_with_config(config: LoggingConfig) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

    let span_events = if config.include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_span_events(span_events)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_target(config.include_target),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_span_events(span_events)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_target(config.include_target),
            )
            .try_init()
    };

    result.map_err(|e| LoggingError::Init(e.to_string()))
}
