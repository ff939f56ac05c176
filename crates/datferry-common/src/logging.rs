//! Logging configuration and initialization
//!
//! Centralized `tracing` setup shared by the datferry binaries. Console
//! output is always enabled; a daily-rotated log file can be added on top,
//! which is how the scheduled cluster runs keep a persistent record.
//!
//! Components never write to stdout directly. Everything goes through the
//! structured macros (`info!`, `warn!`, `error!`), so tests can install
//! their own subscriber and capture output deterministically.
//!
//! # Example
//!
//! ```no_run
//! use datferry_common::logging::{init_logging, LogConfig, LogLevel};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::builder()
//!         .level(LogLevel::Debug)
//!         .file_prefix("datferry-copy")
//!         .build();
//!     init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to tracing Level
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(anyhow::anyhow!("Invalid log level: {}", s)),
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: LogLevel,

    /// Log format (text or JSON)
    pub format: LogFormat,

    /// Directory for daily-rotated log files; `None` disables file output
    pub log_dir: Option<PathBuf>,

    /// Log file name prefix (e.g. "datferry-copy" -> "datferry-copy.2026-08-26.log")
    pub file_prefix: String,

    /// Additional filter directives (e.g. "datferry_copy=debug")
    pub filter_directives: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Text,
            log_dir: None,
            file_prefix: "datferry".to_string(),
            filter_directives: None,
        }
    }
}

impl LogConfig {
    /// Load configuration from environment variables
    ///
    /// - `DATFERRY_LOG_LEVEL`: trace, debug, info, warn, error
    /// - `DATFERRY_LOG_FORMAT`: text, json
    /// - `DATFERRY_LOG_DIR`: directory for log files (enables file output)
    /// - `DATFERRY_LOG_FILTER`: additional filter directives
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("DATFERRY_LOG_LEVEL") {
            config.level = level.parse()?;
        }

        if let Ok(format) = std::env::var("DATFERRY_LOG_FORMAT") {
            config.format = format.parse()?;
        }

        if let Ok(dir) = std::env::var("DATFERRY_LOG_DIR") {
            config.log_dir = Some(PathBuf::from(dir));
        }

        if let Ok(filter) = std::env::var("DATFERRY_LOG_FILTER") {
            config.filter_directives = Some(filter);
        }

        Ok(config)
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }
}

/// Builder for LogConfig
#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = Some(dir.into());
        self
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.file_prefix = prefix.into();
        self
    }

    pub fn filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.config.filter_directives = Some(filter.into());
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Initialize logging with the given configuration
///
/// Sets up the global tracing subscriber. Call once at startup; a second
/// call fails because the global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut filter =
        EnvFilter::from_default_env().add_directive(config.level.to_tracing_level().into());

    if let Some(ref directives) = config.filter_directives {
        for directive in directives.split(',') {
            filter = filter.add_directive(
                directive
                    .parse()
                    .context("Failed to parse filter directive")?,
            );
        }
    }

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    match config.log_dir {
        None => match config.format {
            LogFormat::Text => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(console_layer)
                    .try_init()?;
            },
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(console_layer.json())
                    .try_init()?;
            },
        },
        Some(ref log_dir) => {
            std::fs::create_dir_all(log_dir).context("Failed to create log directory")?;

            let file_appender = tracing_appender::rolling::daily(log_dir, &config.file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // The guard must outlive the process for buffered lines to flush;
            // leak it since logging lasts until exit anyway.
            std::mem::forget(guard);

            // The file layer is built inside each arm: its subscriber type
            // parameter differs between the text and JSON stacks, so a single
            // binding shared across arms would not type-check.
            match config.format {
                LogFormat::Text => {
                    let file_layer = fmt::layer()
                        .with_writer(non_blocking)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_ansi(false);
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(console_layer)
                        .with(file_layer)
                        .try_init()?;
                },
                LogFormat::Json => {
                    let file_layer = fmt::layer()
                        .with_writer(non_blocking)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_ansi(false);
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(console_layer.json())
                        .with(file_layer.json())
                        .try_init()?;
                },
            }
        },
    }

    Ok(())
}
