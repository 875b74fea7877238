//! Logging setup
//!
//! Installs the global `tracing` subscriber:
//!
//! - an `EnvFilter` built from the configured level, overridden by `RUST_LOG`
//! - a compact stderr layer
//! - an optional daily-rolling file in the configured directory, written
//!   through a non-blocking worker
//!
//! Keep the returned [`LoggingGuard`] alive until shutdown so buffered file
//! output gets flushed.
//!
//! ```ignore
//! let _guard = navlayer::logging::init_logging(&LoggingConfig::default())?;
//! tracing::info!("ready");
//! ```

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{LoggingSettings, DEFAULT_LOG_LEVEL};

/// Prefix of rolled log files, e.g. `navlayer.2024-05-01.log`.
pub const LOG_FILE_PREFIX: &str = "navlayer";

/// Log files kept before the oldest is deleted.
pub const MAX_LOG_FILES: usize = 7;

/// Errors from installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("failed to create log directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    #[error("a global subscriber is already installed: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `navlayer=debug`.
    pub level: String,
    /// Directory for daily log files. Console only when `None`.
    pub directory: Option<PathBuf>,
    /// Whether to also log to stderr.
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
            console: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    /// The filter in effect: `RUST_LOG` if set and valid, else the
    /// configured level.
    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.level).map_err(|e| LoggingError::InvalidFilter {
            filter: self.level.clone(),
            reason: e.to_string(),
        })
    }
}

impl From<&LoggingSettings> for LoggingConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level.clone(),
            directory: settings.directory.clone(),
            console: true,
        }
    }
}

/// Keeps the file writer alive. Dropping it flushes pending output.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LoggingGuard {
    file: Option<WorkerGuard>,
}

impl LoggingGuard {
    pub fn has_file_output(&self) -> bool {
        self.file.is_some()
    }
}

/// Installs the global subscriber described by `config`.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = config.env_filter()?;
    let mut layers = Vec::new();

    if config.console {
        layers.push(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_timer(LocalTime::rfc_3339())
                .with_writer(std::io::stderr)
                .boxed(),
        );
    }

    let guard = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory).map_err(|source| LoggingError::Directory {
                path: directory.clone(),
                source,
            })?;

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix("log")
                .max_log_files(MAX_LOG_FILES)
                .build(directory)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_timer(LocalTime::rfc_3339())
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()?;

    tracing::debug!(
        level = %config.level,
        directory = ?config.directory,
        "Logging initialized"
    );
    Ok(LoggingGuard { file: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.directory.is_none());
        assert!(config.console);
    }

    #[test]
    fn test_from_settings() {
        let settings = LoggingSettings {
            level: "debug".to_string(),
            directory: Some(PathBuf::from("/tmp/navlayer-logs")),
        };
        let config = LoggingConfig::from(&settings);
        assert_eq!(config.level, "debug");
        assert_eq!(config.directory, Some(PathBuf::from("/tmp/navlayer-logs")));
    }

    #[test]
    fn test_default_settings_log_to_console_only() {
        let config = LoggingConfig::from(&LoggingSettings::default());
        assert!(config.console);
        assert!(config.directory.is_none());
    }

    #[test]
    fn test_builder() {
        let config = LoggingConfig::default()
            .with_level("navlayer=trace")
            .with_directory("/var/log/navlayer")
            .with_console(false);
        assert_eq!(config.level, "navlayer=trace");
        assert!(!config.console);
        assert!(config.directory.is_some());
    }

    #[test]
    fn test_error_display() {
        let err = LoggingError::InvalidFilter {
            filter: "[[".to_string(),
            reason: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "invalid log filter '[[': bad");
    }
}
