//! CLI error type and exit codes.

use std::fmt;

use navlayer::accounts::TokenStoreError;
use navlayer::app::AppError;
use navlayer::config::ConfigError;
use navlayer::logging::LoggingError;
use navlayer::maneuver::RenderError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Bad or missing configuration.
    Config(String),
    /// Configuration file could not be read or written.
    ConfigFile(ConfigError),
    /// Logging could not be set up.
    Logging(LoggingError),
    /// Application assembly failed.
    App(AppError),
    /// Icon rendering failed.
    Render(RenderError),
    /// Token store access failed.
    TokenStore(TokenStoreError),
    /// Command-line value that clap could not reject on its own.
    InvalidArgument(String),
    /// The Tokio runtime could not be created.
    Runtime(String),
    /// The route request did not produce routes.
    Route(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgument(_) => 2,
            CliError::Config(_) | CliError::ConfigFile(_) => 3,
            CliError::Route(_) => 4,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::App(e) => write!(f, "{}", e),
            CliError::Render(e) => write!(f, "Failed to render icon: {}", e),
            CliError::TokenStore(e) => write!(f, "Token store error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Runtime(msg) => write!(f, "Failed to create Tokio runtime: {}", msg),
            CliError::Route(msg) => write!(f, "Route request failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::App(e) => Some(e),
            CliError::Render(e) => Some(e),
            CliError::TokenStore(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Config(msg) => CliError::Config(msg),
            other => CliError::App(other),
        }
    }
}

impl From<RenderError> for CliError {
    fn from(e: RenderError) -> Self {
        CliError::Render(e)
    }
}

impl From<TokenStoreError> for CliError {
    fn from(e: TokenStoreError) -> Self {
        CliError::TokenStore(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_error_maps_to_config() {
        let err: CliError = AppError::Config("no token".to_string()).into();
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_display() {
        let err = CliError::InvalidArgument("size must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid argument: size must be positive");
        assert_eq!(err.exit_code(), 2);
    }
}
