//! Application error types.

use thiserror::Error;

use crate::accounts::TokenStoreError;
use crate::directions::DirectionsError;

/// Errors that can occur while assembling the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or unusable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The token store could not be opened.
    #[error("Failed to open token store: {0}")]
    TokenStore(#[from] TokenStoreError),

    /// The HTTP client could not be created.
    #[error("Failed to create directions client: {0}")]
    Directions(#[from] DirectionsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config("missing access token".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing access token"));
    }

    #[test]
    fn test_app_error_from_directions_error() {
        let err: AppError = DirectionsError::Http("tls".to_string()).into();
        assert!(matches!(err, AppError::Directions(_)));
    }

    #[test]
    fn test_app_error_from_token_store_error() {
        let err: AppError = TokenStoreError::Read {
            path: "/tmp/accounts.ini".into(),
            reason: "bad section".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::TokenStore(_)));
        assert!(err.to_string().starts_with("Failed to open token store"));
    }
}
