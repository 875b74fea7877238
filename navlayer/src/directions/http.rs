//! HTTP client abstraction for testability

use super::DirectionsError;

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get(&self, url: &str) -> Result<Vec<u8>, DirectionsError>;
}

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Real HTTP client implementation using reqwest.
///
/// The blocking client owns an internal runtime, so it must be created and
/// used outside of async contexts (e.g. inside `spawn_blocking`).
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, DirectionsError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, DirectionsError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(concat!("navlayer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DirectionsError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, DirectionsError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| DirectionsError::Http(format!("Request failed: {}", e.without_url())))?;

        let status = response.status();

        // The directions service reports errors as JSON bodies with a 4xx
        // status; hand those to the decoder instead of failing here.
        if status.is_server_error() {
            return Err(DirectionsError::Http(format!("HTTP {}", status)));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| DirectionsError::Http(format!("Failed to read response: {}", e)))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Mock HTTP client for testing
    pub struct MockHttpClient {
        pub response: Result<Vec<u8>, DirectionsError>,
        pub requested: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        pub fn new(response: Result<Vec<u8>, DirectionsError>) -> Self {
            Self {
                response,
                requested: Mutex::new(Vec::new()),
            }
        }

        pub fn last_url(&self) -> Option<String> {
            self.requested.lock().last().cloned()
        }
    }

    impl HttpClient for MockHttpClient {
        fn get(&self, url: &str) -> Result<Vec<u8>, DirectionsError> {
            self.requested.lock().push(url.to_string());
            self.response.clone()
        }
    }

    #[test]
    fn test_mock_client_success() {
        let mock = MockHttpClient::new(Ok(vec![1, 2, 3, 4]));

        let result = mock.get("http://example.com");
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(mock.last_url().as_deref(), Some("http://example.com"));
    }

    #[test]
    fn test_mock_client_error() {
        let mock = MockHttpClient::new(Err(DirectionsError::Http("Test error".to_string())));

        let result = mock.get("http://example.com");
        assert!(result.is_err());
    }
}
