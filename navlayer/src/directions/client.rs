//! Directions client over an [`HttpClient`].

use std::sync::Arc;

use super::{DirectionsError, HttpClient};
use crate::accounts::NavigationAccounts;
use crate::navigation::{DirectionsResponse, DirectionsRoute, RouteOptions};

/// Fetches routes for a set of options.
///
/// Implementations are blocking; the navigation session calls them from a
/// blocking worker thread.
pub trait DirectionsClient: Send + Sync {
    fn fetch_routes(&self, options: &RouteOptions) -> Result<Vec<DirectionsRoute>, DirectionsError>;
}

/// Directions client for the HTTP directions API.
pub struct HttpDirectionsClient<C: HttpClient> {
    http_client: C,
    accounts: Option<Arc<NavigationAccounts>>,
}

impl<C: HttpClient> HttpDirectionsClient<C> {
    pub fn new(http_client: C) -> Self {
        Self {
            http_client,
            accounts: None,
        }
    }

    /// Appends the billing token from `accounts` to every request.
    pub fn with_accounts(mut self, accounts: Arc<NavigationAccounts>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    /// Builds the final request URL, billing token included.
    pub fn build_url(&self, options: &RouteOptions) -> Result<String, DirectionsError> {
        let url = options
            .request_url()
            .map_err(|e| DirectionsError::InvalidOptions(e.to_string()))?;

        match &self.accounts {
            Some(accounts) => {
                let query_size = url
                    .split_once('?')
                    .map(|(_, query)| query.len())
                    .unwrap_or(0);
                let query_size = i32::try_from(query_size).unwrap_or(i32::MAX);
                Ok(accounts.obtain_sku_token(Some(&url), query_size))
            }
            None => Ok(url),
        }
    }

    fn decode(body: &[u8]) -> Result<Vec<DirectionsRoute>, DirectionsError> {
        let response: DirectionsResponse =
            serde_json::from_slice(body).map_err(|e| DirectionsError::Decode(e.to_string()))?;

        if response.code != "Ok" {
            return Err(DirectionsError::Service {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }
        if response.routes.is_empty() {
            return Err(DirectionsError::NoRoutes);
        }
        Ok(response.routes)
    }
}

impl<C: HttpClient> DirectionsClient for HttpDirectionsClient<C> {
    fn fetch_routes(&self, options: &RouteOptions) -> Result<Vec<DirectionsRoute>, DirectionsError> {
        let url = self.build_url(options)?;
        tracing::debug!(
            profile = %options.profile,
            waypoints = options.coordinates.len(),
            alternatives = options.alternatives,
            "Requesting routes"
        );

        let body = self.http_client.get(&url)?;
        let routes = Self::decode(&body)?;

        tracing::debug!(count = routes.len(), "Received routes");
        Ok(routes)
    }
}
