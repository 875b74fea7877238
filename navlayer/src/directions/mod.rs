//! Directions service client
//!
//! Route computation happens in the remote directions service. This module is
//! only the seam to it: build the request URL, attach the billing token, and
//! decode the response into [`DirectionsRoute`](crate::navigation::DirectionsRoute)s.
//!
//! ```ignore
//! use navlayer::directions::{HttpDirectionsClient, ReqwestClient};
//!
//! let client = HttpDirectionsClient::new(ReqwestClient::new()?).with_accounts(accounts);
//! let routes = client.fetch_routes(&options)?;
//! ```

mod client;
mod http;

pub use client::{DirectionsClient, HttpDirectionsClient};
pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};

#[cfg(test)]
pub use http::tests::MockHttpClient;

use thiserror::Error;

/// Errors from route requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DirectionsError {
    /// Transport failure or unusable HTTP status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body was not a directions response.
    #[error("failed to decode directions response: {0}")]
    Decode(String),

    /// Service answered with a non-`Ok` code.
    #[error("directions service returned {code}: {message}")]
    Service { code: String, message: String },

    /// Service answered `Ok` without any route.
    #[error("no routes found")]
    NoRoutes,

    /// Options cannot form a request.
    #[error("invalid route options: {0}")]
    InvalidOptions(String),

    /// Request task failed to complete.
    #[error("route request aborted: {0}")]
    Aborted(String),
}
