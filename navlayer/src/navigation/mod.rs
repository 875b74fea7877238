//! Navigation core
//!
//! This module holds the route model, the request options for the directions
//! service, and the [`Navigation`] session that ties them together.
//!
//! # Architecture
//!
//! ```text
//! location engine ──► Navigation::update_location ──► LocationObserver
//!                            │
//!                            ▼
//!                    RouteProgressTracker ──────────► RouteProgressObserver
//!
//! RouteOptions ──► Navigation::request_routes ──► DirectionsClient
//!                            │
//!                            ▼
//!                   RoutesRequestCallback ──► set_routes ──► RoutesObserver
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use navlayer::navigation::{Navigation, NavigationConfig, Point, RouteOptions};
//!
//! let navigation = Navigation::new(NavigationConfig::default(), directions);
//! navigation.start_trip_session();
//!
//! let options = RouteOptions::new()
//!     .apply_default_params()
//!     .access_token(token)
//!     .coordinates(origin, vec![], destination);
//! navigation.request_routes(options, callback).await;
//! ```

mod observer;
mod options;
mod progress;
mod route;
mod session;

pub use observer::{
    LocationObserver, ObserverRegistry, RouteProgressObserver, RoutesObserver,
    RoutesRequestCallback,
};
pub use options::{RouteOptions, RouteOptionsError, RoutingProfile, DEFAULT_BASE_URL, DEFAULT_USER};
pub use progress::{RouteProgressTracker, DEFAULT_ARRIVAL_RADIUS_M};
pub use route::{
    BannerComponent, BannerInstruction, BannerText, DirectionsResponse, DirectionsRoute,
    LegStep, Location, Point, RouteLeg, RouteProgress, StepManeuver, EARTH_RADIUS_M,
    GUIDANCE_VIEW_COMPONENT,
};
pub use session::{Navigation, NavigationConfig, RouteRequestOutcome};

#[cfg(test)]
pub(crate) use route::fixtures;
