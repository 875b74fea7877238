//! NavLayer - turn-by-turn navigation building blocks
//!
//! This library provides the client side of a turn-by-turn navigation SDK:
//! maneuver icon resolution and rendering, usage-billing (SKU) tokens for
//! service requests, a navigation session driven by location updates, and
//! the widgets and example flow built on top of it.
//!
//! - [`maneuver`]: pick and mirror the icon for a maneuver
//! - [`accounts`]: issue and append SKU billing tokens
//! - [`navigation`]: route model, trip session, route progress
//! - [`directions`]: client for the directions service
//! - [`junction`]: junction image widget
//! - [`lifecycle`]: host lifecycle events
//! - [`app`]: example application flow
//! - [`config`] / [`logging`]: configuration file and log setup

pub mod accounts;
pub mod app;
pub mod config;
pub mod directions;
pub mod junction;
pub mod lifecycle;
pub mod logging;
pub mod maneuver;
pub mod navigation;
