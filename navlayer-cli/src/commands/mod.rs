//! CLI command implementations.

pub mod common;
pub mod config;
pub mod maneuver;
pub mod route;
pub mod sku;
pub mod tokens;
