//! Example application built on the navigation session.
//!
//! This module provides [`SimpleNavigationApp`], the smallest useful host
//! for a [`Navigation`](crate::navigation::Navigation) session: it follows a
//! [`Lifecycle`](crate::lifecycle::Lifecycle), keeps the map camera and
//! markers in sync, and requests routes on long click.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    SimpleNavigationApp                        │
//! │                                                               │
//! │  AppConfig ──► IniTokenStore ──► NavigationAccounts           │
//! │                                       │                       │
//! │            ReqwestClient ──► HttpDirectionsClient             │
//! │                                       │                       │
//! │                                       ▼                       │
//! │                                  Navigation ◄── Lifecycle     │
//! │                                       │                       │
//! │                 MarkerLayer / CameraState (observers)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use navlayer::app::{AppConfig, SimpleNavigationApp};
//!
//! let config = AppConfig::from_config_file(&ConfigFile::load()?)?;
//! let app = Arc::new(SimpleNavigationApp::start(config, runtime.handle().clone())?);
//!
//! let observer: Arc<dyn LifecycleObserver> = app.clone();
//! lifecycle.add_observer(&observer);
//! lifecycle.handle_event(LifecycleEvent::Create);
//! ```

mod config;
mod error;
mod simple;

pub use config::{AppConfig, DEFAULT_ZOOM};
pub use error::AppError;
pub use simple::{CameraMode, CameraState, Marker, MarkerLayer, SimpleNavigationApp, MARKER_ICON};
