//! Junction (guidance view) widget
//!
//! [`JunctionViewModel`] listens to navigation events and publishes the
//! junction image URL of the current step on a `tokio::sync::watch`
//! channel. [`JunctionView`] binds the view model to a [`Navigation`]
//! session for as long as its [`Lifecycle`] lives.
//!
//! ```text
//! Navigation ──routes/progress──► JunctionViewModel ──watch──► JunctionView
//!                                                                  ▲
//! Lifecycle ───────────────────── Destroy ─────────────────────────┘
//! ```
//!
//! [`Navigation`]: crate::navigation::Navigation
//! [`Lifecycle`]: crate::lifecycle::Lifecycle

mod view;
mod view_model;

pub use view::{JunctionView, Visibility};
pub use view_model::JunctionViewModel;
