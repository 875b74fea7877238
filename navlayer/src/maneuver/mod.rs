//! Maneuver icon selection and rendering
//!
//! Every route step carries a maneuver type, an optional modifier and the
//! driving side. This module turns those three values into the drawing
//! routine to use and whether the drawing must be mirrored, then renders it.
//!
//! # Example
//!
//! ```
//! use navlayer::maneuver::{resolve_str, ManeuverIcon};
//!
//! let resolved = resolve_str(Some("turn"), Some("sharp left"), Some("right"));
//! assert_eq!(resolved.icon, ManeuverIcon::ArrowSharpRight);
//! assert!(resolved.flip);
//! ```

mod icon;
mod render;
mod types;

pub use icon::{
    resolve, resolve_icon, resolve_str, should_flip, table_entry, ManeuverIcon, ResolvedIcon,
    DEFAULT_ICON,
};
pub use render::{
    clamp_roundabout_angle, render, save_icon, shapes, to_rgba_image, IconStyle, Layer,
    RenderError, Shape, DEFAULT_ROUNDABOUT_ANGLE, MAX_ROUNDABOUT_ANGLE, MIN_ROUNDABOUT_ANGLE,
};
pub use types::{DrivingSide, ManeuverModifier, ManeuverType, UnknownManeuverValue};
