//! `navlayer maneuver`: resolve, and optionally render, a maneuver icon.

use std::path::PathBuf;

use clap::Args;
use console::style;
use navlayer::maneuver::{self, save_icon, IconStyle, DEFAULT_ROUNDABOUT_ANGLE};

use crate::error::CliError;

/// Arguments of the maneuver command.
#[derive(Debug, Args)]
pub struct ManeuverArgs {
    /// Maneuver type as sent by the directions service (e.g. "turn", "off ramp")
    #[arg(long = "type", value_name = "TYPE")]
    pub maneuver_type: Option<String>,

    /// Maneuver modifier (e.g. "sharp left", "uturn")
    #[arg(long)]
    pub modifier: Option<String>,

    /// Driving side, "left" or "right"
    #[arg(long)]
    pub driving_side: Option<String>,

    /// Render the icon to this file (format from extension, e.g. .png)
    #[arg(long, value_name = "PATH")]
    pub render: Option<PathBuf>,

    /// Icon size in pixels
    #[arg(long, default_value_t = 128)]
    pub size: u32,

    /// Roundabout exit angle in degrees, clamped to 60..=300
    #[arg(long, default_value_t = DEFAULT_ROUNDABOUT_ANGLE)]
    pub angle: f32,
}

/// Run the maneuver command.
pub fn run(args: ManeuverArgs) -> Result<(), CliError> {
    let resolved = maneuver::resolve_str(
        args.maneuver_type.as_deref(),
        args.modifier.as_deref(),
        args.driving_side.as_deref(),
    );

    println!("Icon:   {}", style(resolved.icon).cyan());
    println!("Mirror: {}", if resolved.flip { "yes" } else { "no" });

    if let Some(path) = args.render {
        if args.size == 0 {
            return Err(CliError::InvalidArgument("--size must be positive".to_string()));
        }
        let icon_style = IconStyle::default()
            .with_size(args.size)
            .with_roundabout_angle(args.angle);
        save_icon(resolved, &icon_style, &path)?;
        println!("Saved {}", path.display());
    }
    Ok(())
}
