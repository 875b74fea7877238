//! Maneuver icon lookup and mirroring rules.
//!
//! The icon table is keyed by `(type, modifier)` where either half may be a
//! wildcard. Left-hand variants are not drawn separately: they reuse the
//! right-hand drawing and are mirrored horizontally.
//!
//! # Resolution Order
//!
//! ```text
//! (type, modifier) ──miss──► (*, modifier) ──miss──► (type, *) ──miss──► ArrowStraight
//! ```

use std::fmt;

use super::types::{DrivingSide, ManeuverModifier, ManeuverType};

/// Drawing routine used to paint a maneuver icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManeuverIcon {
    Merge,
    OffRamp,
    Fork,
    Roundabout,
    Arrive,
    ArriveRight,
    ArrowSlightRight,
    ArrowRight,
    ArrowSharpRight,
    Arrow180Right,
    ArrowStraight,
}

impl ManeuverIcon {
    /// Name of the drawing routine, stable for logs and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            ManeuverIcon::Merge => "merge",
            ManeuverIcon::OffRamp => "off_ramp",
            ManeuverIcon::Fork => "fork",
            ManeuverIcon::Roundabout => "roundabout",
            ManeuverIcon::Arrive => "arrive",
            ManeuverIcon::ArriveRight => "arrive_right",
            ManeuverIcon::ArrowSlightRight => "arrow_slight_right",
            ManeuverIcon::ArrowRight => "arrow_right",
            ManeuverIcon::ArrowSharpRight => "arrow_sharp_right",
            ManeuverIcon::Arrow180Right => "arrow_180_right",
            ManeuverIcon::ArrowStraight => "arrow_straight",
        }
    }
}

impl fmt::Display for ManeuverIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type TableKey = (Option<ManeuverType>, Option<ManeuverModifier>);

/// Static icon table. Keys are unique.
const ICON_TABLE: &[(TableKey, ManeuverIcon)] = &[
    ((Some(ManeuverType::Merge), None), ManeuverIcon::Merge),
    ((Some(ManeuverType::OffRamp), None), ManeuverIcon::OffRamp),
    ((Some(ManeuverType::Fork), None), ManeuverIcon::Fork),
    ((Some(ManeuverType::Roundabout), None), ManeuverIcon::Roundabout),
    ((Some(ManeuverType::RoundaboutTurn), None), ManeuverIcon::Roundabout),
    ((Some(ManeuverType::ExitRoundabout), None), ManeuverIcon::Roundabout),
    ((Some(ManeuverType::Rotary), None), ManeuverIcon::Roundabout),
    ((Some(ManeuverType::ExitRotary), None), ManeuverIcon::Roundabout),
    ((Some(ManeuverType::Arrive), None), ManeuverIcon::Arrive),
    (
        (Some(ManeuverType::Arrive), Some(ManeuverModifier::Straight)),
        ManeuverIcon::Arrive,
    ),
    (
        (Some(ManeuverType::Arrive), Some(ManeuverModifier::Right)),
        ManeuverIcon::ArriveRight,
    ),
    (
        (Some(ManeuverType::Arrive), Some(ManeuverModifier::Left)),
        ManeuverIcon::ArriveRight,
    ),
    ((None, Some(ManeuverModifier::SlightRight)), ManeuverIcon::ArrowSlightRight),
    ((None, Some(ManeuverModifier::Right)), ManeuverIcon::ArrowRight),
    ((None, Some(ManeuverModifier::SharpRight)), ManeuverIcon::ArrowSharpRight),
    ((None, Some(ManeuverModifier::SlightLeft)), ManeuverIcon::ArrowSlightRight),
    ((None, Some(ManeuverModifier::Left)), ManeuverIcon::ArrowRight),
    ((None, Some(ManeuverModifier::SharpLeft)), ManeuverIcon::ArrowSharpRight),
    ((None, Some(ManeuverModifier::Uturn)), ManeuverIcon::Arrow180Right),
    ((None, Some(ManeuverModifier::Straight)), ManeuverIcon::ArrowStraight),
    ((None, None), ManeuverIcon::ArrowStraight),
];

/// Icon used when nothing in the table matches.
pub const DEFAULT_ICON: ManeuverIcon = ManeuverIcon::ArrowStraight;

fn lookup(key: TableKey) -> Option<ManeuverIcon> {
    ICON_TABLE
        .iter()
        .find(|(entry, _)| *entry == key)
        .map(|(_, icon)| *icon)
}

/// Returns the table entry for an exact key, wildcards included.
///
/// Exposed for inspection and tests; use [`resolve_icon`] for lookups.
pub fn table_entry(
    maneuver_type: Option<ManeuverType>,
    modifier: Option<ManeuverModifier>,
) -> Option<ManeuverIcon> {
    lookup((maneuver_type, modifier))
}

/// Selects the drawing routine for a maneuver.
pub fn resolve_icon(
    maneuver_type: Option<ManeuverType>,
    modifier: Option<ManeuverModifier>,
) -> ManeuverIcon {
    lookup((maneuver_type, modifier))
        .or_else(|| lookup((None, modifier)))
        .or_else(|| lookup((maneuver_type, None)))
        .unwrap_or(DEFAULT_ICON)
}

/// Decides whether the icon must be mirrored horizontally.
///
/// Roundabouts are drawn counter-clockwise, so they mirror for left-hand
/// traffic regardless of modifier. A U-turn in left-hand traffic turns the
/// other way, which inverts whatever was decided before.
pub fn should_flip(
    maneuver_type: Option<ManeuverType>,
    modifier: Option<ManeuverModifier>,
    driving_side: DrivingSide,
) -> bool {
    let left_driving = driving_side == DrivingSide::Left;

    let mut flip = modifier.is_some_and(|m| m.flips_by_default());
    if maneuver_type.is_some_and(|t| t.is_roundabout()) {
        flip = left_driving;
    }

    if left_driving && modifier == Some(ManeuverModifier::Uturn) {
        !flip
    } else {
        flip
    }
}

/// Icon selection plus mirroring for one maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedIcon {
    pub icon: ManeuverIcon,
    pub flip: bool,
}

impl fmt::Display for ResolvedIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flip {
            write!(f, "{} (mirrored)", self.icon)
        } else {
            write!(f, "{}", self.icon)
        }
    }
}

/// Resolves both the drawing routine and the mirroring for a maneuver.
pub fn resolve(
    maneuver_type: Option<ManeuverType>,
    modifier: Option<ManeuverModifier>,
    driving_side: DrivingSide,
) -> ResolvedIcon {
    let resolved = ResolvedIcon {
        icon: resolve_icon(maneuver_type, modifier),
        flip: should_flip(maneuver_type, modifier, driving_side),
    };
    tracing::trace!(
        maneuver_type = ?maneuver_type,
        modifier = ?modifier,
        driving_side = %driving_side,
        icon = %resolved.icon,
        flip = resolved.flip,
        "Resolved maneuver icon"
    );
    resolved
}

/// Resolves a maneuver given the raw strings of a directions response.
///
/// Unknown types and unknown or blank modifiers count as absent; only
/// `"left"` selects left-hand driving.
pub fn resolve_str(
    maneuver_type: Option<&str>,
    modifier: Option<&str>,
    driving_side: Option<&str>,
) -> ResolvedIcon {
    resolve(
        ManeuverType::parse_opt(maneuver_type),
        ManeuverModifier::parse_opt(modifier),
        DrivingSide::from_wire(driving_side),
    )
}
