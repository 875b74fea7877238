//! Maneuver vocabulary as it appears in directions responses.

use std::fmt;
use std::str::FromStr;

/// Maneuver type of a route step (`maneuver.type` in the response).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManeuverType {
    Turn,
    NewName,
    Depart,
    Arrive,
    Merge,
    OnRamp,
    OffRamp,
    Fork,
    EndOfRoad,
    Continue,
    Roundabout,
    Rotary,
    RoundaboutTurn,
    Notification,
    ExitRoundabout,
    ExitRotary,
}

impl ManeuverType {
    /// All known maneuver types.
    pub const ALL: [ManeuverType; 16] = [
        ManeuverType::Turn,
        ManeuverType::NewName,
        ManeuverType::Depart,
        ManeuverType::Arrive,
        ManeuverType::Merge,
        ManeuverType::OnRamp,
        ManeuverType::OffRamp,
        ManeuverType::Fork,
        ManeuverType::EndOfRoad,
        ManeuverType::Continue,
        ManeuverType::Roundabout,
        ManeuverType::Rotary,
        ManeuverType::RoundaboutTurn,
        ManeuverType::Notification,
        ManeuverType::ExitRoundabout,
        ManeuverType::ExitRotary,
    ];

    /// Wire representation used by the directions service.
    pub fn as_str(&self) -> &'static str {
        match self {
            ManeuverType::Turn => "turn",
            ManeuverType::NewName => "new name",
            ManeuverType::Depart => "depart",
            ManeuverType::Arrive => "arrive",
            ManeuverType::Merge => "merge",
            ManeuverType::OnRamp => "on ramp",
            ManeuverType::OffRamp => "off ramp",
            ManeuverType::Fork => "fork",
            ManeuverType::EndOfRoad => "end of road",
            ManeuverType::Continue => "continue",
            ManeuverType::Roundabout => "roundabout",
            ManeuverType::Rotary => "rotary",
            ManeuverType::RoundaboutTurn => "roundabout turn",
            ManeuverType::Notification => "notification",
            ManeuverType::ExitRoundabout => "exit roundabout",
            ManeuverType::ExitRotary => "exit rotary",
        }
    }

    /// Returns true for the maneuvers drawn with the roundabout icon.
    ///
    /// These are also the only types whose mirroring depends on the
    /// driving side rather than on the modifier.
    pub fn is_roundabout(&self) -> bool {
        matches!(
            self,
            ManeuverType::Rotary
                | ManeuverType::Roundabout
                | ManeuverType::RoundaboutTurn
                | ManeuverType::ExitRoundabout
                | ManeuverType::ExitRotary
        )
    }

    /// Returns true if the icon for this type never depends on the modifier.
    pub fn ignores_modifier(&self) -> bool {
        matches!(self, ManeuverType::OffRamp | ManeuverType::Fork) || self.is_roundabout()
    }

    /// Parses an optional wire string, treating unknown values as absent.
    pub fn parse_opt(value: Option<&str>) -> Option<Self> {
        value.and_then(|s| s.parse().ok())
    }
}

impl fmt::Display for ManeuverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManeuverType {
    type Err = UnknownManeuverValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ManeuverType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == trimmed)
            .ok_or_else(|| UnknownManeuverValue(s.to_string()))
    }
}

/// Maneuver modifier, the direction qualifier of a maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManeuverModifier {
    Uturn,
    SharpRight,
    Right,
    SlightRight,
    Straight,
    SlightLeft,
    Left,
    SharpLeft,
}

impl ManeuverModifier {
    /// All known modifiers.
    pub const ALL: [ManeuverModifier; 8] = [
        ManeuverModifier::Uturn,
        ManeuverModifier::SharpRight,
        ManeuverModifier::Right,
        ManeuverModifier::SlightRight,
        ManeuverModifier::Straight,
        ManeuverModifier::SlightLeft,
        ManeuverModifier::Left,
        ManeuverModifier::SharpLeft,
    ];

    /// Wire representation used by the directions service.
    pub fn as_str(&self) -> &'static str {
        match self {
            ManeuverModifier::Uturn => "uturn",
            ManeuverModifier::SharpRight => "sharp right",
            ManeuverModifier::Right => "right",
            ManeuverModifier::SlightRight => "slight right",
            ManeuverModifier::Straight => "straight",
            ManeuverModifier::SlightLeft => "slight left",
            ManeuverModifier::Left => "left",
            ManeuverModifier::SharpLeft => "sharp left",
        }
    }

    /// Modifiers whose icon is the mirrored image of a right-hand arrow.
    pub fn flips_by_default(&self) -> bool {
        matches!(
            self,
            ManeuverModifier::SlightLeft
                | ManeuverModifier::Left
                | ManeuverModifier::SharpLeft
                | ManeuverModifier::Uturn
        )
    }

    /// Parses an optional wire string; blank and unknown values are absent.
    pub fn parse_opt(value: Option<&str>) -> Option<Self> {
        value
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| s.parse().ok())
    }
}

impl fmt::Display for ManeuverModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManeuverModifier {
    type Err = UnknownManeuverValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ManeuverModifier::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == trimmed)
            .ok_or_else(|| UnknownManeuverValue(s.to_string()))
    }
}

/// Side of the road traffic drives on for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrivingSide {
    Left,
    #[default]
    Right,
}

impl DrivingSide {
    /// Only an explicit `"left"` selects left-hand traffic.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some(s) if s.trim() == "left" => DrivingSide::Left,
            _ => DrivingSide::Right,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrivingSide::Left => "left",
            DrivingSide::Right => "right",
        }
    }
}

impl fmt::Display for DrivingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A maneuver type or modifier string that is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown maneuver value: '{0}'")]
pub struct UnknownManeuverValue(pub String);
