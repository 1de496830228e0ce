// Position labels and slot-compatibility rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Football positions used for formation slot assignment.
///
/// These are the four position classes the roster sheet uses; there is no
/// finer-grained role model (no wingers, no fullbacks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DF")]
    Defender,
    #[serde(rename = "MF")]
    Midfielder,
    #[serde(rename = "ST")]
    Striker,
}

impl Position {
    /// Parse a position string into a Position enum.
    ///
    /// Handles the sheet's abbreviations plus a few common aliases:
    /// - "DF"/"DEF" -> Defender, "MF"/"MID" -> Midfielder
    /// - "ST"/"FW"/"CF" -> Striker, "GK" -> Goalkeeper
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GK" => Some(Position::Goalkeeper),
            "DF" | "DEF" => Some(Position::Defender),
            "MF" | "MID" => Some(Position::Midfielder),
            "ST" | "FW" | "CF" => Some(Position::Striker),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DF",
            Position::Midfielder => "MF",
            Position::Striker => "ST",
        }
    }

    /// Whether this is the goalkeeper position.
    pub fn is_goalkeeper(&self) -> bool {
        matches!(self, Position::Goalkeeper)
    }

    /// Whether this is an outfield position (anything but GK).
    pub fn is_outfield(&self) -> bool {
        !self.is_goalkeeper()
    }

    /// Deterministic ordering index, back to front (GK first).
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Goalkeeper => 0,
            Position::Defender => 1,
            Position::Midfielder => 2,
            Position::Striker => 3,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Which players a formation slot admits.
///
/// The relaxed rule is the default: a GK slot takes only goalkeepers, any
/// outfield slot takes any outfielder (the player is re-rated at the slot's
/// position). The strict rule requires an exact position match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityRule {
    #[default]
    Relaxed,
    Strict,
}

impl CompatibilityRule {
    /// Whether a player whose natural position is `natural` may occupy a
    /// slot whose required position is `slot`.
    pub fn admits(&self, natural: Position, slot: Position) -> bool {
        match self {
            CompatibilityRule::Relaxed => natural.is_goalkeeper() == slot.is_goalkeeper(),
            CompatibilityRule::Strict => natural == slot,
        }
    }
}
