// Formation catalog: ordered position labels per named formation, grouped
// by roster size.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::position::Position;

/// Roster size class. Each mode restricts which formations are selectable
/// and fixes the slot count of both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "6v6")]
    SixASide,
    #[serde(rename = "9v9")]
    NineASide,
    #[serde(rename = "10v10")]
    TenASide,
    #[serde(rename = "11v11")]
    ElevenASide,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::SixASide,
        Mode::NineASide,
        Mode::TenASide,
        Mode::ElevenASide,
    ];

    /// Number of slots per side in this mode.
    pub fn player_count(&self) -> usize {
        match self {
            Mode::SixASide => 6,
            Mode::NineASide => 9,
            Mode::TenASide => 10,
            Mode::ElevenASide => 11,
        }
    }

    /// Parse a mode string ("11v11", "10v10", "9v9", "6v6").
    pub fn from_str_mode(s: &str) -> Option<Self> {
        match s.trim() {
            "6v6" => Some(Mode::SixASide),
            "9v9" => Some(Mode::NineASide),
            "10v10" => Some(Mode::TenASide),
            "11v11" => Some(Mode::ElevenASide),
            _ => None,
        }
    }

    /// Return the display string for this mode.
    pub fn display_str(&self) -> &'static str {
        match self {
            Mode::SixASide => "6v6",
            Mode::NineASide => "9v9",
            Mode::TenASide => "10v10",
            Mode::ElevenASide => "11v11",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// A named formation: one required position per slot, index-addressed.
/// Slot 0 is the goalkeeper in every catalog entry.
#[derive(Debug, PartialEq, Eq)]
pub struct Formation {
    pub name: &'static str,
    pub positions: &'static [Position],
}

impl Formation {
    /// The required position of a slot. Panics on an out-of-range index;
    /// slot indices come from the formation itself, so that is a caller bug.
    pub fn required(&self, slot: usize) -> Position {
        assert!(
            slot < self.positions.len(),
            "slot {slot} out of range for formation {}",
            self.name
        );
        self.positions[slot]
    }

    pub fn slot_count(&self) -> usize {
        self.positions.len()
    }
}

use Position::{Defender as DF, Goalkeeper as GK, Midfielder as MF, Striker as ST};

/// The full catalog. Within each size group the first entry is the default
/// formation for a freshly selected mode. Slot ordering is part of the
/// contract: spatial layout and closest-slot defaulting key off the index.
pub const FORMATIONS: &[Formation] = &[
    // 11-a-side
    Formation {
        name: "4-4-2",
        positions: &[GK, DF, DF, DF, DF, MF, MF, MF, MF, ST, ST],
    },
    Formation {
        name: "4-3-3",
        positions: &[GK, DF, DF, DF, DF, MF, MF, MF, ST, ST, ST],
    },
    Formation {
        name: "3-5-2",
        positions: &[GK, DF, DF, DF, MF, MF, MF, MF, MF, ST, ST],
    },
    Formation {
        name: "4-5-1",
        positions: &[GK, DF, DF, DF, DF, MF, MF, MF, MF, MF, ST],
    },
    Formation {
        name: "5-3-2",
        positions: &[GK, DF, DF, DF, DF, DF, MF, MF, MF, ST, ST],
    },
    // 10-a-side
    Formation {
        name: "4-3-2",
        positions: &[GK, DF, DF, DF, DF, MF, MF, MF, ST, ST],
    },
    Formation {
        name: "3-4-2",
        positions: &[GK, DF, DF, DF, MF, MF, MF, MF, ST, ST],
    },
    Formation {
        name: "4-4-1",
        positions: &[GK, DF, DF, DF, DF, MF, MF, MF, MF, ST],
    },
    Formation {
        name: "3-3-3",
        positions: &[GK, DF, DF, DF, MF, MF, MF, ST, ST, ST],
    },
    // 9-a-side
    Formation {
        name: "3-3-2",
        positions: &[GK, DF, DF, DF, MF, MF, MF, ST, ST],
    },
    Formation {
        name: "4-2-2",
        positions: &[GK, DF, DF, DF, DF, MF, MF, ST, ST],
    },
    Formation {
        name: "2-4-2",
        positions: &[GK, DF, DF, MF, MF, MF, MF, ST, ST],
    },
    Formation {
        name: "3-2-3",
        positions: &[GK, DF, DF, DF, MF, MF, ST, ST, ST],
    },
    // 6-a-side
    Formation {
        name: "2-2-1",
        positions: &[GK, DF, DF, MF, MF, ST],
    },
    Formation {
        name: "1-2-2",
        positions: &[GK, DF, MF, MF, ST, ST],
    },
    Formation {
        name: "2-1-2",
        positions: &[GK, DF, DF, MF, ST, ST],
    },
];

/// All formations selectable in the given mode, in catalog order.
pub fn formations_for(mode: Mode) -> Vec<&'static Formation> {
    FORMATIONS
        .iter()
        .filter(|f| f.positions.len() == mode.player_count())
        .collect()
}

/// The default formation for a freshly selected mode (first of its group).
pub fn default_formation(mode: Mode) -> &'static Formation {
    formations_for(mode)
        .first()
        .copied()
        .unwrap_or_else(|| panic!("no formations in catalog for mode {mode}"))
}

/// Look up a formation by name within a mode's group.
pub fn by_name(mode: Mode, name: &str) -> Option<&'static Formation> {
    formations_for(mode)
        .into_iter()
        .find(|f| f.name.eq_ignore_ascii_case(name.trim()))
}
