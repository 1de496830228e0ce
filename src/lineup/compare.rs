// Side comparison: attribute averages over occupied slots.
//
// Goalkeeping and outfield skills are not comparable across position
// classes, so the averaging scope depends on the attribute: goalkeeping
// averages over occupied GK slots only, the six outfield skills over
// occupied outfield slots only, and overall/weak foot over every occupied
// slot. A roster with no slot in scope averages to 0.

use super::board::{LineupBoard, Side};
use super::player::PlacedPlayer;
use super::position::Position;
use super::rating;

/// An averageable column of the comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Speed,
    Shooting,
    Passing,
    Dribbling,
    Physical,
    Defending,
    Goalkeeping,
    WeakFoot,
    Overall,
}

/// Which occupied slots an attribute averages over.
enum Scope {
    GkOnly,
    OutfieldOnly,
    AllSlots,
}

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::Speed,
        Attribute::Shooting,
        Attribute::Passing,
        Attribute::Dribbling,
        Attribute::Physical,
        Attribute::Defending,
        Attribute::Goalkeeping,
        Attribute::WeakFoot,
        Attribute::Overall,
    ];

    pub fn display_str(&self) -> &'static str {
        match self {
            Attribute::Speed => "speed",
            Attribute::Shooting => "shooting",
            Attribute::Passing => "passing",
            Attribute::Dribbling => "dribbling",
            Attribute::Physical => "physical",
            Attribute::Defending => "defending",
            Attribute::Goalkeeping => "goalkeeping",
            Attribute::WeakFoot => "weak foot",
            Attribute::Overall => "overall",
        }
    }

    fn scope(&self) -> Scope {
        match self {
            Attribute::Goalkeeping => Scope::GkOnly,
            Attribute::Overall | Attribute::WeakFoot => Scope::AllSlots,
            _ => Scope::OutfieldOnly,
        }
    }

    fn value_of(&self, placed: &PlacedPlayer) -> f64 {
        let attrs = &placed.player.attributes;
        match self {
            Attribute::Speed => attrs.speed,
            Attribute::Shooting => attrs.shooting,
            Attribute::Passing => attrs.passing,
            Attribute::Dribbling => attrs.dribbling,
            Attribute::Physical => attrs.physical,
            Attribute::Defending => attrs.defending,
            Attribute::Goalkeeping => attrs.goalkeeping,
            Attribute::WeakFoot => attrs.weak_foot,
            Attribute::Overall => placed.player.overall as f64,
        }
    }
}

/// Average one attribute over a side's occupied slots, scoped by position
/// class as described above. Rounded to the nearest integer; 0 when no slot
/// is in scope.
pub fn average_attribute(board: &LineupBoard, side: Side, attr: Attribute) -> i32 {
    let values: Vec<f64> = board
        .slots(side)
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| {
            slot.as_ref()
                .map(|p| (board.required_position(side, i), p))
        })
        .filter(|(slot_pos, _)| match attr.scope() {
            Scope::GkOnly => slot_pos.is_goalkeeper(),
            Scope::OutfieldOnly => slot_pos.is_outfield(),
            Scope::AllSlots => true,
        })
        .map(|(_, p)| rating::sanitize(attr.value_of(p)))
        .collect();
    round_mean(&values)
}

/// Average `overall` over occupied slots whose required (effective)
/// position is `position`. 0 if the side has no such occupant.
pub fn average_by_position(board: &LineupBoard, side: Side, position: Position) -> i32 {
    let values: Vec<f64> = board
        .slots(side)
        .iter()
        .enumerate()
        .filter(|(i, _)| board.required_position(side, *i) == position)
        .filter_map(|(_, slot)| slot.as_ref().map(|p| p.player.overall as f64))
        .collect();
    round_mean(&values)
}

fn round_mean(values: &[f64]) -> i32 {
    if values.is_empty() {
        return 0;
    }
    (values.iter().sum::<f64>() / values.len() as f64).round() as i32
}
