// Player records and identity matching.

use serde::{Deserialize, Serialize};

use super::position::Position;
use super::rating;

/// The raw skill attributes behind a player's rating.
///
/// Values are normally in [0, 100] (weak foot 0-50 in curated data) but the
/// range is not enforced; out-of-range values flow into the weighted sum
/// unchanged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub shooting: f64,
    #[serde(default)]
    pub passing: f64,
    #[serde(default)]
    pub dribbling: f64,
    #[serde(default)]
    pub physical: f64,
    #[serde(default)]
    pub defending: f64,
    #[serde(default)]
    pub goalkeeping: f64,
    #[serde(default)]
    pub weak_foot: f64,
}

/// A player record from the roster feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Stable feed ID for deduplication. `None` for rows keyed by name alone.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// The player's natural position as listed in the sheet.
    pub position: Position,
    pub attributes: Attributes,
    /// Derived rating at the natural position. Recomputed, never authored.
    pub overall: i32,
    /// Display photo URL, opaque to the engine.
    #[serde(default)]
    pub photo: Option<String>,
}

impl Player {
    /// Build a player from feed data, deriving `overall` at the natural
    /// position.
    pub fn from_feed(
        id: Option<String>,
        name: String,
        position: Position,
        attributes: Attributes,
        photo: Option<String>,
    ) -> Self {
        let overall = rating::overall(&attributes, position);
        Player {
            id,
            name,
            position,
            attributes,
            overall,
            photo,
        }
    }

    /// Whether two records refer to the same physical player.
    ///
    /// When **both** records carry a feed ID, the ID comparison is
    /// authoritative: different IDs mean different players even when the
    /// names match (historical award snapshots reuse a player's name with a
    /// distinct ID). When either side lacks an ID, falls back to an exact
    /// name comparison.
    pub fn is_same_player(&self, other: &Player) -> bool {
        if let (Some(a), Some(b)) = (&self.id, &other.id) {
            return a == b;
        }
        self.name == other.name
    }
}

/// A player occupying a formation slot.
///
/// Holds a position-adjusted copy of the feed record: `player.overall` is
/// recomputed at `rated_position` (the slot's required position at placement
/// time), leaving the roster-wide record untouched. `rated_position` can
/// drift from the slot's current label after a formation switch; the board
/// surfaces that through `mismatched_slots`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedPlayer {
    pub player: Player,
    /// The position the current `overall` was computed at.
    pub rated_position: Position,
}

impl PlacedPlayer {
    /// Place a copy of `player` rated at `position`.
    pub fn new(player: &Player, position: Position) -> Self {
        let mut player = player.clone();
        player.overall = rating::overall(&player.attributes, position);
        PlacedPlayer {
            player,
            rated_position: position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn striker(name: &str, id: Option<&str>) -> Player {
        Player::from_feed(
            id.map(|s| s.to_string()),
            name.to_string(),
            Position::Striker,
            Attributes {
                speed: 80.0,
                shooting: 80.0,
                passing: 80.0,
                dribbling: 80.0,
                physical: 80.0,
                defending: 80.0,
                goalkeeping: 0.0,
                weak_foot: 30.0,
            },
            None,
        )
    }

    #[test]
    fn from_feed_derives_overall() {
        let p = striker("Eto", None);
        assert_eq!(p.overall, 83);
    }

    #[test]
    fn same_id_matches_regardless_of_name() {
        let a = striker("R. Lewandowski", Some("p9"));
        let b = striker("Lewandowski", Some("p9"));
        assert!(a.is_same_player(&b));
    }

    #[test]
    fn different_ids_do_not_match_even_with_same_name() {
        let a = striker("Eto", Some("p9"));
        let b = striker("Eto", Some("motm-p9-2024-05-11"));
        assert!(!a.is_same_player(&b));
    }

    #[test]
    fn missing_id_falls_back_to_name() {
        let a = striker("Eto", Some("p9"));
        let b = striker("Eto", None);
        assert!(a.is_same_player(&b));
        let c = striker("Drogba", None);
        assert!(!a.is_same_player(&c));
    }

    #[test]
    fn placed_player_is_rerated_at_slot_position() {
        let p = striker("Eto", None);
        let placed = PlacedPlayer::new(&p, Position::Midfielder);
        assert_eq!(placed.rated_position, Position::Midfielder);
        // MF weights over the same attributes: 80*1.05 + 30*.05 = 85.5 -> 86
        assert_eq!(placed.player.overall, 86);
        // natural position and the original record are untouched
        assert_eq!(placed.player.position, Position::Striker);
        assert_eq!(p.overall, 83);
    }
}
