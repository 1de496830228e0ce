// Two-sided lineup board: the placement / swap / removal state machine.
//
// Owns both rosters. Every operation runs synchronously and atomically;
// the presentation layer issues one command per user gesture and reads the
// slot arrays back. The dragged player always arrives as an argument --
// there is no ambient drag state here.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::formation::{self, Formation, Mode};
use super::player::{PlacedPlayer, Player};
use super::position::{CompatibilityRule, Position};

/// Caller contract violations and snapshot-restore failures.
#[derive(Debug, Error)]
pub enum LineupError {
    #[error("formation `{name}` is not in the {mode} catalog")]
    UnknownFormation { name: String, mode: Mode },

    #[error("no player named `{0}` in the feed")]
    UnknownPlayer(String),

    #[error("snapshot team has {got} slots, mode {mode} requires {expected}")]
    SnapshotShape {
        got: usize,
        expected: usize,
        mode: Mode,
    },
}

/// The two sides of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    fn idx(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }

    /// Parse a side label ("a"/"A"/"b"/"B").
    pub fn from_str_side(s: &str) -> Option<Self> {
        match s.trim() {
            "a" | "A" => Some(Side::A),
            "b" | "B" => Some(Side::B),
            _ => None,
        }
    }
}

/// One side's formation and slot array.
#[derive(Debug, Clone)]
struct SideLineup {
    formation: &'static Formation,
    slots: Vec<Option<PlacedPlayer>>,
}

impl SideLineup {
    fn empty(formation: &'static Formation) -> Self {
        SideLineup {
            formation,
            slots: vec![None; formation.slot_count()],
        }
    }
}

/// Serializable snapshot of the whole board, used by the local cache.
/// Restore paths must validate the shape against the declared mode before
/// trusting it (see `LineupBoard::restore`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub formation_a: String,
    pub formation_b: String,
    pub team_a: Vec<Option<PlacedPlayer>>,
    pub team_b: Vec<Option<PlacedPlayer>>,
}

/// One user gesture, dispatched synchronously against the board.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Place {
        side: Side,
        slot: usize,
        player: String,
    },
    Move {
        from_side: Side,
        from_slot: usize,
        to_side: Side,
        to_slot: usize,
    },
    Remove {
        side: Side,
        slot: usize,
    },
    Formation {
        side: Side,
        name: String,
    },
    SetMode {
        mode: Mode,
    },
    Randomize,
    Reset,
}

/// Outcome of a dispatched command: applied, or rejected by the
/// compatibility rule (a rejection is a normal no-op, not an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Done,
    Rejected,
}

#[derive(Debug)]
pub struct LineupBoard {
    mode: Mode,
    rule: CompatibilityRule,
    sides: [SideLineup; 2],
}

impl LineupBoard {
    /// Create an empty board in the given mode, both sides on the mode's
    /// default formation.
    pub fn new(mode: Mode, rule: CompatibilityRule) -> Self {
        let default = formation::default_formation(mode);
        LineupBoard {
            mode,
            rule,
            sides: [SideLineup::empty(default), SideLineup::empty(default)],
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn rule(&self) -> CompatibilityRule {
        self.rule
    }

    pub fn formation(&self, side: Side) -> &'static Formation {
        self.sides[side.idx()].formation
    }

    /// Read-only view of one side's slots, for rendering and aggregation.
    pub fn slots(&self, side: Side) -> &[Option<PlacedPlayer>] {
        &self.sides[side.idx()].slots
    }

    pub fn occupied_count(&self, side: Side) -> usize {
        self.slots(side).iter().filter(|s| s.is_some()).count()
    }

    /// The required position of a slot under the side's active formation.
    /// Panics on an out-of-range index -- that is a presentation-layer bug,
    /// not a runtime condition.
    pub fn required_position(&self, side: Side, slot: usize) -> Position {
        self.sides[side.idx()].formation.required(slot)
    }

    /// Unconditional placement, used for the "pick from the list" flow.
    ///
    /// Rejects position-incompatible players (returns `false`, no state
    /// change). On success any same-side slot already holding the same
    /// player is cleared first, then the slot receives a copy re-rated at
    /// the slot's required position.
    pub fn place(&mut self, side: Side, slot: usize, player: &Player) -> bool {
        let required = self.required_position(side, slot);
        if !self.rule.admits(player.position, required) {
            debug!(
                "rejected placing {} ({}) into {} slot {}",
                player.name, player.position, required, slot
            );
            return false;
        }
        self.scrub_duplicate(side, player, None);
        self.sides[side.idx()].slots[slot] = Some(PlacedPlayer::new(player, required));
        true
    }

    /// Drag-and-drop move between two slots (possibly across sides).
    ///
    /// Dropping a card back onto its own slot is a no-op. When the
    /// destination is occupied the two players swap, each re-rated at its
    /// new slot's required position. When it is empty, placement semantics
    /// apply (origin cleared, destination-side duplicates scrubbed).
    pub fn move_or_swap(
        &mut self,
        from_side: Side,
        from_slot: usize,
        to_side: Side,
        to_slot: usize,
    ) -> bool {
        let from_required = self.required_position(from_side, from_slot);
        let to_required = self.required_position(to_side, to_slot);

        if from_side == to_side && from_slot == to_slot {
            return true;
        }

        let Some(moved) = self.sides[from_side.idx()].slots[from_slot].clone() else {
            warn!(
                "drag from empty slot {} on side {}",
                from_slot,
                from_side.label()
            );
            return false;
        };

        if !self.rule.admits(moved.player.position, to_required) {
            debug!(
                "rejected moving {} ({}) into {} slot {}",
                moved.player.name, moved.player.position, to_required, to_slot
            );
            return false;
        }

        match self.sides[to_side.idx()].slots[to_slot].clone() {
            Some(occupant) => {
                // True swap. The bumped occupant must fit the origin slot
                // too (only the strict rule can fail here: relaxed keeps GK
                // and outfield slots closed under swapping).
                if !self.rule.admits(occupant.player.position, from_required) {
                    debug!(
                        "rejected swap: {} ({}) does not fit {} slot {}",
                        occupant.player.name, occupant.player.position, from_required, from_slot
                    );
                    return false;
                }
                self.sides[to_side.idx()].slots[to_slot] =
                    Some(PlacedPlayer::new(&moved.player, to_required));
                self.sides[from_side.idx()].slots[from_slot] =
                    Some(PlacedPlayer::new(&occupant.player, from_required));
                // A cross-side swap can land a player on a side that already
                // holds them elsewhere; keep the per-side uniqueness invariant.
                self.scrub_duplicate(to_side, &moved.player, Some(to_slot));
                self.scrub_duplicate(from_side, &occupant.player, Some(from_slot));
            }
            None => {
                self.sides[from_side.idx()].slots[from_slot] = None;
                self.scrub_duplicate(to_side, &moved.player, None);
                self.sides[to_side.idx()].slots[to_slot] =
                    Some(PlacedPlayer::new(&moved.player, to_required));
            }
        }
        true
    }

    /// Clear exactly one slot, returning what it held. No other side effects.
    pub fn remove(&mut self, side: Side, slot: usize) -> Option<PlacedPlayer> {
        // Validate the index even when the slot is empty.
        let _ = self.required_position(side, slot);
        self.sides[side.idx()].slots[slot].take()
    }

    /// Switch a side's formation within the current mode's group.
    ///
    /// Occupants stay in place even when their rating position no longer
    /// matches the new slot labels; `mismatched_slots` reports the drift so
    /// the presentation can mark them.
    pub fn change_formation(&mut self, side: Side, name: &str) -> Result<(), LineupError> {
        let f = formation::by_name(self.mode, name).ok_or_else(|| LineupError::UnknownFormation {
            name: name.to_string(),
            mode: self.mode,
        })?;
        self.sides[side.idx()].formation = f;
        Ok(())
    }

    /// Destructive mode switch: both sides reset to empty rosters of the new
    /// size on the group's default formation. Any confirmation step is a
    /// presentation concern.
    pub fn change_mode(&mut self, mode: Mode) {
        let default = formation::default_formation(mode);
        self.mode = mode;
        self.sides = [SideLineup::empty(default), SideLineup::empty(default)];
    }

    /// Clear both rosters, keeping mode and formations.
    pub fn reset(&mut self) {
        for side in &mut self.sides {
            for slot in &mut side.slots {
                *slot = None;
            }
        }
    }

    /// Greedy auto-fill from the player pool.
    ///
    /// Proceeds slot by slot, alternating sides (A0, B0, A1, B1, ...).
    /// Each slot takes the highest-overall unassigned player whose natural
    /// position matches; if none remains, the highest-overall unassigned
    /// player on the right side of the GK/outfield split. A player chosen
    /// for either side is consumed globally, so the two rosters never share
    /// a player. Slots with no eligible candidate stay empty.
    pub fn randomize(&mut self, pool: &[Player]) {
        self.reset();
        let mut used: Vec<&Player> = Vec::new();

        for slot in 0..self.mode.player_count() {
            for side in Side::BOTH {
                let required = self.required_position(side, slot);
                let exact = Self::best_candidate(pool, &used, |p| p.position == required);
                let pick = exact.or_else(|| {
                    Self::best_candidate(pool, &used, |p| {
                        p.position.is_goalkeeper() == required.is_goalkeeper()
                    })
                });
                match pick {
                    Some(player) => {
                        used.push(player);
                        self.sides[side.idx()].slots[slot] =
                            Some(PlacedPlayer::new(player, required));
                    }
                    None => {
                        debug!(
                            "no candidate left for {} slot {} on side {}",
                            required,
                            slot,
                            side.label()
                        );
                    }
                }
            }
        }
    }

    /// Highest-overall pool entry not yet used (by identity) that satisfies
    /// the predicate. Ties break arbitrarily.
    fn best_candidate<'p>(
        pool: &'p [Player],
        used: &[&Player],
        pred: impl Fn(&Player) -> bool,
    ) -> Option<&'p Player> {
        pool.iter()
            .filter(|p| !used.iter().any(|u| u.is_same_player(p)))
            .filter(|p| pred(p))
            .max_by_key(|p| p.overall)
    }

    /// Slot indices whose occupant's rating position no longer matches the
    /// slot's required position (possible after a formation switch).
    pub fn mismatched_slots(&self, side: Side) -> Vec<usize> {
        let lineup = &self.sides[side.idx()];
        lineup
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.as_ref()
                    .filter(|p| p.rated_position != lineup.formation.required(i))
                    .map(|_| i)
            })
            .collect()
    }

    /// Clear any same-side slot (other than `keep`) holding the same player.
    fn scrub_duplicate(&mut self, side: Side, player: &Player, keep: Option<usize>) {
        for (i, slot) in self.sides[side.idx()].slots.iter_mut().enumerate() {
            if Some(i) == keep {
                continue;
            }
            if slot.as_ref().is_some_and(|p| p.player.is_same_player(player)) {
                *slot = None;
            }
        }
    }

    // -- Snapshot / restore --

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode,
            formation_a: self.sides[0].formation.name.to_string(),
            formation_b: self.sides[1].formation.name.to_string(),
            team_a: self.sides[0].slots.clone(),
            team_b: self.sides[1].slots.clone(),
        }
    }

    /// Rebuild a board from a cached snapshot.
    ///
    /// The snapshot is untrusted: formation names must exist in the declared
    /// mode's catalog group and both team arrays must match the mode's slot
    /// count, otherwise the caller should fall back to a fresh board.
    pub fn restore(snapshot: &Snapshot, rule: CompatibilityRule) -> Result<Self, LineupError> {
        let mode = snapshot.mode;
        let expected = mode.player_count();
        for team in [&snapshot.team_a, &snapshot.team_b] {
            if team.len() != expected {
                return Err(LineupError::SnapshotShape {
                    got: team.len(),
                    expected,
                    mode,
                });
            }
        }
        let formation_a =
            formation::by_name(mode, &snapshot.formation_a).ok_or_else(|| {
                LineupError::UnknownFormation {
                    name: snapshot.formation_a.clone(),
                    mode,
                }
            })?;
        let formation_b =
            formation::by_name(mode, &snapshot.formation_b).ok_or_else(|| {
                LineupError::UnknownFormation {
                    name: snapshot.formation_b.clone(),
                    mode,
                }
            })?;
        Ok(LineupBoard {
            mode,
            rule,
            sides: [
                SideLineup {
                    formation: formation_a,
                    slots: snapshot.team_a.clone(),
                },
                SideLineup {
                    formation: formation_b,
                    slots: snapshot.team_b.clone(),
                },
            ],
        })
    }

    // -- Command dispatch --

    /// Single synchronous entry point: apply one user gesture.
    ///
    /// `pool` resolves player names for `Place` and feeds `Randomize`.
    /// Contract violations (unknown player/formation) come back as errors;
    /// compatibility rejections come back as `Applied::Rejected`.
    pub fn apply(&mut self, command: &Command, pool: &[Player]) -> Result<Applied, LineupError> {
        match command {
            Command::Place { side, slot, player } => {
                let record = pool
                    .iter()
                    .find(|p| p.name.eq_ignore_ascii_case(player))
                    .ok_or_else(|| LineupError::UnknownPlayer(player.clone()))?;
                Ok(applied(self.place(*side, *slot, record)))
            }
            Command::Move {
                from_side,
                from_slot,
                to_side,
                to_slot,
            } => Ok(applied(self.move_or_swap(
                *from_side, *from_slot, *to_side, *to_slot,
            ))),
            Command::Remove { side, slot } => {
                self.remove(*side, *slot);
                Ok(Applied::Done)
            }
            Command::Formation { side, name } => {
                self.change_formation(*side, name)?;
                Ok(Applied::Done)
            }
            Command::SetMode { mode } => {
                self.change_mode(*mode);
                Ok(Applied::Done)
            }
            Command::Randomize => {
                self.randomize(pool);
                Ok(Applied::Done)
            }
            Command::Reset => {
                self.reset();
                Ok(Applied::Done)
            }
        }
    }
}

fn applied(ok: bool) -> Applied {
    if ok {
        Applied::Done
    } else {
        Applied::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup::player::Attributes;

    /// Flat-attribute player: every skill = `base`, weak foot 30,
    /// goalkeeping only for keepers.
    fn skilled(name: &str, position: Position, base: f64) -> Player {
        Player::from_feed(
            None,
            name.to_string(),
            position,
            Attributes {
                speed: base,
                shooting: base,
                passing: base,
                dribbling: base,
                physical: base,
                defending: base,
                goalkeeping: if position.is_goalkeeper() { base } else { 0.0 },
                weak_foot: 30.0,
            },
            None,
        )
    }

    fn with_id(mut player: Player, id: &str) -> Player {
        player.id = Some(id.to_string());
        player
    }

    /// Fresh 11-a-side board on 4-4-2 (slot 0 GK, 1-4 DF, 5-8 MF, 9-10 ST).
    fn board() -> LineupBoard {
        LineupBoard::new(Mode::ElevenASide, CompatibilityRule::Relaxed)
    }

    #[test]
    fn new_board_is_empty_on_default_formation() {
        let b = board();
        for side in Side::BOTH {
            assert_eq!(b.formation(side).name, "4-4-2");
            assert_eq!(b.slots(side).len(), 11);
            assert_eq!(b.occupied_count(side), 0);
        }
    }

    #[test]
    fn place_into_matching_slot() {
        let mut b = board();
        let st = skilled("Eto", Position::Striker, 80.0);
        assert!(b.place(Side::A, 9, &st));
        let placed = b.slots(Side::A)[9].as_ref().unwrap();
        assert_eq!(placed.player.name, "Eto");
        assert_eq!(placed.rated_position, Position::Striker);
        assert_eq!(placed.player.overall, 83);
    }

    #[test]
    fn place_cross_position_rerates() {
        let mut b = board();
        let st = skilled("Eto", Position::Striker, 80.0);
        // natural ST dropped into an MF slot: allowed, re-weighted
        assert!(b.place(Side::A, 5, &st));
        let placed = b.slots(Side::A)[5].as_ref().unwrap();
        assert_eq!(placed.rated_position, Position::Midfielder);
        assert_eq!(placed.player.overall, 86);
        assert_eq!(placed.player.position, Position::Striker);
    }

    #[test]
    fn place_rejects_across_the_gk_split() {
        let mut b = board();
        let gk = skilled("Buffon", Position::Goalkeeper, 85.0);
        let st = skilled("Eto", Position::Striker, 80.0);
        assert!(!b.place(Side::A, 3, &gk), "GK into a DF slot");
        assert!(!b.place(Side::A, 0, &st), "ST into the GK slot");
        assert_eq!(b.occupied_count(Side::A), 0);
    }

    #[test]
    fn strict_rule_rejects_cross_outfield_placement() {
        let mut b = LineupBoard::new(Mode::ElevenASide, CompatibilityRule::Strict);
        let st = skilled("Eto", Position::Striker, 80.0);
        assert!(!b.place(Side::A, 5, &st), "ST into MF slot under strict");
        assert!(b.place(Side::A, 9, &st));
    }

    #[test]
    fn place_scrubs_same_side_duplicate() {
        let mut b = board();
        let st = skilled("Eto", Position::Striker, 80.0);
        assert!(b.place(Side::A, 9, &st));
        assert!(b.place(Side::A, 10, &st));
        assert!(b.slots(Side::A)[9].is_none(), "old copy should be scrubbed");
        assert!(b.slots(Side::A)[10].is_some());
        assert_eq!(b.occupied_count(Side::A), 1);
    }

    #[test]
    fn duplicate_allowed_across_sides_via_place() {
        let mut b = board();
        let st = skilled("Eto", Position::Striker, 80.0);
        assert!(b.place(Side::A, 9, &st));
        assert!(b.place(Side::B, 9, &st));
        assert_eq!(b.occupied_count(Side::A), 1);
        assert_eq!(b.occupied_count(Side::B), 1);
    }

    #[test]
    fn duplicate_scrub_uses_id_when_both_present() {
        let mut b = board();
        let base = with_id(skilled("Eto", Position::Striker, 80.0), "p9");
        let motm = with_id(skilled("Eto", Position::Striker, 92.0), "motm-p9");
        assert!(b.place(Side::A, 9, &base));
        // distinct id: same name is NOT a duplicate
        assert!(b.place(Side::A, 10, &motm));
        assert_eq!(b.occupied_count(Side::A), 2);
    }

    #[test]
    fn move_to_empty_slot_clears_origin() {
        let mut b = board();
        let st = skilled("Eto", Position::Striker, 80.0);
        assert!(b.place(Side::A, 9, &st));
        assert!(b.move_or_swap(Side::A, 9, Side::A, 5));
        assert!(b.slots(Side::A)[9].is_none());
        let moved = b.slots(Side::A)[5].as_ref().unwrap();
        assert_eq!(moved.rated_position, Position::Midfielder);
        assert_eq!(moved.player.overall, 86);
    }

    #[test]
    fn move_to_empty_slot_cross_side_scrubs_destination_duplicate() {
        let mut b = board();
        let st = skilled("Eto", Position::Striker, 80.0);
        assert!(b.place(Side::A, 9, &st));
        assert!(b.place(Side::B, 10, &st));
        // dragging A's copy onto B's empty ST slot removes B's other copy
        assert!(b.move_or_swap(Side::A, 9, Side::B, 9));
        assert!(b.slots(Side::A)[9].is_none());
        assert!(b.slots(Side::B)[10].is_none());
        assert!(b.slots(Side::B)[9].is_some());
        assert_eq!(b.occupied_count(Side::B), 1);
    }

    #[test]
    fn swap_exchanges_and_rerates_both() {
        let mut b = board();
        let st = skilled("Eto", Position::Striker, 80.0);
        let df = skilled("Puyol", Position::Defender, 75.0);
        assert!(b.place(Side::A, 9, &st));
        assert!(b.place(Side::B, 1, &df));
        let before = b.occupied_count(Side::A) + b.occupied_count(Side::B);

        assert!(b.move_or_swap(Side::A, 9, Side::B, 1));

        let a_slot = b.slots(Side::A)[9].as_ref().unwrap();
        let b_slot = b.slots(Side::B)[1].as_ref().unwrap();
        assert_eq!(b_slot.player.name, "Eto");
        assert_eq!(b_slot.rated_position, Position::Defender);
        assert_eq!(a_slot.player.name, "Puyol");
        assert_eq!(a_slot.rated_position, Position::Striker);
        assert_eq!(
            b.occupied_count(Side::A) + b.occupied_count(Side::B),
            before,
            "swap must not change the occupied count"
        );
    }

    #[test]
    fn swap_within_one_side() {
        let mut b = board();
        let eto = skilled("Eto", Position::Striker, 80.0);
        let drogba = skilled("Drogba", Position::Striker, 78.0);
        assert!(b.place(Side::A, 9, &eto));
        assert!(b.place(Side::A, 5, &drogba));
        assert!(b.move_or_swap(Side::A, 9, Side::A, 5));
        assert_eq!(b.slots(Side::A)[5].as_ref().unwrap().player.name, "Eto");
        assert_eq!(b.slots(Side::A)[9].as_ref().unwrap().player.name, "Drogba");
        assert_eq!(b.occupied_count(Side::A), 2);
    }

    #[test]
    fn drop_onto_own_slot_is_a_noop() {
        let mut b = board();
        let st = skilled("Eto", Position::Striker, 80.0);
        assert!(b.place(Side::A, 9, &st));
        assert!(b.move_or_swap(Side::A, 9, Side::A, 9));
        assert_eq!(b.slots(Side::A)[9].as_ref().unwrap().player.name, "Eto");
    }

    #[test]
    fn move_from_empty_slot_is_rejected() {
        let mut b = board();
        assert!(!b.move_or_swap(Side::A, 5, Side::A, 6));
    }

    #[test]
    fn move_rejects_incompatible_destination() {
        let mut b = board();
        let gk = skilled("Buffon", Position::Goalkeeper, 85.0);
        assert!(b.place(Side::A, 0, &gk));
        assert!(!b.move_or_swap(Side::A, 0, Side::A, 5), "GK into MF slot");
        assert!(b.slots(Side::A)[0].is_some());
    }

    #[test]
    fn strict_swap_checks_both_directions() {
        let mut b = LineupBoard::new(Mode::ElevenASide, CompatibilityRule::Strict);
        let st = skilled("Eto", Position::Striker, 80.0);
        let mf = skilled("Xavi", Position::Midfielder, 82.0);
        assert!(b.place(Side::A, 9, &st));
        assert!(b.place(Side::A, 5, &mf));
        // Eto (ST) cannot take the MF slot under strict, even by swap
        assert!(!b.move_or_swap(Side::A, 9, Side::A, 5));
        assert_eq!(b.slots(Side::A)[9].as_ref().unwrap().player.name, "Eto");
        assert_eq!(b.slots(Side::A)[5].as_ref().unwrap().player.name, "Xavi");
    }

    #[test]
    fn remove_clears_exactly_one_slot() {
        let mut b = board();
        let st = skilled("Eto", Position::Striker, 80.0);
        let df = skilled("Puyol", Position::Defender, 75.0);
        assert!(b.place(Side::A, 9, &st));
        assert!(b.place(Side::A, 1, &df));
        let removed = b.remove(Side::A, 9);
        assert_eq!(removed.unwrap().player.name, "Eto");
        assert!(b.slots(Side::A)[9].is_none());
        assert!(b.slots(Side::A)[1].is_some());
        assert!(b.remove(Side::A, 9).is_none());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_slot_panics() {
        let mut b = board();
        let st = skilled("Eto", Position::Striker, 80.0);
        b.place(Side::A, 11, &st);
    }

    #[test]
    fn change_formation_keeps_occupants() {
        let mut b = board();
        let st = skilled("Eto", Position::Striker, 80.0);
        assert!(b.place(Side::A, 9, &st)); // ST slot in 4-4-2
        b.change_formation(Side::A, "4-5-1").unwrap();
        // slot 9 is now MF; the occupant stays, rated at ST
        let placed = b.slots(Side::A)[9].as_ref().unwrap();
        assert_eq!(placed.rated_position, Position::Striker);
        assert_eq!(b.mismatched_slots(Side::A), vec![9]);
        assert!(b.mismatched_slots(Side::B).is_empty());
    }

    #[test]
    fn change_formation_rejects_names_outside_the_mode() {
        let mut b = board();
        let err = b.change_formation(Side::A, "2-2-1").unwrap_err();
        assert!(matches!(err, LineupError::UnknownFormation { .. }));
        assert_eq!(b.formation(Side::A).name, "4-4-2");
    }

    #[test]
    fn change_mode_resets_everything() {
        let mut b = board();
        let st = skilled("Eto", Position::Striker, 80.0);
        assert!(b.place(Side::A, 9, &st));
        b.change_formation(Side::B, "4-3-3").unwrap();

        b.change_mode(Mode::NineASide);

        assert_eq!(b.mode(), Mode::NineASide);
        for side in Side::BOTH {
            assert_eq!(b.formation(side).name, "3-3-2");
            assert_eq!(b.slots(side).len(), 9);
            assert_eq!(b.occupied_count(side), 0);
        }
    }

    #[test]
    fn reset_keeps_mode_and_formations() {
        let mut b = board();
        b.change_formation(Side::A, "4-3-3").unwrap();
        let st = skilled("Eto", Position::Striker, 80.0);
        assert!(b.place(Side::A, 9, &st));
        b.reset();
        assert_eq!(b.formation(Side::A).name, "4-3-3");
        assert_eq!(b.occupied_count(Side::A), 0);
    }

    fn big_pool() -> Vec<Player> {
        let mut pool = Vec::new();
        for i in 0..4 {
            pool.push(skilled(
                &format!("GK {i}"),
                Position::Goalkeeper,
                70.0 + i as f64,
            ));
        }
        for i in 0..10 {
            pool.push(skilled(
                &format!("DF {i}"),
                Position::Defender,
                60.0 + i as f64,
            ));
        }
        for i in 0..10 {
            pool.push(skilled(
                &format!("MF {i}"),
                Position::Midfielder,
                60.0 + i as f64,
            ));
        }
        for i in 0..6 {
            pool.push(skilled(
                &format!("ST {i}"),
                Position::Striker,
                60.0 + i as f64,
            ));
        }
        pool
    }

    #[test]
    fn randomize_fills_both_sides_disjointly() {
        let mut b = board();
        b.randomize(&big_pool());
        let mut seen: Vec<String> = Vec::new();
        for side in Side::BOTH {
            assert_eq!(b.occupied_count(side), 11);
            for slot in b.slots(side).iter().flatten() {
                assert!(
                    !seen.contains(&slot.player.name),
                    "{} assigned twice",
                    slot.player.name
                );
                seen.push(slot.player.name.clone());
            }
        }
    }

    #[test]
    fn randomize_interleaves_best_picks() {
        let mut b = board();
        b.randomize(&big_pool());
        // A gets first pick at every slot index: best GK to A, second to B
        assert_eq!(b.slots(Side::A)[0].as_ref().unwrap().player.name, "GK 3");
        assert_eq!(b.slots(Side::B)[0].as_ref().unwrap().player.name, "GK 2");
    }

    #[test]
    fn randomize_falls_back_within_the_outfield() {
        // 4-4-2 needs 4 ST across both sides but the pool has only 2;
        // the remaining ST slots take the best leftover outfielders.
        let mut pool = Vec::new();
        for i in 0..2 {
            pool.push(skilled(&format!("GK {i}"), Position::Goalkeeper, 70.0));
        }
        for i in 0..14 {
            pool.push(skilled(&format!("DF {i}"), Position::Defender, 60.0 + i as f64));
        }
        for i in 0..4 {
            pool.push(skilled(&format!("MF {i}"), Position::Midfielder, 60.0));
        }
        pool.push(skilled("ST 0", Position::Striker, 65.0));
        pool.push(skilled("ST 1", Position::Striker, 64.0));

        let mut b = board();
        b.randomize(&pool);
        for side in Side::BOTH {
            for (i, slot) in b.slots(side).iter().enumerate() {
                let placed = slot.as_ref().unwrap_or_else(|| panic!("slot {i} empty"));
                assert_eq!(
                    placed.player.position.is_goalkeeper(),
                    b.required_position(side, i).is_goalkeeper(),
                    "fallback must respect the GK/outfield split"
                );
            }
        }
    }

    #[test]
    fn randomize_leaves_unfillable_slots_empty() {
        let pool = vec![skilled("Only GK", Position::Goalkeeper, 70.0)];
        let mut b = board();
        b.randomize(&pool);
        assert_eq!(b.occupied_count(Side::A), 1);
        assert_eq!(b.occupied_count(Side::B), 0);
        assert!(b.slots(Side::A)[0].is_some());
    }

    #[test]
    fn randomize_on_empty_pool_is_fine() {
        let mut b = board();
        b.randomize(&[]);
        assert_eq!(b.occupied_count(Side::A), 0);
        assert_eq!(b.occupied_count(Side::B), 0);
    }

    #[test]
    fn snapshot_roundtrip() {
        let mut b = board();
        b.change_formation(Side::B, "4-3-3").unwrap();
        let st = skilled("Eto", Position::Striker, 80.0);
        assert!(b.place(Side::A, 9, &st));

        let snap = b.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        let restored = LineupBoard::restore(&parsed, CompatibilityRule::Relaxed).unwrap();

        assert_eq!(restored.mode(), Mode::ElevenASide);
        assert_eq!(restored.formation(Side::A).name, "4-4-2");
        assert_eq!(restored.formation(Side::B).name, "4-3-3");
        assert_eq!(
            restored.slots(Side::A)[9].as_ref().unwrap().player.name,
            "Eto"
        );
    }

    #[test]
    fn restore_rejects_wrong_team_length() {
        let mut snap = board().snapshot();
        snap.team_a.pop();
        let err = LineupBoard::restore(&snap, CompatibilityRule::Relaxed).unwrap_err();
        assert!(matches!(err, LineupError::SnapshotShape { got: 10, .. }));
    }

    #[test]
    fn restore_rejects_foreign_formation() {
        let mut snap = board().snapshot();
        snap.formation_b = "2-2-1".to_string(); // a 6v6 formation
        let err = LineupBoard::restore(&snap, CompatibilityRule::Relaxed).unwrap_err();
        assert!(matches!(err, LineupError::UnknownFormation { .. }));
    }

    #[test]
    fn apply_place_resolves_names_case_insensitively() {
        let mut b = board();
        let pool = vec![skilled("Eto", Position::Striker, 80.0)];
        let done = b
            .apply(
                &Command::Place {
                    side: Side::A,
                    slot: 9,
                    player: "eto".to_string(),
                },
                &pool,
            )
            .unwrap();
        assert_eq!(done, Applied::Done);
        assert!(b.slots(Side::A)[9].is_some());
    }

    #[test]
    fn apply_reports_unknown_player() {
        let mut b = board();
        let err = b
            .apply(
                &Command::Place {
                    side: Side::A,
                    slot: 9,
                    player: "Nobody".to_string(),
                },
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, LineupError::UnknownPlayer(_)));
    }

    #[test]
    fn apply_surfaces_rejections() {
        let mut b = board();
        let pool = vec![skilled("Buffon", Position::Goalkeeper, 85.0)];
        let outcome = b
            .apply(
                &Command::Place {
                    side: Side::A,
                    slot: 5,
                    player: "Buffon".to_string(),
                },
                &pool,
            )
            .unwrap();
        assert_eq!(outcome, Applied::Rejected);
    }
}
