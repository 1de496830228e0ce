// Lineup engine: ratings, the formation catalog, the two-sided board state
// machine, and side comparison.

pub mod board;
pub mod compare;
pub mod formation;
pub mod player;
pub mod position;
pub mod rating;

pub use board::{Applied, Command, LineupBoard, LineupError, Side, Snapshot};
pub use formation::Mode;
pub use player::{Attributes, PlacedPlayer, Player};
pub use position::{CompatibilityRule, Position};
