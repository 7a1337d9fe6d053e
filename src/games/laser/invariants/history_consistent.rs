//! History consistency invariant: one history entry per counted move.

use super::super::LaserGame;
use super::Invariant;

/// Invariant: history length equals the engine's move count.
pub struct HistoryConsistentInvariant;

impl Invariant<LaserGame> for HistoryConsistentInvariant {
    fn holds(game: &LaserGame) -> bool {
        game.history().len() == game.engine().move_count() as usize
    }

    fn description() -> &'static str {
        "History length matches the number of completed moves"
    }
}
