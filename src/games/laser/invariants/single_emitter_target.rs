//! Each side keeps exactly one emitter and one target for the whole match.

use super::super::{LaserGame, layout};
use super::Invariant;

/// Invariant: exactly one emitter and one target per side.
pub struct SingleEmitterTargetInvariant;

impl Invariant<LaserGame> for SingleEmitterTargetInvariant {
    fn holds(game: &LaserGame) -> bool {
        layout::validate(game.board()).is_ok()
    }

    fn description() -> &'static str {
        "Each side has exactly one emitter and one target"
    }
}
