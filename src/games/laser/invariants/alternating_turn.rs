//! Alternating turn invariant: sides alternate A, B, A, B, ...

use super::super::{LaserGame, Side, TurnPhase};
use super::Invariant;

/// Invariant: sides alternate turns, starting with A.
///
/// While the game is running, the side to move is the one the history
/// says is next.
pub struct AlternatingTurnInvariant;

impl Invariant<LaserGame> for AlternatingTurnInvariant {
    fn holds(game: &LaserGame) -> bool {
        let history = game.history();

        if let Some((first, _)) = history.first()
            && *first != Side::A
        {
            return false;
        }

        if history.windows(2).any(|pair| pair[0].0 == pair[1].0) {
            return false;
        }

        let expected_next = if history.len() % 2 == 0 { Side::A } else { Side::B };
        match game.engine().phase() {
            TurnPhase::AwaitingMove(side) => side == expected_next,
            TurnPhase::Resolving(_) => false,
            TurnPhase::GameOver(_) => true,
        }
    }

    fn description() -> &'static str {
        "Sides alternate turns (A, B, A, B, ...)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::laser::{BoardSetup, GameRules, Move};

    #[test]
    fn test_alternating_sequence_holds() {
        let mut game =
            LaserGame::new(BoardSetup::default().build().unwrap(), GameRules::default()).unwrap();
        assert!(AlternatingTurnInvariant::holds(&game));
        for side in [Side::A, Side::B, Side::A] {
            game.apply(side, Move::Fire).unwrap();
            assert!(AlternatingTurnInvariant::holds(&game));
        }
        assert_eq!(game.engine().active(), Some(Side::B));
    }
}
