//! Turn engine: the explicit state machine for whose move it is.
//!
//! Every transition is guarded. A rejected transition leaves the engine
//! exactly as it was.

use super::action::MoveError;
use super::tracer::Outcome;
use super::types::Side;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Phase of the turn engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for the given side to move.
    AwaitingMove(Side),
    /// A fire action by the given side is being traced.
    Resolving(Side),
    /// No further moves are accepted. `None` is a draw.
    GameOver(Option<Side>),
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnPhase::AwaitingMove(side) => write!(f, "Side {} to move", side),
            TurnPhase::Resolving(side) => write!(f, "Resolving side {}'s shot", side),
            TurnPhase::GameOver(Some(side)) => write!(f, "Game over. Side {} wins!", side),
            TurnPhase::GameOver(None) => write!(f, "Game over. Draw!"),
        }
    }
}

/// Guarded state machine over [`TurnPhase`] with a move counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEngine {
    phase: TurnPhase,
    move_count: u32,
    max_moves: Option<u32>,
}

impl TurnEngine {
    /// Creates an engine waiting on side A.
    #[instrument]
    pub fn new(max_moves: Option<u32>) -> Self {
        Self {
            phase: TurnPhase::AwaitingMove(Side::A),
            move_count: 0,
            max_moves,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Number of completed moves.
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Side to move, if the engine is awaiting a move.
    pub fn active(&self) -> Option<Side> {
        match self.phase {
            TurnPhase::AwaitingMove(side) => Some(side),
            _ => None,
        }
    }

    /// Whether the engine is in its terminal phase.
    pub fn is_over(&self) -> bool {
        matches!(self.phase, TurnPhase::GameOver(_))
    }

    /// Winner, if the game ended with one.
    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            TurnPhase::GameOver(winner) => winner,
            _ => None,
        }
    }

    /// Checks that `side` may submit a move now.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn check_turn(&self, side: Side) -> Result<(), MoveError> {
        match self.phase {
            TurnPhase::AwaitingMove(active) if active == side => Ok(()),
            TurnPhase::AwaitingMove(_) | TurnPhase::Resolving(_) => {
                warn!(%side, "Move submitted out of turn");
                Err(MoveError::NotYourTurn(side))
            }
            TurnPhase::GameOver(_) => Err(MoveError::GameAlreadyOver),
        }
    }

    /// Completes a non-firing move by `side`; the turn passes.
    #[instrument(skip(self))]
    pub fn complete_move(&mut self, side: Side) -> Result<(), MoveError> {
        self.check_turn(side)?;
        self.pass_turn(side);
        Ok(())
    }

    /// Enters `Resolving` for a fire action by `side`.
    #[instrument(skip(self))]
    pub fn begin_fire(&mut self, side: Side) -> Result<(), MoveError> {
        self.check_turn(side)?;
        self.phase = TurnPhase::Resolving(side);
        debug!(%side, "Resolving fire");
        Ok(())
    }

    /// Leaves `Resolving` with the tracer's outcome.
    ///
    /// A hit ends the game for the firer; any other outcome passes the turn.
    #[instrument(skip(self))]
    pub fn resolve(&mut self, outcome: &Outcome) -> Result<TurnPhase, MoveError> {
        let firer = match self.phase {
            TurnPhase::Resolving(side) => side,
            TurnPhase::GameOver(_) => return Err(MoveError::GameAlreadyOver),
            TurnPhase::AwaitingMove(side) => return Err(MoveError::NotYourTurn(side)),
        };
        self.move_count += 1;
        if outcome.is_hit() {
            self.phase = TurnPhase::GameOver(Some(firer));
            info!(winner = %firer, moves = self.move_count, "Game over");
        } else {
            self.phase = TurnPhase::AwaitingMove(firer.opponent());
            self.check_move_limit();
        }
        Ok(self.phase)
    }

    /// Ends the game in favour of the opponent of `side`.
    #[instrument(skip(self))]
    pub fn forfeit(&mut self, side: Side) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::GameAlreadyOver);
        }
        self.phase = TurnPhase::GameOver(Some(side.opponent()));
        info!(%side, winner = %side.opponent(), "Side forfeited");
        Ok(())
    }

    fn pass_turn(&mut self, side: Side) {
        self.move_count += 1;
        self.phase = TurnPhase::AwaitingMove(side.opponent());
        debug!(moves = self.move_count, next = %side.opponent(), "Turn passed");
        self.check_move_limit();
    }

    fn check_move_limit(&mut self) {
        if let Some(limit) = self.max_moves
            && self.move_count >= limit
        {
            self.phase = TurnPhase::GameOver(None);
            info!(limit, "Move limit reached, game drawn");
        }
    }
}

impl Default for TurnEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::laser::types::Cell;

    #[test]
    fn test_starts_with_a() {
        let engine = TurnEngine::default();
        assert_eq!(engine.phase(), TurnPhase::AwaitingMove(Side::A));
        assert_eq!(engine.move_count(), 0);
    }

    #[test]
    fn test_moves_alternate() {
        let mut engine = TurnEngine::default();
        engine.complete_move(Side::A).unwrap();
        assert_eq!(engine.active(), Some(Side::B));
        engine.complete_move(Side::B).unwrap();
        assert_eq!(engine.active(), Some(Side::A));
        assert_eq!(engine.move_count(), 2);
    }

    #[test]
    fn test_wrong_side_rejected_without_change() {
        let mut engine = TurnEngine::default();
        let before = engine.clone();
        assert_eq!(engine.complete_move(Side::B), Err(MoveError::NotYourTurn(Side::B)));
        assert_eq!(engine.begin_fire(Side::B), Err(MoveError::NotYourTurn(Side::B)));
        assert_eq!(engine, before);
    }

    #[test]
    fn test_moves_rejected_while_resolving() {
        let mut engine = TurnEngine::default();
        engine.begin_fire(Side::A).unwrap();
        assert_eq!(engine.complete_move(Side::A), Err(MoveError::NotYourTurn(Side::A)));
        assert_eq!(engine.complete_move(Side::B), Err(MoveError::NotYourTurn(Side::B)));
    }

    #[test]
    fn test_hit_ends_game() {
        let mut engine = TurnEngine::default();
        engine.begin_fire(Side::A).unwrap();
        let phase = engine.resolve(&Outcome::Hit(Cell::new(7, 0), Side::B)).unwrap();
        assert_eq!(phase, TurnPhase::GameOver(Some(Side::A)));
        assert_eq!(engine.complete_move(Side::B), Err(MoveError::GameAlreadyOver));
        assert_eq!(engine.forfeit(Side::B), Err(MoveError::GameAlreadyOver));
    }

    #[test]
    fn test_miss_passes_turn() {
        let mut engine = TurnEngine::default();
        engine.begin_fire(Side::A).unwrap();
        for outcome in [Outcome::ExitedBoard, Outcome::Loop] {
            let phase = engine.resolve(&outcome).unwrap();
            let next = engine.active().unwrap();
            assert_eq!(phase, TurnPhase::AwaitingMove(next));
            engine.begin_fire(next).unwrap();
        }
    }

    #[test]
    fn test_resolve_requires_resolving() {
        let mut engine = TurnEngine::default();
        assert!(engine.resolve(&Outcome::ExitedBoard).is_err());
        assert_eq!(engine.move_count(), 0);
    }

    #[test]
    fn test_move_limit_draws() {
        let mut engine = TurnEngine::new(Some(2));
        engine.complete_move(Side::A).unwrap();
        engine.complete_move(Side::B).unwrap();
        assert_eq!(engine.phase(), TurnPhase::GameOver(None));
        assert_eq!(engine.winner(), None);
    }

    #[test]
    fn test_forfeit() {
        let mut engine = TurnEngine::default();
        engine.forfeit(Side::A).unwrap();
        assert_eq!(engine.winner(), Some(Side::B));
    }
}
