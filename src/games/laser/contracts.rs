//! Contract-based validation for laser game moves.
//!
//! Preconditions are checked before anything is applied; postconditions
//! re-check the game invariants after an accepted move in debug builds.

use super::action::{Move, MoveError};
use super::board::BoardError;
use super::game::LaserGame;
use super::invariants::{InvariantSet, LaserInvariants};
use super::types::Side;
use tracing::{instrument, warn};

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

/// Precondition: the game has not ended.
pub struct GameNotOver;

impl GameNotOver {
    /// Fails with [`MoveError::GameAlreadyOver`] once the engine is terminal.
    pub fn check(game: &LaserGame) -> Result<(), MoveError> {
        if game.engine().is_over() {
            Err(MoveError::GameAlreadyOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: it must be the side's turn.
pub struct SidesTurn;

impl SidesTurn {
    /// Delegates to the turn engine's guard.
    pub fn check(side: Side, game: &LaserGame) -> Result<(), MoveError> {
        game.engine().check_turn(side)
    }
}

/// Precondition: moved or rotated pieces belong to the mover.
pub struct OwnsPiece;

impl OwnsPiece {
    /// Empty or out-of-bounds cells are left for the board to report.
    #[instrument(skip(game))]
    pub fn check(side: Side, action: &Move, game: &LaserGame) -> Result<(), MoveError> {
        let cell = match action {
            Move::Move { from, .. } => *from,
            Move::Rotate { cell, .. } => *cell,
            Move::Place { .. } | Move::Fire => return Ok(()),
        };
        match game.board().piece_at(cell) {
            Some(piece) if piece.owner != side => Err(MoveError::NotYourPiece(cell)),
            _ => Ok(()),
        }
    }
}

/// Precondition: placements use a placeable kind still in the mover's reserve.
pub struct PlacementAllowed;

impl PlacementAllowed {
    /// Emitters and targets can never be placed during play.
    #[instrument(skip(game))]
    pub fn check(side: Side, action: &Move, game: &LaserGame) -> Result<(), MoveError> {
        let Move::Place { cell, kind, .. } = action else {
            return Ok(());
        };
        if !kind.placeable() {
            return Err(BoardError::IllegalPlacement(*cell, side).into());
        }
        if game.reserve(side).remaining(*kind) == 0 {
            return Err(MoveError::ReserveExhausted(*kind));
        }
        Ok(())
    }
}

/// Precondition: a firing side has an emitter on the board.
pub struct EmitterReady;

impl EmitterReady {
    /// Only fire actions are checked.
    pub fn check(side: Side, action: &Move, game: &LaserGame) -> Result<(), MoveError> {
        if action.is_fire() && game.board().emitter_of(side).is_none() {
            Err(MoveError::MissingEmitter(side))
        } else {
            Ok(())
        }
    }
}

/// Composite precondition for any move.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move, cheapest first.
    #[instrument(skip(game))]
    pub fn check(side: Side, action: &Move, game: &LaserGame) -> Result<(), MoveError> {
        GameNotOver::check(game)?;
        SidesTurn::check(side, game)?;
        OwnsPiece::check(side, action, game)?;
        PlacementAllowed::check(side, action, game)?;
        EmitterReady::check(side, action, game)?;
        Ok(())
    }
}

/// Contract for moves submitted to a [`LaserGame`].
///
/// Preconditions:
/// - Game not over, mover's turn
/// - Mover owns the piece being moved or rotated
/// - Placed kinds are placeable and in reserve
/// - Firing side has an emitter
///
/// Postconditions:
/// - Sides still alternate
/// - History matches the move count
/// - One emitter and one target per side
pub struct MoveContract;

impl Contract<LaserGame, (Side, Move)> for MoveContract {
    fn pre(game: &LaserGame, (side, action): &(Side, Move)) -> Result<(), MoveError> {
        LegalMove::check(*side, action, game)
    }

    fn post(_before: &LaserGame, after: &LaserGame) -> Result<(), MoveError> {
        LaserInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%descriptions, "Postcondition failed");
            MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}
