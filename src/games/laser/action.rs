//! First-class move types for the laser game.
//!
//! Moves are the player's intent. They are validated against the turn
//! engine and the board before anything is applied.

use super::board::BoardError;
use super::piece::PieceKind;
use super::types::{Cell, Direction, Rotation, Side};
use serde::{Deserialize, Serialize};

/// One of the four move variants a player can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Move {
    /// Put a piece from the mover's reserve on an empty cell.
    Place {
        /// Destination cell.
        cell: Cell,
        /// Kind of piece to place.
        kind: PieceKind,
        /// Initial facing of the new piece.
        facing: Direction,
    },
    /// Step one of the mover's pieces to a neighbouring cell.
    Move {
        /// Cell of the piece.
        from: Cell,
        /// Destination cell.
        to: Cell,
    },
    /// Turn one of the mover's pieces a quarter turn.
    Rotate {
        /// Cell of the piece.
        cell: Cell,
        /// Direction of the turn.
        delta: Rotation,
    },
    /// Fire the mover's emitter.
    Fire,
}

impl Move {
    /// Whether this move fires the laser.
    pub fn is_fire(&self) -> bool {
        matches!(self, Move::Fire)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Place { cell, kind, facing } => {
                write!(f, "place {} at {} facing {}", kind, cell, facing)
            }
            Move::Move { from, to } => write!(f, "move {} -> {}", from, to),
            Move::Rotate { cell, delta } => write!(f, "rotate {} {}", cell, delta),
            Move::Fire => write!(f, "fire"),
        }
    }
}

/// Error that can occur when validating or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The board rejected the move.
    #[display("{}", _0)]
    Board(BoardError),

    /// It's not this side's turn.
    #[display("It's not side {}'s turn", _0)]
    NotYourTurn(Side),

    /// The game is already over.
    #[display("Game is already over")]
    GameAlreadyOver,

    /// The piece at the cell belongs to the opponent.
    #[display("Piece at {} belongs to the opponent", _0)]
    NotYourPiece(Cell),

    /// The mover has no pieces of that kind left to place.
    #[display("No {} left in reserve", _0)]
    ReserveExhausted(PieceKind),

    /// The player is not seated in this session.
    #[display("Player {} is not seated in this session", _0)]
    UnknownPlayer(String),

    /// The firing side has no emitter on the board.
    #[display("Side {} has no emitter", _0)]
    MissingEmitter(Side),

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MoveError::Board(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BoardError> for MoveError {
    fn from(err: BoardError) -> Self {
        MoveError::Board(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_serializes_with_tag() {
        let json = serde_json::to_value(Move::Fire).unwrap();
        assert_eq!(json["type"], "fire");

        let rotate = Move::Rotate {
            cell: Cell::new(2, 3),
            delta: Rotation::Clockwise,
        };
        let back: Move = serde_json::from_value(serde_json::to_value(rotate).unwrap()).unwrap();
        assert_eq!(back, rotate);
    }

    #[test]
    fn test_board_error_converts() {
        let err: MoveError = BoardError::EmptySource(Cell::new(1, 1)).into();
        assert_eq!(err.to_string(), "No piece at (1, 1)");
        assert!(std::error::Error::source(&err).is_some());
    }
}
