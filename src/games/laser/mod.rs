//! Two-player laser board game: pieces, board, beam tracing and turns.

mod action;
mod board;
mod contracts;
mod game;
mod invariants;
mod layout;
mod piece;
mod tracer;
mod turn;
mod types;

pub use action::{Move, MoveError};
pub use board::{Board, BoardError};
pub use contracts::{Contract, LegalMove, MoveContract};
pub use game::{GameRules, LaserGame, MoveOutcome, Reserve};
pub use invariants::{Invariant, InvariantSet, InvariantViolation, LaserInvariants};
pub use layout::{BoardSetup, MAX_EDGE, MIN_EDGE, SetupError, validate as validate_setup};
pub use piece::{Impact, OwnTargetRule, Piece, PieceKind};
pub use tracer::{LaserTracer, Outcome, TraceResult};
pub use turn::{TurnEngine, TurnPhase};
pub use types::{Cell, Direction, Rotation, Side};
