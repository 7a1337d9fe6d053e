//! Strictly Lasers library - a type-safe two-player laser board game.
//!
//! Players take turns placing, stepping and rotating mirrors and blockers on
//! a grid, or firing their emitter. The beam is traced cell by cell; striking
//! the opponent's target wins the match.
//!
//! # Architecture
//!
//! - **Board**: fixed grid of cells, each empty or holding one piece
//! - **LaserTracer**: pure, bounded beam tracing over a board
//! - **TurnEngine**: guarded state machine deciding whose move it is
//! - **Session**: two seated players, one game, one room id
//! - **SessionManager**: room registry and matchmaking
//!
//! # Example
//!
//! ```
//! use strictly_lasers::{GameConfig, Move, Session};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GameConfig::default();
//! let mut session = Session::from_config(
//!     "room-1".to_string(),
//!     ("alice".to_string(), "Alice".to_string()),
//!     ("bob".to_string(), "Bob".to_string()),
//!     &config,
//! )?;
//!
//! let result = session.submit_move("alice", Move::Fire)?;
//! assert!(result.trace().is_some());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod games;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};

// Crate-level exports - Session management
pub use session::{
    MoveResult, Pairing, Player, PlayerId, RoomId, Session, SessionError, SessionManager,
    SessionSnapshot,
};

// Crate-level exports - Game types
pub use games::laser::{
    Board, BoardError, BoardSetup, Cell, Contract, Direction, GameRules, Impact, Invariant,
    InvariantSet, InvariantViolation, LaserGame, LaserInvariants, LaserTracer, LegalMove,
    MAX_EDGE, MIN_EDGE, Move, MoveContract, MoveError, MoveOutcome, Outcome, OwnTargetRule, Piece,
    PieceKind, Reserve, Rotation, SetupError, Side, TraceResult, TurnEngine, TurnPhase,
    validate_setup,
};
