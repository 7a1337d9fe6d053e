//! The laser game: board, turn engine, reserves and history together.

use super::action::{Move, MoveError};
use super::board::Board;
use super::contracts::{Contract, MoveContract};
use super::layout::{self, SetupError};
use super::piece::{OwnTargetRule, Piece, PieceKind};
use super::tracer::{LaserTracer, Outcome, TraceResult};
use super::turn::{TurnEngine, TurnPhase};
use super::types::{Cell, Side};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Pieces a side may still place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reserve {
    /// Blockers left.
    pub blockers: u8,
    /// Mirror45 pieces left.
    pub mirror45: u8,
    /// Mirror135 pieces left.
    pub mirror135: u8,
    /// Double mirrors left.
    pub double_mirrors: u8,
    /// Deflectors left.
    pub deflectors: u8,
}

impl Reserve {
    /// Pieces of `kind` left; zero for kinds that cannot be placed.
    pub fn remaining(&self, kind: PieceKind) -> u8 {
        match kind {
            PieceKind::Blocker => self.blockers,
            PieceKind::Mirror45 => self.mirror45,
            PieceKind::Mirror135 => self.mirror135,
            PieceKind::DoubleMirror => self.double_mirrors,
            PieceKind::Deflector => self.deflectors,
            PieceKind::Emitter | PieceKind::Target => 0,
        }
    }

    fn slot(&mut self, kind: PieceKind) -> Option<&mut u8> {
        match kind {
            PieceKind::Blocker => Some(&mut self.blockers),
            PieceKind::Mirror45 => Some(&mut self.mirror45),
            PieceKind::Mirror135 => Some(&mut self.mirror135),
            PieceKind::DoubleMirror => Some(&mut self.double_mirrors),
            PieceKind::Deflector => Some(&mut self.deflectors),
            PieceKind::Emitter | PieceKind::Target => None,
        }
    }

    /// Takes one piece of `kind`, failing when none are left.
    pub fn take(&mut self, kind: PieceKind) -> Result<(), MoveError> {
        match self.slot(kind) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(())
            }
            _ => Err(MoveError::ReserveExhausted(kind)),
        }
    }
}

impl Default for Reserve {
    fn default() -> Self {
        Self {
            blockers: 2,
            mirror45: 3,
            mirror135: 3,
            double_mirrors: 1,
            deflectors: 2,
        }
    }
}

/// Runtime rules that do not affect the starting layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameRules {
    /// Behaviour of a beam reaching the firer's own target.
    pub own_target: OwnTargetRule,
    /// Remove placeable pieces that absorb a beam.
    pub capture_on_absorb: bool,
    /// Draw once this many moves have been played without a hit.
    pub max_moves: Option<u32>,
    /// Starting reserve for each side.
    pub reserve: Reserve,
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct MoveOutcome {
    /// Engine phase after the move.
    phase: TurnPhase,
    /// Beam trace, for fire actions.
    trace: Option<TraceResult>,
    /// Piece removed by the beam, if capture is enabled.
    captured: Option<(Cell, Piece)>,
}

/// A running laser match: the board plus everything that decides turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaserGame {
    board: Board,
    engine: TurnEngine,
    rules: GameRules,
    reserves: [Reserve; 2],
    history: Vec<(Side, Move)>,
}

impl LaserGame {
    /// Starts a match on `board`, which must hold one emitter and one
    /// target per side.
    #[instrument(skip(board), fields(pieces = board.piece_count()))]
    pub fn new(board: Board, rules: GameRules) -> Result<Self, SetupError> {
        layout::validate(&board)?;
        Ok(Self {
            board,
            engine: TurnEngine::new(rules.max_moves),
            rules,
            reserves: [rules.reserve; 2],
            history: Vec::new(),
        })
    }

    /// Replays `moves` from the starting `board`.
    #[instrument(skip(board, moves), fields(moves = moves.len()))]
    pub fn replay(
        board: Board,
        rules: GameRules,
        moves: &[(Side, Move)],
    ) -> Result<Self, MoveError> {
        let mut game = Self::new(board, rules)
            .map_err(|e| MoveError::InvariantViolation(e.to_string()))?;
        for (side, action) in moves {
            game.apply(*side, *action)?;
        }
        Ok(game)
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub(super) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// The turn engine.
    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    /// The runtime rules.
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Reserve of `side`.
    pub fn reserve(&self, side: Side) -> &Reserve {
        &self.reserves[side_index(side)]
    }

    /// Accepted moves in order.
    pub fn history(&self) -> &[(Side, Move)] {
        &self.history
    }

    /// Applies a move by `side`.
    ///
    /// Either the whole move is applied or the game is left untouched.
    #[instrument(skip(self), fields(phase = %self.engine.phase()))]
    pub fn apply(&mut self, side: Side, action: Move) -> Result<MoveOutcome, MoveError> {
        MoveContract::pre(self, &(side, action)).inspect_err(|e| {
            warn!(%side, %action, error = %e, "Move rejected");
        })?;

        #[cfg(debug_assertions)]
        let before = self.clone();

        let outcome = match action {
            Move::Place { cell, kind, facing } => {
                let mut reserve = self.reserves[side_index(side)];
                reserve.take(kind)?;
                self.board.place_piece(cell, Piece::new(kind, side, facing))?;
                self.reserves[side_index(side)] = reserve;
                self.finish_plain_move(side)?
            }
            Move::Move { from, to } => {
                self.board.move_piece(from, to)?;
                self.finish_plain_move(side)?
            }
            Move::Rotate { cell, delta } => {
                self.board.rotate_piece(cell, delta)?;
                self.finish_plain_move(side)?
            }
            Move::Fire => self.fire(side)?,
        };
        self.history.push((side, action));

        #[cfg(debug_assertions)]
        if let Err(e) = MoveContract::post(&before, self) {
            *self = before;
            return Err(e);
        }

        debug!(%side, %action, phase = %outcome.phase, "Move applied");
        Ok(outcome)
    }

    /// Ends the match with `side` conceding.
    #[instrument(skip(self))]
    pub fn forfeit(&mut self, side: Side) -> Result<TurnPhase, MoveError> {
        self.engine.forfeit(side)?;
        Ok(self.engine.phase())
    }

    fn finish_plain_move(&mut self, side: Side) -> Result<MoveOutcome, MoveError> {
        self.engine.complete_move(side)?;
        Ok(MoveOutcome {
            phase: self.engine.phase(),
            trace: None,
            captured: None,
        })
    }

    fn fire(&mut self, side: Side) -> Result<MoveOutcome, MoveError> {
        let (start, emitter) = self
            .board
            .emitter_of(side)
            .map(|(cell, piece)| (cell, *piece))
            .ok_or(MoveError::MissingEmitter(side))?;
        self.engine.begin_fire(side)?;

        let tracer = LaserTracer::new(self.rules.own_target);
        let trace = tracer.trace(&self.board, start, emitter.orientation, side);

        let captured = match trace.outcome() {
            Outcome::Absorbed(cell, piece)
                if self.rules.capture_on_absorb && piece.kind.capturable() =>
            {
                self.board
                    .remove_piece(*cell)
                    .map(|removed| (*cell, removed))
            }
            _ => None,
        };

        let phase = self.engine.resolve(trace.outcome())?;
        info!(%side, outcome = %trace.outcome(), steps = trace.path().len(), "Laser fired");
        Ok(MoveOutcome {
            phase,
            trace: Some(trace),
            captured,
        })
    }
}

fn side_index(side: Side) -> usize {
    match side {
        Side::A => 0,
        Side::B => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::laser::{BoardError, BoardSetup, Direction, Rotation};

    fn duel_board() -> Board {
        let mut board = Board::new(8, 8);
        board
            .setup_piece(Cell::new(0, 0), Piece::new(PieceKind::Emitter, Side::A, Direction::East))
            .unwrap();
        board
            .setup_piece(Cell::new(7, 0), Piece::new(PieceKind::Target, Side::B, Direction::West))
            .unwrap();
        board
            .setup_piece(Cell::new(7, 7), Piece::new(PieceKind::Emitter, Side::B, Direction::North))
            .unwrap();
        board
            .setup_piece(Cell::new(0, 7), Piece::new(PieceKind::Target, Side::A, Direction::East))
            .unwrap();
        board
    }

    #[test]
    fn test_direct_hit_wins() {
        let mut game = LaserGame::new(duel_board(), GameRules::default()).unwrap();
        let outcome = game.apply(Side::A, Move::Fire).unwrap();
        assert_eq!(outcome.phase(), &TurnPhase::GameOver(Some(Side::A)));
        let trace = outcome.trace().as_ref().unwrap();
        assert_eq!(trace.outcome(), &Outcome::Hit(Cell::new(7, 0), Side::B));
        assert_eq!(trace.path().len(), 7);
    }

    #[test]
    fn test_place_consumes_reserve() {
        let rules = GameRules {
            reserve: Reserve {
                blockers: 1,
                ..Reserve::default()
            },
            ..GameRules::default()
        };
        let mut game = LaserGame::new(duel_board(), rules).unwrap();
        let place = |cell| Move::Place {
            cell,
            kind: PieceKind::Blocker,
            facing: Direction::North,
        };
        game.apply(Side::A, place(Cell::new(4, 0))).unwrap();
        assert_eq!(game.reserve(Side::A).blockers, 0);
        assert_eq!(game.reserve(Side::B).blockers, 1);
        game.apply(Side::B, Move::Fire).unwrap();
        assert_eq!(
            game.apply(Side::A, place(Cell::new(4, 1))),
            Err(MoveError::ReserveExhausted(PieceKind::Blocker))
        );
    }

    #[test]
    fn test_failed_move_is_atomic() {
        let mut game = LaserGame::new(duel_board(), GameRules::default()).unwrap();
        let before = game.clone();
        let err = game
            .apply(
                Side::A,
                Move::Move {
                    from: Cell::new(0, 0),
                    to: Cell::new(1, 0),
                },
            )
            .unwrap_err();
        assert_eq!(err, MoveError::Board(BoardError::NotMovable(Cell::new(0, 0))));
        let err = game
            .apply(
                Side::A,
                Move::Place {
                    cell: Cell::new(7, 0),
                    kind: PieceKind::Mirror45,
                    facing: Direction::North,
                },
            )
            .unwrap_err();
        assert_eq!(err, MoveError::Board(BoardError::OccupiedCell(Cell::new(7, 0))));
        assert_eq!(game, before);
    }

    #[test]
    fn test_capture_on_absorb() {
        let rules = GameRules {
            capture_on_absorb: true,
            ..GameRules::default()
        };
        let mut game = LaserGame::new(duel_board(), rules).unwrap();
        game.apply(
            Side::A,
            Move::Rotate {
                cell: Cell::new(0, 0),
                delta: Rotation::Clockwise,
            },
        )
        .unwrap();
        game.apply(
            Side::B,
            Move::Place {
                cell: Cell::new(7, 3),
                kind: PieceKind::Blocker,
                facing: Direction::North,
            },
        )
        .unwrap();
        game.apply(
            Side::A,
            Move::Rotate {
                cell: Cell::new(0, 0),
                delta: Rotation::CounterClockwise,
            },
        )
        .unwrap();
        let outcome = game.apply(Side::B, Move::Fire).unwrap();
        assert_eq!(outcome.captured().map(|(cell, _)| cell), Some(Cell::new(7, 3)));
        assert!(game.board().is_empty(Cell::new(7, 3)));
        assert_eq!(game.engine().active(), Some(Side::A));
    }

    #[test]
    fn test_replay_reproduces_state() {
        let board = BoardSetup::default().build().unwrap();
        let mut game = LaserGame::new(board.clone(), GameRules::default()).unwrap();
        game.apply(Side::A, Move::Fire).unwrap();
        game.apply(
            Side::B,
            Move::Place {
                cell: Cell::new(3, 4),
                kind: PieceKind::Mirror45,
                facing: Direction::East,
            },
        )
        .unwrap();
        let replayed = LaserGame::replay(board, GameRules::default(), game.history()).unwrap();
        assert_eq!(replayed, game);
    }

    #[test]
    fn test_forfeit_ends_game() {
        let mut game = LaserGame::new(duel_board(), GameRules::default()).unwrap();
        assert_eq!(game.forfeit(Side::B).unwrap(), TurnPhase::GameOver(Some(Side::A)));
        assert_eq!(game.apply(Side::A, Move::Fire), Err(MoveError::GameAlreadyOver));
    }
}
