//! Laser tracing: walks the beam across the board cell by cell.
//!
//! The tracer is a pure function of the board. It never mutates pieces;
//! removal of struck pieces is decided by the caller.

use super::board::Board;
use super::piece::{Impact, OwnTargetRule, Piece};
use super::types::{Cell, Direction, Side};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument, trace};

/// Terminal result of one beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The beam left the grid without striking anything that stops it.
    ExitedBoard,
    /// The beam stopped at a piece that survived.
    Absorbed(Cell, Piece),
    /// The beam struck the target owned by the given side.
    Hit(Cell, Side),
    /// The beam revisited a (cell, direction) state and would never stop.
    Loop,
}

impl Outcome {
    /// Whether this outcome ends the game.
    pub fn is_hit(&self) -> bool {
        matches!(self, Outcome::Hit(..))
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::ExitedBoard => write!(f, "Beam left the board"),
            Outcome::Absorbed(cell, piece) => {
                write!(f, "Beam absorbed by {} at {}", piece.kind, cell)
            }
            Outcome::Hit(cell, side) => write!(f, "Beam hit side {}'s target at {}", side, cell),
            Outcome::Loop => write!(f, "Beam trapped in a loop"),
        }
    }
}

/// Ordered path of the beam plus its single terminal outcome.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters, derive_new::new,
)]
pub struct TraceResult {
    /// Cells entered by the beam, in order, excluding the start cell.
    path: Vec<Cell>,
    /// How the beam ended.
    outcome: Outcome,
}

impl TraceResult {
    /// Consumes the result, returning the path.
    pub fn into_path(self) -> Vec<Cell> {
        self.path
    }
}

/// Traces beams over a board under a fixed own-target rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaserTracer {
    own_target: OwnTargetRule,
}

impl LaserTracer {
    /// Creates a tracer with the given own-target rule.
    pub fn new(own_target: OwnTargetRule) -> Self {
        Self { own_target }
    }

    /// Upper bound on steps: every (cell, direction) state once.
    pub fn step_limit(board: &Board) -> usize {
        usize::from(board.width()) * usize::from(board.height()) * 4
    }

    /// Fires from `start` travelling `direction`, on behalf of `firer`.
    ///
    /// The start cell itself is never inspected, so the emitter does not
    /// absorb its own beam on the way out.
    #[instrument(skip(self, board), fields(width = board.width(), height = board.height()))]
    pub fn trace(
        &self,
        board: &Board,
        start: Cell,
        direction: Direction,
        firer: Side,
    ) -> TraceResult {
        let limit = Self::step_limit(board);
        let mut path = Vec::new();
        let mut seen: HashSet<(Cell, Direction)> = HashSet::new();
        let mut cell = start;
        let mut heading = direction;

        for _ in 0..limit {
            let Some(next) = cell.step(heading, board.width(), board.height()) else {
                debug!(steps = path.len(), "Beam exited board");
                return TraceResult::new(path, Outcome::ExitedBoard);
            };
            cell = next;
            path.push(cell);

            let Some(piece) = board.piece_at(cell) else {
                trace!(%cell, %heading, "Empty cell");
                continue;
            };

            match piece.impact(heading, firer, self.own_target) {
                Impact::Absorb => {
                    debug!(%cell, kind = %piece.kind, "Beam absorbed");
                    return TraceResult::new(path, Outcome::Absorbed(cell, *piece));
                }
                Impact::Hit => {
                    debug!(%cell, owner = %piece.owner, "Beam hit target");
                    return TraceResult::new(path, Outcome::Hit(cell, piece.owner));
                }
                Impact::PassThrough => {
                    trace!(%cell, "Beam passed through");
                }
                Impact::Deflect(out) => {
                    trace!(%cell, from = %heading, to = %out, "Beam deflected");
                    heading = out;
                }
            }

            // States are recorded after the piece acted, so the pair names
            // the direction the beam leaves the cell in.
            if !seen.insert((cell, heading)) {
                debug!(%cell, %heading, "Beam revisited state");
                return TraceResult::new(path, Outcome::Loop);
            }
        }

        debug!(limit, "Beam exceeded step limit");
        TraceResult::new(path, Outcome::Loop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::laser::piece::PieceKind;

    fn put(board: &mut Board, col: u8, row: u8, kind: PieceKind, owner: Side, facing: Direction) {
        board
            .place_piece(Cell::new(col, row), Piece::new(kind, owner, facing))
            .unwrap();
    }

    fn shoot(board: &Board, col: u8, row: u8, heading: Direction) -> TraceResult {
        LaserTracer::default().trace(board, Cell::new(col, row), heading, Side::A)
    }

    #[test]
    fn test_straight_exit_path_matches_distance() {
        let board = Board::new(8, 8);
        let result = shoot(&board, 0, 3, Direction::East);
        assert_eq!(result.outcome(), &Outcome::ExitedBoard);
        assert_eq!(result.path().len(), 7);
        assert_eq!(result.path().last(), Some(&Cell::new(7, 3)));
    }

    #[test]
    fn test_start_on_edge_facing_out() {
        let board = Board::new(8, 8);
        let result = shoot(&board, 0, 3, Direction::West);
        assert_eq!(result.outcome(), &Outcome::ExitedBoard);
        assert!(result.path().is_empty());
    }

    #[test]
    fn test_mirror_turns_beam() {
        let mut board = Board::new(8, 8);
        // `/` turns an eastbound beam north.
        put(&mut board, 4, 3, PieceKind::Mirror45, Side::B, Direction::North);
        let result = shoot(&board, 0, 3, Direction::East);
        assert_eq!(result.outcome(), &Outcome::ExitedBoard);
        assert_eq!(
            result.path(),
            &vec![
                Cell::new(1, 3),
                Cell::new(2, 3),
                Cell::new(3, 3),
                Cell::new(4, 3),
                Cell::new(4, 2),
                Cell::new(4, 1),
                Cell::new(4, 0),
            ]
        );
    }

    #[test]
    fn test_deflector_back_absorbs() {
        let mut board = Board::new(8, 8);
        put(&mut board, 4, 3, PieceKind::Deflector, Side::B, Direction::East);
        let result = shoot(&board, 0, 3, Direction::East);
        assert!(matches!(result.outcome(), Outcome::Absorbed(cell, _) if *cell == Cell::new(4, 3)));
    }

    #[test]
    fn test_own_target_rules() {
        let mut board = Board::new(8, 8);
        put(&mut board, 3, 3, PieceKind::Target, Side::A, Direction::North);
        let absorb = LaserTracer::new(OwnTargetRule::Absorb).trace(
            &board,
            Cell::new(0, 3),
            Direction::East,
            Side::A,
        );
        assert!(matches!(absorb.outcome(), Outcome::Absorbed(..)));

        let pass = LaserTracer::new(OwnTargetRule::PassThrough).trace(
            &board,
            Cell::new(0, 3),
            Direction::East,
            Side::A,
        );
        assert_eq!(pass.outcome(), &Outcome::ExitedBoard);
        assert_eq!(pass.path().len(), 7);
    }

    #[test]
    fn test_mirror_ring_reports_loop() {
        let mut board = Board::new(5, 5);
        put(&mut board, 3, 1, PieceKind::DoubleMirror, Side::A, Direction::South);
        put(&mut board, 3, 3, PieceKind::DoubleMirror, Side::A, Direction::West);
        put(&mut board, 1, 3, PieceKind::DoubleMirror, Side::A, Direction::North);
        put(&mut board, 1, 1, PieceKind::DoubleMirror, Side::A, Direction::East);

        let result = shoot(&board, 2, 1, Direction::East);
        assert_eq!(result.outcome(), &Outcome::Loop);
        assert!(result.path().len() <= LaserTracer::step_limit(&board));
    }
}
