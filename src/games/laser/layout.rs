//! Initial piece layouts and setup validation.

use super::board::{Board, BoardError};
use super::piece::{Piece, PieceKind};
use super::types::{Cell, Direction, Side};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{info, instrument, warn};

/// Smallest supported board edge.
pub const MIN_EDGE: u8 = 6;
/// Largest supported board edge.
pub const MAX_EDGE: u8 = 26;

/// Error raised when a starting position is unusable.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SetupError {
    /// Board dimensions are outside the supported range.
    #[display("Board {}x{} is outside the supported range {}..={}", _0, _1, MIN_EDGE, MAX_EDGE)]
    BadDimensions(u8, u8),

    /// A side does not have exactly one emitter.
    #[display("Side {} has {} emitters, expected exactly one", _0, _1)]
    EmitterCount(Side, usize),

    /// A side does not have exactly one target.
    #[display("Side {} has {} targets, expected exactly one", _0, _1)]
    TargetCount(Side, usize),

    /// A layout piece could not be placed.
    #[display("Layout rejected: {}", _0)]
    Board(BoardError),
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Board(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BoardError> for SetupError {
    fn from(err: BoardError) -> Self {
        SetupError::Board(err)
    }
}

/// Options that shape the starting position only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct BoardSetup {
    /// Number of columns.
    width: u8,
    /// Number of rows.
    height: u8,
    /// Side B's pieces are a half-turn of side A's instead of a top-to-bottom flip.
    mirror_layout: bool,
    /// Only emitters and targets are pre-placed.
    empty_start: bool,
}

impl BoardSetup {
    /// Creates a setup description.
    pub fn new(width: u8, height: u8, mirror_layout: bool, empty_start: bool) -> Self {
        Self {
            width,
            height,
            mirror_layout,
            empty_start,
        }
    }

    /// Checks the dimensions against the supported range.
    pub fn check_dimensions(&self) -> Result<(), SetupError> {
        let range = MIN_EDGE..=MAX_EDGE;
        if range.contains(&self.width) && range.contains(&self.height) {
            Ok(())
        } else {
            Err(SetupError::BadDimensions(self.width, self.height))
        }
    }

    /// Builds the starting board.
    #[instrument]
    pub fn build(&self) -> Result<Board, SetupError> {
        self.check_dimensions()?;
        let mut board = Board::new(self.width, self.height);
        for (cell, piece) in self.side_a_pieces() {
            board.setup_piece(cell, piece)?;
            let (mirrored_cell, mirrored_piece) = if self.mirror_layout {
                (cell.point_reflect(self.width, self.height), piece.point_reflected())
            } else {
                (cell.flip_vertical(self.height), piece.flipped_vertical())
            };
            board.setup_piece(
                mirrored_cell,
                Piece {
                    owner: Side::B,
                    ..mirrored_piece
                },
            )?;
        }
        validate(&board)?;
        info!(
            width = self.width,
            height = self.height,
            pieces = board.piece_count(),
            mirror_layout = self.mirror_layout,
            empty_start = self.empty_start,
            "Built starting board"
        );
        Ok(board)
    }

    /// Side A's half of the opening; side B's half is derived from it.
    fn side_a_pieces(&self) -> Vec<(Cell, Piece)> {
        let w = self.width;
        let c = w / 2;
        let a = |kind, facing| Piece::new(kind, Side::A, facing);

        let mut pieces = vec![
            (Cell::new(0, 0), a(PieceKind::Emitter, Direction::South)),
            (Cell::new(c, 0), a(PieceKind::Target, Direction::South)),
        ];
        if !self.empty_start {
            pieces.extend([
                (Cell::new(c - 1, 0), a(PieceKind::Blocker, Direction::South)),
                (Cell::new(c + 1, 0), a(PieceKind::Blocker, Direction::South)),
                (Cell::new(c - 1, 1), a(PieceKind::Mirror135, Direction::South)),
                (Cell::new(c + 1, 1), a(PieceKind::Mirror45, Direction::South)),
                // The emitter's opening shot turns east along row 2, then
                // north off the board at the far edge.
                (Cell::new(0, 2), a(PieceKind::Mirror135, Direction::North)),
                (Cell::new(w - 1, 2), a(PieceKind::DoubleMirror, Direction::West)),
            ]);
        }
        pieces
    }
}

impl Default for BoardSetup {
    fn default() -> Self {
        Self::new(8, 8, true, false)
    }
}

/// Checks that each side has exactly one emitter and one target.
#[instrument(skip(board))]
pub fn validate(board: &Board) -> Result<(), SetupError> {
    for side in Side::iter() {
        let emitters = board.find(PieceKind::Emitter, side).count();
        if emitters != 1 {
            warn!(%side, emitters, "Invalid emitter count");
            return Err(SetupError::EmitterCount(side, emitters));
        }
        let targets = board.find(PieceKind::Target, side).count();
        if targets != 1 {
            warn!(%side, targets, "Invalid target count");
            return Err(SetupError::TargetCount(side, targets));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::laser::tracer::{LaserTracer, Outcome};

    fn opening_shot(board: &Board, side: Side) -> Outcome {
        let (cell, emitter) = board.emitter_of(side).unwrap();
        *LaserTracer::default()
            .trace(board, cell, emitter.orientation, side)
            .outcome()
    }

    #[test]
    fn test_all_variants_validate() {
        for mirror_layout in [true, false] {
            for empty_start in [true, false] {
                for (w, h) in [(6, 6), (8, 8), (10, 7)] {
                    let setup = BoardSetup::new(w, h, mirror_layout, empty_start);
                    let board = setup.build().unwrap();
                    assert!(validate(&board).is_ok());
                }
            }
        }
    }

    #[test]
    fn test_point_reflection_layout() {
        let board = BoardSetup::new(8, 8, true, false).build().unwrap();
        let (cell, emitter) = board.emitter_of(Side::B).unwrap();
        assert_eq!(cell, Cell::new(7, 7));
        assert_eq!(emitter.orientation, Direction::North);
        assert_eq!(board.piece_count(), 16);
    }

    #[test]
    fn test_flip_layout() {
        let board = BoardSetup::new(8, 8, false, true).build().unwrap();
        let (cell, _) = board.emitter_of(Side::B).unwrap();
        assert_eq!(cell, Cell::new(0, 7));
        assert_eq!(board.piece_count(), 4);
    }

    #[test]
    fn test_opening_shots_do_not_win() {
        for mirror_layout in [true, false] {
            for empty_start in [true, false] {
                let board = BoardSetup::new(8, 8, mirror_layout, empty_start).build().unwrap();
                for side in Side::iter() {
                    assert!(!opening_shot(&board, side).is_hit());
                }
            }
        }
    }

    #[test]
    fn test_standard_opening_shot_exits() {
        let board = BoardSetup::default().build().unwrap();
        assert_eq!(opening_shot(&board, Side::A), Outcome::ExitedBoard);
    }

    #[test]
    fn test_bad_dimensions() {
        assert_eq!(
            BoardSetup::new(5, 8, true, false).build(),
            Err(SetupError::BadDimensions(5, 8))
        );
        assert!(BoardSetup::new(8, 27, true, false).build().is_err());
    }

    #[test]
    fn test_board_error_is_source() {
        use std::error::Error;

        let err = SetupError::from(BoardError::OutOfBounds(Cell::new(9, 9)));
        assert!(err.source().is_some());
        assert!(SetupError::BadDimensions(1, 1).source().is_none());
    }

    #[test]
    fn test_validate_counts() {
        let mut board = Board::new(8, 8);
        board
            .setup_piece(Cell::new(0, 0), Piece::new(PieceKind::Emitter, Side::A, Direction::South))
            .unwrap();
        assert_eq!(validate(&board), Err(SetupError::TargetCount(Side::A, 0)));
    }
}
