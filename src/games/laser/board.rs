//! The board: a fixed-size grid mapping cells to at most one piece.

use super::piece::{Piece, PieceKind};
use super::types::{Cell, Rotation, Side};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Structural rule violated by a board operation.
///
/// A failed operation never mutates the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// The cell lies outside the grid.
    #[display("Cell {} is outside the board", _0)]
    OutOfBounds(Cell),

    /// The cell already holds a piece.
    #[display("Cell {} is already occupied", _0)]
    OccupiedCell(Cell),

    /// There is no piece at the source cell.
    #[display("No piece at {}", _0)]
    EmptySource(Cell),

    /// The piece at the cell is fixed in place.
    #[display("Piece at {} cannot move", _0)]
    NotMovable(Cell),

    /// The piece at the cell cannot be rotated.
    #[display("Piece at {} cannot rotate", _0)]
    NotRotatable(Cell),

    /// The destination is not one orthogonal step from the source.
    #[display("Cannot move from {} to {}: pieces step one cell orthogonally", _0, _1)]
    IllegalMoveShape(Cell, Cell),

    /// The cell is reserved and the side may not place there.
    #[display("Side {} may not place a piece at {}", _1, _0)]
    IllegalPlacement(Cell, Side),
}

impl std::error::Error for BoardError {}

/// Fixed-size grid of cells, each empty or holding one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: u8,
    height: u8,
    pieces: BTreeMap<Cell, Piece>,
}

impl Board {
    /// Creates an empty board. Zero dimensions are raised to one.
    #[instrument]
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            pieces: BTreeMap::new(),
        }
    }

    /// Number of columns.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Whether `cell` lies on the board.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.col < self.width && cell.row < self.height
    }

    /// Returns the piece at `cell`, if any. Out-of-bounds cells are empty.
    pub fn piece_at(&self, cell: Cell) -> Option<&Piece> {
        self.pieces.get(&cell)
    }

    /// Whether `cell` holds no piece.
    pub fn is_empty(&self, cell: Cell) -> bool {
        !self.pieces.contains_key(&cell)
    }

    /// All pieces keyed by cell, in row-major order of their coordinates.
    pub fn pieces(&self) -> impl Iterator<Item = (Cell, &Piece)> {
        self.pieces.iter().map(|(cell, piece)| (*cell, piece))
    }

    /// Number of pieces on the board.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Pieces of `kind` owned by `side`.
    pub fn find(&self, kind: PieceKind, side: Side) -> impl Iterator<Item = (Cell, &Piece)> {
        self.pieces()
            .filter(move |(_, piece)| piece.kind == kind && piece.owner == side)
    }

    /// Cell of the emitter owned by `side`, if one is on the board.
    pub fn emitter_of(&self, side: Side) -> Option<(Cell, &Piece)> {
        self.find(PieceKind::Emitter, side).next()
    }

    fn check_bounds(&self, cell: Cell) -> Result<(), BoardError> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds(cell))
        }
    }

    /// Puts `piece` on an empty cell during play.
    ///
    /// A side may not place on the opponent's home row.
    #[instrument(skip(self))]
    pub fn place_piece(&mut self, cell: Cell, piece: Piece) -> Result<(), BoardError> {
        self.check_bounds(cell)?;
        if !self.is_empty(cell) {
            return Err(BoardError::OccupiedCell(cell));
        }
        if cell.row == piece.owner.opponent().home_row(self.height) {
            return Err(BoardError::IllegalPlacement(cell, piece.owner));
        }
        self.pieces.insert(cell, piece);
        debug!(%cell, kind = %piece.kind, owner = %piece.owner, "Placed piece");
        Ok(())
    }

    /// Puts `piece` on an empty cell while building a starting position.
    ///
    /// Home rows are not reserved during setup.
    #[instrument(skip(self))]
    pub fn setup_piece(&mut self, cell: Cell, piece: Piece) -> Result<(), BoardError> {
        self.check_bounds(cell)?;
        if !self.is_empty(cell) {
            return Err(BoardError::OccupiedCell(cell));
        }
        self.pieces.insert(cell, piece);
        Ok(())
    }

    /// Removes and returns the piece at `cell`. Empty cells are a no-op.
    #[instrument(skip(self))]
    pub fn remove_piece(&mut self, cell: Cell) -> Option<Piece> {
        let removed = self.pieces.remove(&cell);
        if let Some(piece) = &removed {
            debug!(%cell, kind = %piece.kind, "Removed piece");
        }
        removed
    }

    /// Steps the piece at `from` to the neighbouring empty cell `to`.
    #[instrument(skip(self))]
    pub fn move_piece(&mut self, from: Cell, to: Cell) -> Result<(), BoardError> {
        self.check_bounds(from)?;
        self.check_bounds(to)?;
        let piece = *self.piece_at(from).ok_or(BoardError::EmptySource(from))?;
        if !piece.movable {
            return Err(BoardError::NotMovable(from));
        }
        if from.manhattan(to) != 1 {
            return Err(BoardError::IllegalMoveShape(from, to));
        }
        if !self.is_empty(to) {
            return Err(BoardError::OccupiedCell(to));
        }
        self.pieces.remove(&from);
        self.pieces.insert(to, piece);
        debug!(%from, %to, kind = %piece.kind, "Moved piece");
        Ok(())
    }

    /// Turns the piece at `cell` a quarter turn.
    #[instrument(skip(self))]
    pub fn rotate_piece(&mut self, cell: Cell, rotation: Rotation) -> Result<(), BoardError> {
        self.check_bounds(cell)?;
        let piece = self
            .pieces
            .get_mut(&cell)
            .ok_or(BoardError::EmptySource(cell))?;
        if !piece.rotatable {
            return Err(BoardError::NotRotatable(cell));
        }
        piece.orientation = piece.orientation.rotate(rotation);
        debug!(%cell, orientation = %piece.orientation, "Rotated piece");
        Ok(())
    }

    /// Formats the board as text, one row per line.
    ///
    /// Each cell is two characters: the kind letter (uppercase for side A,
    /// lowercase for side B) and an arrow for the orientation. Empty cells
    /// are `..`.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..self.height {
            for col in 0..self.width {
                match self.piece_at(Cell::new(col, row)) {
                    Some(piece) => {
                        let symbol = piece.kind.symbol();
                        result.push(match piece.owner {
                            Side::A => symbol,
                            Side::B => symbol.to_ascii_lowercase(),
                        });
                        result.push(piece.orientation.arrow());
                    }
                    None => result.push_str(".."),
                }
                if col + 1 < self.width {
                    result.push(' ');
                }
            }
            if row + 1 < self.height {
                result.push('\n');
            }
        }
        result
    }
}
