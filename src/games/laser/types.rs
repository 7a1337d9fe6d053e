//! Core domain types for the laser board: cells, directions, sides.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Side of the table a player sits on.
///
/// Side A moves first and owns the top home row (row 0).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum Side {
    /// First player.
    A,
    /// Second player.
    B,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Returns the home row of this side on a board of the given height.
    pub fn home_row(self, height: u8) -> u8 {
        match self {
            Side::A => 0,
            Side::B => height.saturating_sub(1),
        }
    }
}

/// Orthogonal direction of travel or facing.
///
/// Row 0 is the top of the board, so `North` decreases the row.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum Direction {
    /// Towards row 0.
    North,
    /// Towards higher columns.
    East,
    /// Towards higher rows.
    South,
    /// Towards column 0.
    West,
}

impl Direction {
    /// All four directions in clockwise order starting at `North`.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Quarter turn clockwise.
    pub fn rotate_right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// Quarter turn counter-clockwise.
    pub fn rotate_left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    /// Half turn.
    pub fn opposite(self) -> Self {
        self.rotate_right().rotate_right()
    }

    /// Applies a rotation delta.
    pub fn rotate(self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::Clockwise => self.rotate_right(),
            Rotation::CounterClockwise => self.rotate_left(),
        }
    }

    /// Mirror image across the horizontal axis (north and south swap).
    pub fn flip_vertical(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            other => other,
        }
    }

    /// Column and row offsets of one step in this direction.
    pub fn delta(self) -> (i16, i16) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// Single-character arrow used by the text board.
    pub fn arrow(self) -> char {
        match self {
            Direction::North => '^',
            Direction::East => '>',
            Direction::South => 'v',
            Direction::West => '<',
        }
    }
}

/// A quarter-turn rotation delta (+90 or -90 degrees).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Rotation {
    /// +90 degrees.
    Clockwise,
    /// -90 degrees.
    CounterClockwise,
}

impl Rotation {
    /// The rotation that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Rotation::Clockwise => Rotation::CounterClockwise,
            Rotation::CounterClockwise => Rotation::Clockwise,
        }
    }
}

/// A cell coordinate on the board, 0-indexed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("({col}, {row})")]
pub struct Cell {
    /// Column, 0 is the west edge.
    pub col: u8,
    /// Row, 0 is the north edge.
    pub row: u8,
}

impl Cell {
    /// Creates a new cell coordinate.
    pub const fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }

    /// Returns the neighbouring cell in `direction`, if it lies inside a
    /// `width` x `height` grid.
    #[instrument(level = "trace")]
    pub fn step(self, direction: Direction, width: u8, height: u8) -> Option<Cell> {
        let (dc, dr) = direction.delta();
        let col = i16::from(self.col) + dc;
        let row = i16::from(self.row) + dr;
        if col < 0 || row < 0 || col >= i16::from(width) || row >= i16::from(height) {
            return None;
        }
        Some(Cell::new(col as u8, row as u8))
    }

    /// Manhattan distance between two cells.
    pub fn manhattan(self, other: Cell) -> u16 {
        u16::from(self.col.abs_diff(other.col)) + u16::from(self.row.abs_diff(other.row))
    }

    /// The cell obtained by a half-turn of the board around its centre.
    pub fn point_reflect(self, width: u8, height: u8) -> Cell {
        Cell::new(width - 1 - self.col, height - 1 - self.row)
    }

    /// The cell obtained by flipping rows (top becomes bottom).
    pub fn flip_vertical(self, height: u8) -> Cell {
        Cell::new(self.col, height - 1 - self.row)
    }
}

impl From<(u8, u8)> for Cell {
    fn from((col, row): (u8, u8)) -> Self {
        Cell::new(col, row)
    }
}
