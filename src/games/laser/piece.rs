//! Pieces and how each kind reacts to an incoming beam.

use super::types::{Direction, Side};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The closed catalog of piece kinds.
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
pub enum PieceKind {
    /// Absorbs the beam from every side.
    Blocker,
    /// Two-sided line mirror, drawn `/` when facing north or south and `\`
    /// when facing east or west. Deflects from every side.
    Mirror45,
    /// Two-sided line mirror, drawn `\` when facing north or south and `/`
    /// when facing east or west. Deflects from every side.
    Mirror135,
    /// Two-sided mirror with the geometry of `Mirror135`, pinned to its cell:
    /// it can be turned but never stepped.
    DoubleMirror,
    /// Single-sided mirror reflecting between `orientation` and the direction
    /// a quarter turn clockwise from it. The other two sides absorb.
    Deflector,
    /// Fires the beam along its orientation. Absorbs incoming beams.
    Emitter,
    /// Ends the game when struck by the opponent's beam.
    Target,
}

impl PieceKind {
    /// Whether pieces of this kind may be rotated in place.
    pub fn default_rotatable(self) -> bool {
        !matches!(self, PieceKind::Blocker | PieceKind::Target)
    }

    /// Whether pieces of this kind may step to a neighbouring cell.
    pub fn default_movable(self) -> bool {
        !matches!(self, PieceKind::Emitter | PieceKind::DoubleMirror)
    }

    /// Whether a player may put this kind on the board during play.
    pub fn placeable(self) -> bool {
        matches!(
            self,
            PieceKind::Blocker
                | PieceKind::Mirror45
                | PieceKind::Mirror135
                | PieceKind::DoubleMirror
                | PieceKind::Deflector
        )
    }

    /// Whether this kind can be removed when struck on an absorbing side.
    pub fn capturable(self) -> bool {
        self.placeable()
    }

    /// Letter used by the text board; lowercase for side B.
    pub fn symbol(self) -> char {
        match self {
            PieceKind::Blocker => 'B',
            PieceKind::Mirror45 => 'M',
            PieceKind::Mirror135 => 'N',
            PieceKind::DoubleMirror => 'D',
            PieceKind::Deflector => 'F',
            PieceKind::Emitter => 'E',
            PieceKind::Target => 'T',
        }
    }
}

/// How a piece treats the beam that struck it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    /// The beam stops here; the piece survives.
    Absorb,
    /// The beam continues in the same direction.
    PassThrough,
    /// The beam leaves the cell in a new direction.
    Deflect(Direction),
    /// The beam struck the opponent's target.
    Hit,
}

/// What happens when a beam fired by a side reaches its own target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnTargetRule {
    /// The beam stops; firing into one's own target is a wasted move.
    #[default]
    Absorb,
    /// The beam continues through the target unaffected.
    PassThrough,
}

/// A piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// Behaviour when struck.
    pub kind: PieceKind,
    /// Owning side.
    pub owner: Side,
    /// Facing; meaning depends on `kind`.
    pub orientation: Direction,
    /// Whether rotation moves are allowed.
    pub rotatable: bool,
    /// Whether step moves are allowed.
    pub movable: bool,
}

impl Piece {
    /// Creates a piece with the default flags for its kind.
    pub fn new(kind: PieceKind, owner: Side, orientation: Direction) -> Self {
        Self {
            kind,
            owner,
            orientation,
            rotatable: kind.default_rotatable(),
            movable: kind.default_movable(),
        }
    }

    /// The face paired with `struck` on a two-sided line mirror.
    ///
    /// Each line mirror reflects `orientation` with one neighbour and the
    /// opposite face with the other, so a half-turn leaves it unchanged.
    fn line_partner(kind: PieceKind, orientation: Direction, struck: Direction) -> Direction {
        let turn = |d: Direction| match kind {
            PieceKind::Mirror45 => d.rotate_left(),
            _ => d.rotate_right(),
        };
        let pair = turn(orientation);
        if struck == orientation {
            pair
        } else if struck == pair {
            orientation
        } else if struck == orientation.opposite() {
            pair.opposite()
        } else {
            orientation.opposite()
        }
    }

    /// Reaction to a beam travelling in `incoming` that was fired by `firer`.
    ///
    /// Total over all four incoming directions for every kind.
    #[instrument(level = "trace", skip(self), fields(kind = %self.kind, owner = %self.owner))]
    pub fn impact(&self, incoming: Direction, firer: Side, own_target: OwnTargetRule) -> Impact {
        // A beam travelling south strikes the north face.
        let struck = incoming.opposite();
        match self.kind {
            PieceKind::Blocker | PieceKind::Emitter => Impact::Absorb,
            PieceKind::Target if self.owner != firer => Impact::Hit,
            PieceKind::Target => match own_target {
                OwnTargetRule::Absorb => Impact::Absorb,
                OwnTargetRule::PassThrough => Impact::PassThrough,
            },
            PieceKind::Mirror45 | PieceKind::Mirror135 | PieceKind::DoubleMirror => {
                Impact::Deflect(Self::line_partner(self.kind, self.orientation, struck))
            }
            PieceKind::Deflector => {
                let front = self.orientation;
                let side = front.rotate_right();
                if struck == front {
                    Impact::Deflect(side)
                } else if struck == side {
                    Impact::Deflect(front)
                } else {
                    Impact::Absorb
                }
            }
        }
    }

    /// The piece after a half-turn of the whole board.
    pub fn point_reflected(self) -> Self {
        Self {
            orientation: self.orientation.opposite(),
            ..self
        }
    }

    /// The piece after flipping the board top to bottom.
    ///
    /// Reflection reverses handedness: the two line mirrors swap kinds, and
    /// the remaining mirrors turn a quarter to restore their geometry.
    pub fn flipped_vertical(self) -> Self {
        let flipped = self.orientation.flip_vertical();
        let (kind, orientation) = match self.kind {
            PieceKind::Mirror45 => (PieceKind::Mirror135, flipped),
            PieceKind::Mirror135 => (PieceKind::Mirror45, flipped),
            PieceKind::DoubleMirror | PieceKind::Deflector => (self.kind, flipped.rotate_left()),
            other => (other, flipped),
        };
        Self {
            kind,
            orientation,
            ..self
        }
    }
}
