//! Piece module - polyomino shapes held in the hand
//!
//! A piece is an ordered list of tiles, each an offset from the piece origin
//! (its bottom-left bounding-box cell) plus the tile kind that will be copied
//! onto the grid when the piece is committed.

use thiserror::Error;

use crate::types::{TileKind, BOARD_SIZE};

/// Offset of a single tile relative to the piece origin
pub type TileOffset = (i8, i8);

/// One tile of a piece
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PieceTile {
    pub offset: TileOffset,
    pub kind: TileKind,
}

impl PieceTile {
    pub fn normal(offset: TileOffset) -> Self {
        Self {
            offset,
            kind: TileKind::Normal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PieceError {
    #[error("piece has no tiles")]
    Empty,
    #[error("tile offset ({0}, {1}) is negative")]
    NegativeOffset(i8, i8),
    #[error("tile offset ({0}, {1}) appears twice")]
    DuplicateOffset(i8, i8),
    #[error("piece spans {0}x{1} cells, larger than the board")]
    TooLarge(u8, u8),
}

/// An immutable polyomino of a given piece type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    id: usize,
    tiles: Vec<PieceTile>,
    size: (u8, u8),
}

impl Piece {
    /// Build a piece of type `id` from its tiles.
    ///
    /// Offsets must be non-negative and unique; the bounding size is derived
    /// from the largest offsets.
    pub fn new(id: usize, tiles: Vec<PieceTile>) -> Result<Self, PieceError> {
        if tiles.is_empty() {
            return Err(PieceError::Empty);
        }

        let mut max_x: i8 = 0;
        let mut max_y: i8 = 0;
        for (i, tile) in tiles.iter().enumerate() {
            let (dx, dy) = tile.offset;
            if dx < 0 || dy < 0 {
                return Err(PieceError::NegativeOffset(dx, dy));
            }
            if tiles[..i].iter().any(|other| other.offset == tile.offset) {
                return Err(PieceError::DuplicateOffset(dx, dy));
            }
            max_x = max_x.max(dx);
            max_y = max_y.max(dy);
        }

        let w = max_x as u8 + 1;
        let h = max_y as u8 + 1;
        if w > BOARD_SIZE || h > BOARD_SIZE {
            return Err(PieceError::TooLarge(w, h));
        }

        Ok(Self {
            id,
            tiles,
            size: (w, h),
        })
    }

    /// Build a piece made only of normal tiles
    pub fn from_offsets(id: usize, offsets: &[TileOffset]) -> Result<Self, PieceError> {
        Self::new(id, offsets.iter().copied().map(PieceTile::normal).collect())
    }

    /// Piece type index within the level
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn tiles(&self) -> &[PieceTile] {
        &self.tiles
    }

    /// Bounding box as (width, height)
    pub fn size(&self) -> (u8, u8) {
        self.size
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Board cells covered when placed at `origin`
    pub fn cells_at(&self, origin: (i8, i8)) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.tiles
            .iter()
            .map(move |tile| (origin.0 + tile.offset.0, origin.1 + tile.offset.1))
    }

    /// Check whether the piece has a tile on board cell (x, y) when placed at `origin`
    pub fn covers(&self, origin: (i8, i8), x: i8, y: i8) -> bool {
        self.cells_at(origin).any(|cell| cell == (x, y))
    }

    pub fn has_special(&self) -> bool {
        self.tiles.iter().any(|tile| tile.kind.is_special())
    }
}

/// Shapes of the standard piece set, by name
///
/// Every shape is anchored at (0, 0) in its bottom-left corner.
pub const STANDARD_SHAPES: [(&str, &[TileOffset]); 19] = [
    ("dot", &[(0, 0)]),
    ("i2_h", &[(0, 0), (1, 0)]),
    ("i2_v", &[(0, 0), (0, 1)]),
    ("i3_h", &[(0, 0), (1, 0), (2, 0)]),
    ("i3_v", &[(0, 0), (0, 1), (0, 2)]),
    ("i4_h", &[(0, 0), (1, 0), (2, 0), (3, 0)]),
    ("i4_v", &[(0, 0), (0, 1), (0, 2), (0, 3)]),
    ("i5_h", &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]),
    ("i5_v", &[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]),
    ("square2", &[(0, 0), (1, 0), (0, 1), (1, 1)]),
    (
        "square3",
        &[
            (0, 0),
            (1, 0),
            (2, 0),
            (0, 1),
            (1, 1),
            (2, 1),
            (0, 2),
            (1, 2),
            (2, 2),
        ],
    ),
    ("corner2_bl", &[(0, 0), (1, 0), (0, 1)]),
    ("corner2_br", &[(0, 0), (1, 0), (1, 1)]),
    ("corner2_tl", &[(0, 0), (0, 1), (1, 1)]),
    ("corner2_tr", &[(1, 0), (0, 1), (1, 1)]),
    ("corner3_bl", &[(0, 0), (1, 0), (2, 0), (0, 1), (0, 2)]),
    ("corner3_br", &[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]),
    ("corner3_tl", &[(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)]),
    ("corner3_tr", &[(2, 0), (2, 1), (0, 2), (1, 2), (2, 2)]),
];
