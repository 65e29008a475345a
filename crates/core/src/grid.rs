//! Grid module - manages the 10x10 board
//!
//! The grid is a square of cells where each cell is empty or holds the tile
//! committed there. Uses a flat array for better cache locality.
//! Coordinates: (x, y) where x ranges 0..9 (left to right) and y ranges 0..9
//! (bottom to top).

use tracing::warn;

use crate::piece::Piece;
use crate::types::{Cell, TileKind, BOARD_CELLS, BOARD_SIZE, EDGE_TOLERANCE};

/// A board cell position
pub type CellPos = (u8, u8);

/// The game board - `BOARD_SIZE` x `BOARD_SIZE` cells in a flat array
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Flat array of cells, row-major order (y * SIZE + x)
    cells: [Cell; BOARD_CELLS],
}

impl Grid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|_| None),
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_SIZE as i8 || y < 0 || y >= BOARD_SIZE as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_SIZE as usize) + (x as usize))
    }

    /// Width and height of the grid
    pub fn size(&self) -> u8 {
        BOARD_SIZE
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<&Cell> {
        Self::index(x, y).map(|idx| &self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is within bounds and empty
    pub fn is_free(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Check if position is within bounds and filled
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check whether a bounding box given in continuous board coordinates
    /// lies on the board.
    ///
    /// `origin` is the center of the box's first cell and `extent` the center
    /// of its last cell, so both are compared against the cell edges at
    /// `-0.5` and `SIZE - 0.5`.
    pub fn is_in_range(&self, origin: (f32, f32), extent: (f32, f32)) -> bool {
        let low = -EDGE_TOLERANCE;
        let high = BOARD_SIZE as f32 - EDGE_TOLERANCE;
        origin.0 >= low && extent.0 <= high && origin.1 >= low && extent.1 <= high
    }

    /// Integer form of [`Grid::is_in_range`] for a piece placed at `origin`
    pub fn piece_in_range(&self, piece: &Piece, origin: (i8, i8)) -> bool {
        let (w, h) = piece.size();
        let first = (origin.0 as f32, origin.1 as f32);
        let last = (first.0 + (w as f32 - 1.0), first.1 + (h as f32 - 1.0));
        self.is_in_range(first, last)
    }

    /// Check that every tile of `piece` placed at `origin` lands on a free cell.
    ///
    /// Tiles mapped outside the board never count as free.
    pub fn is_empty(&self, piece: &Piece, origin: (i8, i8)) -> bool {
        piece
            .cells_at(origin)
            .all(|(x, y)| self.is_free(x, y))
    }

    /// In range and empty: the piece could be committed at `origin`
    pub fn fits_at(&self, piece: &Piece, origin: (i8, i8)) -> bool {
        self.piece_in_range(piece, origin) && self.is_empty(piece, origin)
    }

    /// Check whether the piece fits anywhere on the grid
    pub fn fits_anywhere(&self, piece: &Piece) -> bool {
        let size = BOARD_SIZE as i8;
        (0..size).any(|y| (0..size).any(|x| self.fits_at(piece, (x, y))))
    }

    /// Commit a piece onto the grid, copying each tile's kind (special kind
    /// and sprite included) into its cell.
    ///
    /// Returns the number of cells written. Tiles outside the board are
    /// skipped; callers validate with [`Grid::fits_at`] first.
    pub fn commit(&mut self, piece: &Piece, origin: (i8, i8)) -> usize {
        let mut written = 0;
        for tile in piece.tiles() {
            let x = origin.0 + tile.offset.0;
            let y = origin.1 + tile.offset.1;
            if self.set(x, y, Some(tile.kind.clone())) {
                written += 1;
            } else {
                warn!(x, y, piece = piece.id(), "commit_tile_out_of_bounds");
            }
        }
        written
    }

    /// Free the given cells, returning the prior tile of each occupied one
    pub fn clear_cells(&mut self, cells: &[CellPos]) -> Vec<(CellPos, TileKind)> {
        let mut prior = Vec::with_capacity(cells.len());
        for &(x, y) in cells {
            if let Some(idx) = Self::index(x as i8, y as i8) {
                if let Some(kind) = self.cells[idx].take() {
                    prior.push(((x, y), kind));
                }
            }
        }
        prior
    }

    /// Number of free cells
    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: u8) -> bool {
        if y >= BOARD_SIZE {
            return false;
        }
        let start = y as usize * BOARD_SIZE as usize;
        let end = start + BOARD_SIZE as usize;
        self.cells[start..end].iter().all(|cell| cell.is_some())
    }

    /// Check if a column is completely filled
    pub fn is_column_full(&self, x: u8) -> bool {
        if x >= BOARD_SIZE {
            return false;
        }
        (0..BOARD_SIZE as usize)
            .all(|y| self.cells[y * BOARD_SIZE as usize + x as usize].is_some())
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire grid
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Write a compact view of the grid: 0 = empty, 1 = normal tile,
    /// 2.. = special tile (gem, star, diamond).
    pub fn write_u8_grid(&self, out: &mut [[u8; BOARD_SIZE as usize]; BOARD_SIZE as usize]) {
        for (y, row) in out.iter_mut().enumerate() {
            for (x, slot) in row.iter_mut().enumerate() {
                *slot = match &self.cells[y * BOARD_SIZE as usize + x] {
                    None => 0,
                    Some(TileKind::Normal) => 1,
                    Some(TileKind::Special { kind, .. }) => 2 + *kind as u8,
                };
            }
        }
    }

    /// Build a grid from rows of text for tests: `.` is empty, `#` normal,
    /// `g`/`s`/`d` special. The first string is the top row (y = SIZE - 1).
    #[cfg(test)]
    pub fn from_rows(rows: &[&str]) -> Self {
        use crate::types::SpecialKind;

        assert_eq!(rows.len(), BOARD_SIZE as usize);
        let mut grid = Self::new();
        for (i, row) in rows.iter().enumerate() {
            let y = BOARD_SIZE as i8 - 1 - i as i8;
            assert_eq!(row.len(), BOARD_SIZE as usize);
            for (x, ch) in row.chars().enumerate() {
                let cell = match ch {
                    '#' => Some(TileKind::Normal),
                    'g' => Some(TileKind::special(SpecialKind::Gem)),
                    's' => Some(TileKind::special(SpecialKind::Star)),
                    'd' => Some(TileKind::special(SpecialKind::Diamond)),
                    _ => None,
                };
                grid.set(x as i8, y, cell);
            }
        }
        grid
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
