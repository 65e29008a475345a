//! Line detection - full rows and columns
//!
//! Detection is read-only: it never mutates the grid, so running it twice
//! without a commit in between yields the same lines. Columns are reported
//! before rows, each in ascending order.

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::piece::Piece;
use crate::types::{Line, BOARD_CELLS, BOARD_SIZE, MAX_LINES};

/// Lines found by one scan
pub type LineSet = ArrayVec<Line, MAX_LINES>;

/// Check if row `y` is completely filled
pub fn scan_row(grid: &Grid, y: u8) -> bool {
    grid.is_row_full(y)
}

/// Check if column `x` is completely filled
pub fn scan_column(grid: &Grid, x: u8) -> bool {
    grid.is_column_full(x)
}

/// Scan every column, then every row, for full lines
pub fn detect(grid: &Grid) -> LineSet {
    let mut lines = LineSet::new();
    for x in 0..BOARD_SIZE {
        if scan_column(grid, x) {
            lines.push(Line::column(x));
        }
    }
    for y in 0..BOARD_SIZE {
        if scan_row(grid, y) {
            lines.push(Line::row(y));
        }
    }
    lines
}

/// Lines that would become full if `piece` were committed at `origin`.
///
/// Only the columns and rows crossing the piece's bounding box can change,
/// so only those are scanned. Returns no lines when the piece does not fit.
pub fn preview(grid: &Grid, piece: &Piece, origin: (i8, i8)) -> LineSet {
    let mut lines = LineSet::new();
    if !grid.fits_at(piece, origin) {
        return lines;
    }

    let size = BOARD_SIZE as usize;
    let mut filled = [false; BOARD_CELLS];
    for (i, cell) in grid.cells().iter().enumerate() {
        filled[i] = cell.is_some();
    }
    for (x, y) in piece.cells_at(origin) {
        filled[y as usize * size + x as usize] = true;
    }

    let (w, h) = piece.size();
    let x0 = origin.0 as usize;
    let y0 = origin.1 as usize;

    for x in x0..(x0 + w as usize).min(size) {
        if (0..size).all(|y| filled[y * size + x]) {
            lines.push(Line::column(x as u8));
        }
    }
    for y in y0..(y0 + h as usize).min(size) {
        if (0..size).all(|x| filled[y * size + x]) {
            lines.push(Line::row(y as u8));
        }
    }
    lines
}
