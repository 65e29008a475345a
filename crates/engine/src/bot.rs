//! Greedy placement bot used by the simulator and benchmarks.
//!
//! Every ready piece is tried at every origin where it fits. A move is
//! ranked by the lines it completes first, then by how many of the piece's
//! neighbours are walls or occupied cells (tight packing), then by the
//! lowest slot and origin so the choice is deterministic.

use crate::core::{lines, GameSession, Grid, KvStore, Piece, PieceProvider};
use crate::types::BOARD_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotMove {
    pub slot: usize,
    pub origin: (i8, i8),
    pub lines: usize,
    pub contact: u32,
}

impl BotMove {
    fn rank(&self) -> (usize, u32) {
        (self.lines, self.contact)
    }
}

/// Best move for the current hand, or `None` when nothing fits
pub fn best_move<S: KvStore, P: PieceProvider>(session: &GameSession<S, P>) -> Option<BotMove> {
    if session.is_clearing() {
        return None;
    }
    let grid = session.grid();
    let mut best: Option<BotMove> = None;

    for (slot, state) in session.hand().slots().iter().enumerate() {
        let Some(piece) = state.piece() else {
            continue;
        };
        let size = BOARD_SIZE as i8;
        for y in 0..size {
            for x in 0..size {
                let origin = (x, y);
                if !grid.fits_at(piece, origin) {
                    continue;
                }
                let candidate = BotMove {
                    slot,
                    origin,
                    lines: lines::preview(grid, piece, origin).len(),
                    contact: contact(grid, piece, origin),
                };
                if best.map_or(true, |b| candidate.rank() > b.rank()) {
                    best = Some(candidate);
                }
            }
        }
    }
    best
}

fn contact(grid: &Grid, piece: &Piece, origin: (i8, i8)) -> u32 {
    let mut count = 0;
    for (x, y) in piece.cells_at(origin) {
        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let (nx, ny) = (x + dx, y + dy);
            if piece.covers(origin, nx, ny) {
                continue;
            }
            // off-board neighbours count as walls
            if !grid.is_free(nx, ny) {
                count += 1;
            }
        }
    }
    count
}
