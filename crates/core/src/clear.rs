//! Clear engine - removes full lines with a staged release
//!
//! A clear cycle runs `Idle -> Draining -> Idle`:
//!
//! 1. [`ClearEngine::begin`] snapshots the detected lines into a
//!    [`ClearEvent`]: it counts free cells, computes points, and collects the
//!    special tiles on the lines before anything is freed.
//! 2. While draining, cells are released in a diagonal sweep. At step `i`
//!    every column line frees its cell at `y = SIZE - 1 - i` and every row
//!    line frees its cell at `x = i`. Steps are `step_ms` apart so a
//!    presentation layer can play per-cell destroy effects.
//! 3. Once the last step is released the engine is idle again.
//!
//! The delay is presentation only: [`ClearEngine::finish`] releases every
//! remaining step at once and the grid ends up identical.

use std::collections::HashSet;

use arrayvec::ArrayVec;
use tracing::debug;

use crate::grid::{CellPos, Grid};
use crate::lines::LineSet;
use crate::scoring::ScoreRule;
use crate::types::{Axis, SpecialKind, BAND_WIDTH, BOARD_SIZE, MAX_LINES};

/// Cells freed by one release step
pub type ReleaseStep = ArrayVec<CellPos, MAX_LINES>;

/// Outcome of one detected clear
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearEvent {
    pub lines: LineSet,
    /// One entry per special tile on the cleared lines
    pub destroyed_special: Vec<SpecialKind>,
    /// Free cells at detection time, before any cell was released
    pub empty_before_clear: u32,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearPhase {
    Idle,
    Draining,
}

#[derive(Debug, Clone)]
pub struct ClearEngine {
    step_ms: u32,
    steps: Vec<ReleaseStep>,
    next_step: usize,
    elapsed_ms: u32,
}

impl ClearEngine {
    pub fn new(step_ms: u32) -> Self {
        Self {
            step_ms,
            steps: Vec::new(),
            next_step: 0,
            elapsed_ms: 0,
        }
    }

    pub fn step_ms(&self) -> u32 {
        self.step_ms
    }

    pub fn phase(&self) -> ClearPhase {
        if self.next_step < self.steps.len() {
            ClearPhase::Draining
        } else {
            ClearPhase::Idle
        }
    }

    pub fn is_draining(&self) -> bool {
        self.phase() == ClearPhase::Draining
    }

    /// Steps not yet released
    pub fn pending_steps(&self) -> usize {
        self.steps.len() - self.next_step
    }

    /// Start a clear cycle for `lines`.
    ///
    /// Score inputs and special tiles are read here, while every cell of the
    /// lines is still occupied. Nothing is freed until [`ClearEngine::advance`].
    pub fn begin(&mut self, grid: &Grid, lines: LineSet, rule: &dyn ScoreRule) -> ClearEvent {
        let empty_before_clear = grid.count_empty() as u32;
        let points = rule.points(empty_before_clear, lines.len() as u32);

        let mut seen: HashSet<CellPos> = HashSet::new();
        let mut destroyed_special = Vec::new();
        let mut steps = Vec::with_capacity(BOARD_SIZE as usize);

        for i in 0..BOARD_SIZE {
            let mut step = ReleaseStep::new();
            for line in &lines {
                let pos = match line.axis {
                    Axis::Column => (line.index, BOARD_SIZE - 1 - i),
                    Axis::Row => (i, line.index),
                };
                if !seen.insert(pos) {
                    continue;
                }
                if let Some(Some(tile)) = grid.get(pos.0 as i8, pos.1 as i8) {
                    if let Some(kind) = tile.special_kind() {
                        destroyed_special.push(kind);
                    }
                    step.push(pos);
                }
            }
            if !step.is_empty() {
                steps.push(step);
            }
        }

        debug!(
            lines = lines.len(),
            empty_before_clear,
            points,
            steps = steps.len(),
            "clear_begin"
        );

        self.steps = steps;
        self.next_step = 0;
        self.elapsed_ms = 0;

        ClearEvent {
            lines,
            destroyed_special,
            empty_before_clear,
            points,
        }
    }

    /// Advance the drain timer and free every step that is due.
    ///
    /// Step `k` is due once `k * step_ms` milliseconds have elapsed since
    /// `begin`, so the first step is released by `advance(grid, 0)`.
    pub fn advance(&mut self, grid: &mut Grid, elapsed_ms: u32) -> Vec<ReleaseStep> {
        if !self.is_draining() {
            return Vec::new();
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);

        let mut released = Vec::new();
        while self.next_step < self.steps.len() {
            let due_at = (self.next_step as u32).saturating_mul(self.step_ms);
            if due_at > self.elapsed_ms {
                break;
            }
            released.push(self.release_next(grid));
        }
        released
    }

    /// Release every remaining step immediately
    pub fn finish(&mut self, grid: &mut Grid) -> Vec<ReleaseStep> {
        let mut released = Vec::with_capacity(self.pending_steps());
        while self.next_step < self.steps.len() {
            released.push(self.release_next(grid));
        }
        released
    }

    /// Drop a pending cycle without touching the grid (level teardown)
    pub fn cancel(&mut self) {
        self.steps.clear();
        self.next_step = 0;
        self.elapsed_ms = 0;
    }

    fn release_next(&mut self, grid: &mut Grid) -> ReleaseStep {
        let step = self.steps[self.next_step].clone();
        grid.clear_cells(&step);
        self.next_step += 1;
        step
    }
}

/// Cells freed by a line bomb
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandClear {
    pub axis: Axis,
    pub start: u8,
    pub cells: Vec<CellPos>,
    pub destroyed_special: Vec<SpecialKind>,
}

/// Free `BAND_WIDTH` adjacent rows or columns starting at `start`.
///
/// `start` is clamped so the band stays on the board. Special tiles are
/// collected before their cells are freed.
pub fn clear_band(grid: &mut Grid, axis: Axis, start: u8) -> BandClear {
    let start = start.min(BOARD_SIZE - BAND_WIDTH);
    let mut targets = Vec::with_capacity((BAND_WIDTH as usize) * BOARD_SIZE as usize);
    for line in start..start + BAND_WIDTH {
        for i in 0..BOARD_SIZE {
            targets.push(match axis {
                Axis::Row => (i, line),
                Axis::Column => (line, i),
            });
        }
    }

    let prior = grid.clear_cells(&targets);
    let destroyed_special = prior
        .iter()
        .filter_map(|(_, kind)| kind.special_kind())
        .collect();
    let cells = prior.into_iter().map(|(pos, _)| pos).collect();

    BandClear {
        axis,
        start,
        cells,
        destroyed_special,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::detect;
    use crate::scoring::StandardScore;
    use crate::types::{Line, TileKind};

    fn grid_with_row_and_column() -> Grid {
        Grid::from_rows(&[
            "..#.......",
            "..#.......",
            "..#.......",
            "..#.......",
            "..#.......",
            "..#.......",
            "##g#######",
            "..#.......",
            "..#.......",
            "..#.......",
        ])
    }

    #[test]
    fn test_begin_does_not_free_cells() {
        let grid = grid_with_row_and_column();
        let mut engine = ClearEngine::new(25);
        let lines = detect(&grid);
        assert_eq!(lines.as_slice(), &[Line::column(2), Line::row(3)]);

        let event = engine.begin(&grid, lines, &StandardScore);
        assert_eq!(event.empty_before_clear, 81);
        assert_eq!(event.points, StandardScore.points(81, 2));
        assert!(engine.is_draining());
        assert_eq!(grid.count_empty(), 81);
    }

    #[test]
    fn test_shared_cell_counted_once() {
        let grid = grid_with_row_and_column();
        let mut engine = ClearEngine::new(25);
        let event = engine.begin(&grid, detect(&grid), &StandardScore);

        assert_eq!(event.destroyed_special, vec![SpecialKind::Gem]);
        let total: usize = engine.steps.iter().map(|s| s.len()).sum();
        assert_eq!(total, 19);
    }

    #[test]
    fn test_diagonal_release_order() {
        let mut grid = grid_with_row_and_column();
        let mut engine = ClearEngine::new(25);
        engine.begin(&grid, detect(&grid), &StandardScore);

        let first = engine.advance(&mut grid, 0);
        assert_eq!(first.len(), 1);
        // column 2 from the top, row 3 from the left
        assert_eq!(first[0].as_slice(), &[(2, 9), (0, 3)]);
        assert!(grid.is_free(2, 9));
        assert!(grid.is_occupied(2, 0));

        // not yet due
        assert!(engine.advance(&mut grid, 24).is_empty());
        assert_eq!(engine.advance(&mut grid, 1).len(), 1);

        let rest = engine.advance(&mut grid, 1_000);
        assert_eq!(rest.len(), 8);
        assert!(!engine.is_draining());
        assert_eq!(grid.count_empty(), 100);
    }

    #[test]
    fn test_zero_delay_matches_staged_outcome() {
        let mut staged = grid_with_row_and_column();
        let mut instant = staged.clone();

        let mut a = ClearEngine::new(25);
        a.begin(&staged, detect(&staged), &StandardScore);
        while a.is_draining() {
            a.advance(&mut staged, 25);
        }

        let mut b = ClearEngine::new(0);
        b.begin(&instant, detect(&instant), &StandardScore);
        b.advance(&mut instant, 0);

        assert!(!b.is_draining());
        assert_eq!(staged, instant);
    }

    #[test]
    fn test_finish_and_cancel() {
        let mut grid = grid_with_row_and_column();
        let mut engine = ClearEngine::new(25);
        engine.begin(&grid, detect(&grid), &StandardScore);
        assert_eq!(engine.finish(&mut grid).len(), 10);
        assert_eq!(engine.phase(), ClearPhase::Idle);

        let mut grid = grid_with_row_and_column();
        engine.begin(&grid, detect(&grid), &StandardScore);
        engine.cancel();
        assert!(!engine.is_draining());
        assert!(engine.advance(&mut grid, 100).is_empty());
        assert_eq!(grid.count_empty(), 81);
    }

    #[test]
    fn test_clear_band_rows() {
        let mut grid = Grid::new();
        for x in 0..10 {
            grid.set(x, 4, Some(TileKind::Normal));
        }
        grid.set(0, 5, Some(TileKind::special(SpecialKind::Star)));
        grid.set(0, 7, Some(TileKind::Normal));

        let band = clear_band(&mut grid, Axis::Row, 4);
        assert_eq!(band.cells.len(), 11);
        assert_eq!(band.destroyed_special, vec![SpecialKind::Star]);
        assert!(grid.is_occupied(0, 7));
        assert_eq!(grid.count_empty(), 99);
    }

    #[test]
    fn test_clear_band_start_clamped() {
        let mut grid = Grid::new();
        for y in 0..10 {
            grid.set(9, y, Some(TileKind::Normal));
        }
        let band = clear_band(&mut grid, Axis::Column, 9);
        assert_eq!(band.start, 7);
        assert_eq!(band.cells.len(), 10);
        assert_eq!(grid.count_empty(), 100);
    }
}
