//! Scoring module - points granted for a line clear
//!
//! The clear engine only supplies the inputs: the number of free cells
//! counted when the lines were detected (before any cell is freed) and the
//! number of lines in the clear. The formula itself sits behind
//! [`ScoreRule`] so a host game can swap it.

use crate::types::{BOARD_CELLS, BOARD_SIZE};

/// Points awarded per line in a clear of `n` lines grow as 10, 20, 30, ...
pub const LINE_POINTS_STEP: u32 = 10;

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Points for the lines themselves
    pub line_points: u32,
    /// Bonus for clearing on a crowded board
    pub crowd_bonus: u32,
    pub total: u32,
}

/// Converts clear inputs into points
pub trait ScoreRule {
    fn score(&self, empty_before_clear: u32, lines: u32) -> ScoreResult;

    fn points(&self, empty_before_clear: u32, lines: u32) -> u32 {
        self.score(empty_before_clear, lines).total
    }
}

/// Default rule: triangular line points plus one point per occupied row's
/// worth of cells on the board at detection time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScore;

impl ScoreRule for StandardScore {
    fn score(&self, empty_before_clear: u32, lines: u32) -> ScoreResult {
        if lines == 0 {
            return ScoreResult::default();
        }
        let line_points = calculate_line_points(lines);
        let crowd_bonus = calculate_crowd_bonus(empty_before_clear);
        ScoreResult {
            line_points,
            crowd_bonus,
            total: line_points.saturating_add(crowd_bonus),
        }
    }
}

/// Line points for a clear of `lines` lines: 10, 30, 60, 100, ...
pub fn calculate_line_points(lines: u32) -> u32 {
    LINE_POINTS_STEP.saturating_mul(lines.saturating_mul(lines + 1) / 2)
}

/// One point per `BOARD_SIZE` occupied cells
pub fn calculate_crowd_bonus(empty_before_clear: u32) -> u32 {
    let occupied = (BOARD_CELLS as u32).saturating_sub(empty_before_clear);
    occupied / BOARD_SIZE as u32
}
