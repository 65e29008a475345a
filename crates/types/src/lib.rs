//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no required dependencies, so they can be used
//! from the core rules, the drag glue, asset loaders and the simulator alike.
//! Enable the `serde` feature to (de)serialize them from level files.
//!
//! # Board Dimensions
//!
//! The playfield is a square of `BOARD_SIZE` x `BOARD_SIZE` cells:
//!
//! - **Columns**: indexed 0-9, left to right (`x`)
//! - **Rows**: indexed 0-9, bottom to top (`y`)
//! - **Hand**: `HAND_SLOTS` pieces wait beside the board
//!
//! # Presentation Timing
//!
//! Timing values are in milliseconds. They only pace presentation events; the
//! board state after a clear is the same whatever the delays are.
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `CLEAR_STEP_MS` | 25 | Delay between two release steps of a line clear |
//! | `CELL_DESTROY_MS` | 250 | Per-cell destroy animation length |
//! | `HAND_SHIFT_MS` | 200 | Slide time when the hand compacts |
//! | `HIGHLIGHT_FADE_MS` | 200 | Fade time of the line highlight while dragging |
//!
//! # Examples
//!
//! ```
//! use blockfit_types::{Axis, Line, SpecialKind, TileKind, BOARD_SIZE, HAND_SLOTS};
//!
//! let gem = TileKind::special(SpecialKind::Gem);
//! assert_eq!(gem.special_kind(), Some(SpecialKind::Gem));
//! assert_eq!(TileKind::Normal.special_kind(), None);
//!
//! let line = Line::row(3);
//! assert_eq!(line.axis, Axis::Row);
//!
//! assert_eq!(SpecialKind::from_str("star"), Some(SpecialKind::Star));
//! assert_eq!(BOARD_SIZE, 10);
//! assert_eq!(HAND_SLOTS, 3);
//! ```

/// Board width and height in cells
pub const BOARD_SIZE: u8 = 10;

/// Total number of cells on the board
pub const BOARD_CELLS: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// Number of hand slots holding pieces that wait for placement
pub const HAND_SLOTS: usize = 3;

/// Upper bound of lines one clear can contain (every column and every row)
pub const MAX_LINES: usize = 2 * BOARD_SIZE as usize;

/// Number of adjacent rows or columns removed by a line bomb
pub const BAND_WIDTH: u8 = 3;

/// Tolerance applied to continuous coordinates at the board edges.
///
/// Piece sprites are centered on their cells, so a tile at column 0 sits at
/// `x = 0.0` and may be dragged as far as `-0.5` before leaving the board.
pub const EDGE_TOLERANCE: f32 = 0.5;

/// Delay between two release steps of a staged line clear
pub const CLEAR_STEP_MS: u32 = 25;

/// Length of the per-cell destroy animation
pub const CELL_DESTROY_MS: u32 = 250;

/// Slide time of hand pieces moving toward slot 0
pub const HAND_SHIFT_MS: u32 = 200;

/// Fade time of the highlight shown on lines a dragged piece would complete
pub const HIGHLIGHT_FADE_MS: u32 = 200;


/// Identity carried by special tiles
///
/// Destroying a special tile is counted per kind across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpecialKind {
    Gem,
    Star,
    Diamond,
}

impl SpecialKind {
    /// Every special kind, in declaration order
    pub const ALL: [SpecialKind; 3] = [SpecialKind::Gem, SpecialKind::Star, SpecialKind::Diamond];

    /// Parse special kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfit_types::SpecialKind;
    ///
    /// assert_eq!(SpecialKind::from_str("gem"), Some(SpecialKind::Gem));
    /// assert_eq!(SpecialKind::from_str("Diamond"), Some(SpecialKind::Diamond));
    /// assert_eq!(SpecialKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gem" => Some(SpecialKind::Gem),
            "star" => Some(SpecialKind::Star),
            "diamond" => Some(SpecialKind::Diamond),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialKind::Gem => "gem",
            SpecialKind::Star => "star",
            SpecialKind::Diamond => "diamond",
        }
    }
}

/// What a committed or hand tile is made of
///
/// Special tiles carry their kind plus an optional sprite key the
/// presentation layer uses to draw them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TileKind {
    #[default]
    Normal,
    Special {
        kind: SpecialKind,
        #[cfg_attr(feature = "serde", serde(default))]
        sprite: Option<String>,
    },
}

impl TileKind {
    /// Special tile without a sprite payload
    pub fn special(kind: SpecialKind) -> Self {
        TileKind::Special { kind, sprite: None }
    }

    /// The special kind, if this tile is special
    pub fn special_kind(&self) -> Option<SpecialKind> {
        match self {
            TileKind::Normal => None,
            TileKind::Special { kind, .. } => Some(*kind),
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, TileKind::Special { .. })
    }
}

/// A board cell: `None` when free, the committed tile otherwise
pub type Cell = Option<TileKind>;

/// Orientation of a clearable line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Axis {
    /// Vertical line at a fixed `x`
    Column,
    /// Horizontal line at a fixed `y`
    Row,
}

/// A full row or column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub axis: Axis,
    pub index: u8,
}

impl Line {
    pub fn column(x: u8) -> Self {
        Self {
            axis: Axis::Column,
            index: x,
        }
    }

    pub fn row(y: u8) -> Self {
        Self {
            axis: Axis::Row,
            index: y,
        }
    }
}

/// How a level chooses the next piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlayMode {
    /// Uniform pick over the level's piece types
    #[default]
    Random,
    /// Follow the level's spawn sequence
    #[cfg_attr(feature = "serde", serde(alias = "level_sequence"))]
    Scripted,
}

/// What a scripted sequence does once every entry has been handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SequenceEndBehavior {
    /// Restart from the first entry
    #[default]
    Loop,
    /// Switch to random picks for the rest of the level
    Random,
    /// Stop spawning; the level ends once the hand runs dry
    Stop,
}
