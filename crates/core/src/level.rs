//! Level configuration - piece list, play mode and spawn script
//!
//! Levels are JSON documents:
//!
//! ```json
//! {
//!   "level_name": "tutorial",
//!   "play_mode": "scripted",
//!   "spawn_sequence": [0, 0, 1],
//!   "sequence_end_behavior": "stop",
//!   "pieces": [
//!     { "display_name": "Dot", "tiles": [{ "x": 0, "y": 0 }] },
//!     { "key": "gem_bar", "file": "pieces/gem_bar.json" }
//!   ]
//! }
//! ```
//!
//! A piece entry either carries its tiles inline or names a piece file,
//! resolved relative to the level file's directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::piece::{Piece, PieceError, PieceTile, STANDARD_SHAPES};
use crate::types::{PlayMode, SequenceEndBehavior, TileKind};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid level json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("piece {index} has neither tiles nor a file")]
    MissingShape { index: usize },
    #[error("piece {index} sets both tiles and a file")]
    AmbiguousShape { index: usize },
    #[error("piece {index} is invalid: {source}")]
    InvalidPiece {
        index: usize,
        #[source]
        source: PieceError,
    },
}

/// One tile of a piece definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDef {
    pub x: i8,
    pub y: i8,
    #[serde(default)]
    pub kind: TileKind,
    /// Visual-only child; never becomes a tile
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub decorative: bool,
}

impl TileDef {
    pub fn normal(x: i8, y: i8) -> Self {
        Self {
            x,
            y,
            kind: TileKind::Normal,
            decorative: false,
        }
    }
}

/// Shape of a piece as stored in a piece file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceDef {
    pub tiles: Vec<TileDef>,
}

impl PieceDef {
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the piece for type `id`, dropping decorative tiles
    pub fn build(&self, id: usize) -> Result<Piece, LevelError> {
        build_tiles(id, &self.tiles)
    }
}

fn build_tiles(id: usize, tiles: &[TileDef]) -> Result<Piece, LevelError> {
    let tiles = tiles
        .iter()
        .filter(|tile| !tile.decorative)
        .map(|tile| PieceTile {
            offset: (tile.x, tile.y),
            kind: tile.kind.clone(),
        })
        .collect();
    Piece::new(id, tiles).map_err(|source| LevelError::InvalidPiece { index: id, source })
}

/// Read a piece file from disk
pub fn load_piece_file(path: &Path) -> Result<PieceDef, LevelError> {
    let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    PieceDef::from_json(&text)
}

/// A piece type offered by a level
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PieceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiles: Vec<TileDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl PieceEntry {
    pub fn inline(name: &str, tiles: Vec<TileDef>) -> Self {
        Self {
            display_name: Some(name.to_string()),
            tiles,
            ..Self::default()
        }
    }

    /// Build the piece from inline tiles; `None` for file-backed entries
    pub fn build_inline(&self, id: usize) -> Option<Result<Piece, LevelError>> {
        if self.file.is_some() {
            return None;
        }
        Some(build_tiles(id, &self.tiles))
    }
}

fn default_preload() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level_name: String,
    pub pieces: Vec<PieceEntry>,
    #[serde(default)]
    pub play_mode: PlayMode,
    #[serde(default)]
    pub spawn_sequence: Vec<usize>,
    #[serde(default)]
    pub sequence_end_behavior: SequenceEndBehavior,
    /// Load every piece when the level starts instead of on first request
    #[serde(default = "default_preload")]
    pub preload: bool,
    /// Directory piece files are resolved against; set by [`LevelConfig::load`]
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl LevelConfig {
    /// Parse and validate a level document
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(text)?;
        level.validate()?;
        Ok(level)
    }

    /// Read a level file; piece files resolve relative to its directory
    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut level = Self::from_json(&text)?;
        level.base_dir = path.parent().map(Path::to_path_buf);
        Ok(level)
    }

    /// Random level over the built-in shapes
    pub fn standard() -> Self {
        let pieces = STANDARD_SHAPES
            .iter()
            .map(|(name, offsets)| {
                let tiles = offsets.iter().map(|&(x, y)| TileDef::normal(x, y)).collect();
                PieceEntry::inline(name, tiles)
            })
            .collect();
        Self {
            level_name: "standard".to_string(),
            pieces,
            play_mode: PlayMode::Random,
            spawn_sequence: Vec::new(),
            sequence_end_behavior: SequenceEndBehavior::Loop,
            preload: true,
            base_dir: None,
        }
    }

    /// Check that every entry names exactly one shape source
    pub fn validate(&self) -> Result<(), LevelError> {
        for (index, entry) in self.pieces.iter().enumerate() {
            match (entry.tiles.is_empty(), entry.file.is_some()) {
                (true, false) => return Err(LevelError::MissingShape { index }),
                (false, true) => return Err(LevelError::AmbiguousShape { index }),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Display names of the piece types: display name, else key, else a
    /// positional placeholder
    pub fn piece_names(&self) -> Vec<String> {
        self.pieces
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                entry
                    .display_name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .or_else(|| entry.key.clone().filter(|key| !key.is_empty()))
                    .unwrap_or_else(|| format!("Piece [{i}]"))
            })
            .collect()
    }

    /// Path of a file-backed entry, resolved against `base_dir`
    pub fn piece_path(&self, index: usize) -> Option<PathBuf> {
        let file = self.pieces.get(index)?.file.as_ref()?;
        Some(match &self.base_dir {
            Some(base) if file.is_relative() => base.join(file),
            _ => file.clone(),
        })
    }
}
