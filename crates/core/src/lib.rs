//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds every rule of the block-placement puzzle: the 10x10 grid,
//! pieces, placement validation, line detection, the staged clear engine,
//! spawning and the hand. It has **no dependencies** on rendering or input;
//! asset loading and persistence sit behind the [`provider::PieceProvider`]
//! and [`store::KvStore`] traits.
//!
//! # Module Structure
//!
//! - [`grid`]: 10x10 board with range and occupancy checks
//! - [`piece`]: polyomino pieces and the built-in shape set
//! - [`lines`]: full row/column detection and drag preview
//! - [`clear`]: staged clear cycle and the line bomb
//! - [`scoring`]: points for a clear
//! - [`sequencer`]: random or scripted choice of the next piece
//! - [`hand`]: the three slots and their compaction
//! - [`level`]: level files
//! - [`provider`]: piece sources, sync or async
//! - [`store`], [`stats`]: key-value persistence and special tile counters
//! - [`session`]: [`GameSession`], which owns all of the above for one level
//!
//! # Game Rules
//!
//! - A placement is accepted when the piece's bounding box lies on the board
//!   and every tile lands on a free cell.
//! - After each placement every full column and row is cleared. Points come
//!   from the number of lines and the free cells counted before the clear.
//! - Taking a piece out of the hand shifts the later pieces toward slot 0
//!   and a new piece fills the last slot.
//! - The game ends when no piece in the hand fits anywhere.
//!
//! # Example
//!
//! ```
//! use blockfit_core::{GameSession, LevelConfig, SessionConfig, SessionStatus};
//!
//! let mut session = GameSession::in_memory(SessionConfig::default());
//! session.on_level_loaded(LevelConfig::standard()).unwrap();
//! assert_eq!(session.status(), SessionStatus::Playing);
//!
//! let placed = session.try_place(0, (0, 0)).unwrap();
//! assert!(!placed.cells.is_empty());
//! ```

pub mod clear;
pub mod grid;
pub mod hand;
pub mod level;
pub mod lines;
pub mod piece;
pub mod provider;
pub mod rng;
pub mod scoring;
pub mod sequencer;
pub mod session;
pub mod snapshot;
pub mod stats;
pub mod store;

pub use blockfit_types as types;

// Re-export commonly used types for convenience
pub use clear::{clear_band, BandClear, ClearEngine, ClearEvent, ClearPhase, ReleaseStep};
pub use grid::{CellPos, Grid};
pub use hand::{Hand, Slot, SlotState};
pub use level::{LevelConfig, LevelError, PieceDef, PieceEntry, TileDef};
pub use lines::{detect, preview, LineSet};
pub use piece::{Piece, PieceError, PieceTile, STANDARD_SHAPES};
pub use provider::{AssetError, InlineCatalog, LoadCompletion, LoadPoll, LoadToken, PieceProvider};
pub use rng::SimpleRng;
pub use scoring::{ScoreResult, ScoreRule, StandardScore};
pub use sequencer::{Spawn, SpawnSequencer};
pub use session::{
    GameSession, PlaceError, Placement, SessionConfig, SessionEvent, SessionStatus,
};
pub use snapshot::{SessionSnapshot, SlotSnapshot, SlotView};
pub use stats::SpecialTileStats;
pub use store::{JsonFileStore, KvStore, MemoryStore, StoreError};
