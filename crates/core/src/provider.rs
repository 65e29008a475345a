//! Piece providers - where hand pieces come from
//!
//! The session asks a [`PieceProvider`] for a piece every time a hand slot
//! is refilled. A provider either answers at once ([`LoadPoll::Ready`]) or
//! later, through [`PieceProvider::poll_completed`] on a following tick.
//!
//! Every request carries a [`LoadToken`]. The session applies a completion
//! only when the token's generation is still current and some slot still
//! waits on its `request_id`, so loads that outlive a level never leak into
//! the next one.

use thiserror::Error;

use crate::level::{LevelConfig, LevelError};
use crate::piece::Piece;

/// Identity of one outstanding piece request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadToken {
    /// Session generation the request was issued in
    pub generation: u32,
    /// Unique within the session
    pub request_id: u64,
    /// Slot the request was issued for (may shift before completion)
    pub slot: usize,
    /// Piece type index within the level
    pub type_index: usize,
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("piece type {index} is not in the level (count {count})")]
    UnknownType { index: usize, count: usize },
    #[error("piece type {index} failed to load: {source}")]
    Load {
        index: usize,
        #[source]
        source: LevelError,
    },
    #[error("piece type {index} is not resident")]
    NotResident { index: usize },
    #[error("load cancelled")]
    Cancelled,
}

/// Answer to a piece request
#[derive(Debug)]
pub enum LoadPoll {
    Ready(Result<Piece, AssetError>),
    /// Will be delivered by a later `poll_completed`
    Pending,
}

#[derive(Debug)]
pub struct LoadCompletion {
    pub token: LoadToken,
    pub result: Result<Piece, AssetError>,
}

/// Source of hand pieces for the loaded level
pub trait PieceProvider {
    /// Called once per level load, before any request for that level
    fn on_level_loaded(&mut self, _level: &LevelConfig) -> Result<(), AssetError> {
        Ok(())
    }

    fn request(&mut self, token: LoadToken) -> LoadPoll;

    /// Completions of earlier `Pending` requests
    fn poll_completed(&mut self) -> Vec<LoadCompletion> {
        Vec::new()
    }

    /// Drop resident pieces and abandon outstanding requests
    fn release_all(&mut self);
}

impl<T: PieceProvider + ?Sized> PieceProvider for Box<T> {
    fn on_level_loaded(&mut self, level: &LevelConfig) -> Result<(), AssetError> {
        (**self).on_level_loaded(level)
    }

    fn request(&mut self, token: LoadToken) -> LoadPoll {
        (**self).request(token)
    }

    fn poll_completed(&mut self) -> Vec<LoadCompletion> {
        (**self).poll_completed()
    }

    fn release_all(&mut self) {
        (**self).release_all()
    }
}

/// Synchronous provider for levels whose pieces are all inline
///
/// File-backed entries are reported as not resident; use a file catalog for
/// those.
#[derive(Debug, Default)]
pub struct InlineCatalog {
    pieces: Vec<Option<Piece>>,
}

impl InlineCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resident_count(&self) -> usize {
        self.pieces.iter().filter(|piece| piece.is_some()).count()
    }
}

impl PieceProvider for InlineCatalog {
    fn on_level_loaded(&mut self, level: &LevelConfig) -> Result<(), AssetError> {
        let mut pieces = Vec::with_capacity(level.piece_count());
        for (index, entry) in level.pieces.iter().enumerate() {
            match entry.build_inline(index) {
                Some(result) => {
                    pieces.push(Some(result.map_err(|source| AssetError::Load { index, source })?))
                }
                None => pieces.push(None),
            }
        }
        self.pieces = pieces;
        Ok(())
    }

    fn request(&mut self, token: LoadToken) -> LoadPoll {
        let index = token.type_index;
        let result = match self.pieces.get(index) {
            Some(Some(piece)) => Ok(piece.clone()),
            Some(None) => Err(AssetError::NotResident { index }),
            None => Err(AssetError::UnknownType {
                index,
                count: self.pieces.len(),
            }),
        };
        LoadPoll::Ready(result)
    }

    fn release_all(&mut self) {
        self.pieces.clear();
    }
}
