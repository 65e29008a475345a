use tracing::{debug, warn};

use crate::core::level::load_piece_file;
use crate::core::{AssetError, LevelConfig, LoadPoll, LoadToken, Piece, PieceProvider};

/// Build piece type `index` of `level`, reading its file when it has one
pub fn load_entry(level: &LevelConfig, index: usize) -> Result<Piece, AssetError> {
    let entry = level.pieces.get(index).ok_or(AssetError::UnknownType {
        index,
        count: level.piece_count(),
    })?;
    if let Some(result) = entry.build_inline(index) {
        return result.map_err(|source| AssetError::Load { index, source });
    }
    let path = level
        .piece_path(index)
        .ok_or(AssetError::NotResident { index })?;
    load_piece_file(&path)
        .and_then(|def| def.build(index))
        .map_err(|source| AssetError::Load { index, source })
}

/// Synchronous provider for inline and file-backed pieces
///
/// Pieces are cached once loaded. A level with `preload` set is loaded in
/// full on level start; a piece that fails there is retried on request.
#[derive(Debug, Default)]
pub struct FilePieceCatalog {
    level: Option<LevelConfig>,
    resident: Vec<Option<Piece>>,
}

impl FilePieceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resident_count(&self) -> usize {
        self.resident.iter().filter(|piece| piece.is_some()).count()
    }

    pub fn is_resident(&self, index: usize) -> bool {
        matches!(self.resident.get(index), Some(Some(_)))
    }

    fn load(&mut self, index: usize) -> Result<Piece, AssetError> {
        if let Some(Some(piece)) = self.resident.get(index) {
            return Ok(piece.clone());
        }
        let Some(level) = &self.level else {
            return Err(AssetError::UnknownType { index, count: 0 });
        };
        let piece = load_entry(level, index)?;
        if let Some(slot) = self.resident.get_mut(index) {
            *slot = Some(piece.clone());
        }
        Ok(piece)
    }
}

impl PieceProvider for FilePieceCatalog {
    fn on_level_loaded(&mut self, level: &LevelConfig) -> Result<(), AssetError> {
        self.level = Some(level.clone());
        self.resident = vec![None; level.piece_count()];
        if !level.preload {
            return Ok(());
        }
        for index in 0..level.piece_count() {
            if let Err(error) = self.load(index) {
                warn!(index, error = %error, "piece_preload_failed");
            }
        }
        debug!(
            level = %level.level_name,
            resident = self.resident_count(),
            "catalog_preloaded"
        );
        Ok(())
    }

    fn request(&mut self, token: LoadToken) -> LoadPoll {
        LoadPoll::Ready(self.load(token.type_index))
    }

    fn release_all(&mut self) {
        self.level = None;
        self.resident.clear();
    }
}
