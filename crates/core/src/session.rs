//! Game session - owns one level's board, hand and clear cycle
//!
//! The session ties the core components together and is driven entirely by
//! explicit calls from the host:
//!
//! - [`GameSession::on_level_loaded`] / [`GameSession::on_level_unloaded`]
//!   (re)initialize and tear down a level
//! - [`GameSession::try_place`] validates and commits a placement, runs line
//!   detection, begins the clear cycle and refills the hand
//! - [`GameSession::tick`] applies asynchronous piece loads and releases due
//!   clear steps
//! - [`GameSession::drain_events`] hands presentation events to the host
//!
//! Every piece request is tagged with the session generation. Unloading or
//! reloading a level bumps the generation, so completions of requests from
//! an earlier level are discarded instead of filling the new hand.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clear::{clear_band, BandClear, ClearEngine, ClearEvent, ReleaseStep};
use crate::grid::{CellPos, Grid};
use crate::hand::{Hand, SlotState};
use crate::level::LevelConfig;
use crate::lines::{self, LineSet};
use crate::piece::Piece;
use crate::provider::{AssetError, InlineCatalog, LoadCompletion, LoadPoll, LoadToken, PieceProvider};
use crate::rng::SimpleRng;
use crate::scoring::{ScoreRule, StandardScore};
use crate::sequencer::{Spawn, SpawnSequencer};
use crate::stats::SpecialTileStats;
use crate::store::{KvStore, MemoryStore, StoreError};
use crate::types::{Axis, PlayMode, SpecialKind, BAND_WIDTH, BOARD_SIZE, CLEAR_STEP_MS, HAND_SLOTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Seed of the spawn and line-bomb random source
    pub seed: u32,
    /// Delay between clear release steps; 0 clears in one go
    pub clear_step_ms: u32,
    /// Skip saved hand slots when the level runs a scripted sequence
    pub ignore_saved_slots_when_scripted: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            clear_step_ms: CLEAR_STEP_MS,
            ignore_saved_slots_when_scripted: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No level loaded
    Idle,
    Playing,
    /// A clear is still releasing cells; placement resumes afterwards
    WaitingForClear,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("no level is being played")]
    NotPlayable,
    #[error("slot index is outside the hand")]
    InvalidSlot,
    #[error("slot holds no ready piece")]
    EmptySlot,
    #[error("a line clear is still in progress")]
    ClearInProgress,
    #[error("piece would extend past the board")]
    OutOfRange,
    #[error("piece overlaps an occupied cell")]
    Occupied,
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::NotPlayable => "not_playable",
            PlaceError::InvalidSlot | PlaceError::EmptySlot => "empty_slot",
            PlaceError::ClearInProgress => "clear_in_progress",
            PlaceError::OutOfRange => "out_of_range",
            PlaceError::Occupied => "occupied",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlaceError::NotPlayable => "no level is being played",
            PlaceError::InvalidSlot => "slot index is outside the hand",
            PlaceError::EmptySlot => "slot holds no ready piece",
            PlaceError::ClearInProgress => "a line clear is still in progress",
            PlaceError::OutOfRange => "piece would extend past the board",
            PlaceError::Occupied => "piece overlaps an occupied cell",
        }
    }
}

/// An accepted placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub slot: usize,
    pub piece_id: usize,
    pub origin: (i8, i8),
    pub cells: Vec<CellPos>,
    pub lines: LineSet,
    pub points: u32,
}

/// Presentation events, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Placed {
        slot: usize,
        piece_id: usize,
        origin: (i8, i8),
        cells: Vec<CellPos>,
    },
    LinesCleared(ClearEvent),
    /// One release step of a clear; `delay_ms` is the spacing between steps
    CellsReleased { cells: ReleaseStep, delay_ms: u32 },
    SpecialDestroyed(SpecialKind),
    BandCleared {
        axis: Axis,
        start: u8,
        cells: Vec<CellPos>,
    },
    SlotFilled { slot: usize, piece_id: usize },
    SlotEmptied { slot: usize },
    /// Slots after `removed` moved one place toward slot 0
    HandShifted { removed: usize, moved: usize },
    MovableChanged { slot: usize, movable: bool },
    GameOver { score: u32 },
    LoadFailed {
        slot: usize,
        type_index: usize,
        error: String,
    },
}

pub struct GameSession<S: KvStore, P: PieceProvider> {
    config: SessionConfig,
    grid: Grid,
    hand: Hand,
    sequencer: SpawnSequencer,
    clear: ClearEngine,
    rule: Box<dyn ScoreRule>,
    store: S,
    provider: P,
    stats: SpecialTileStats,
    rng: SimpleRng,
    level: Option<LevelConfig>,
    generation: u32,
    next_request_id: u64,
    status: SessionStatus,
    score: u32,
    moves: u32,
    lines_cleared: u32,
    events: Vec<SessionEvent>,
}

impl GameSession<MemoryStore, InlineCatalog> {
    /// Session with an in-memory store and inline pieces
    pub fn in_memory(config: SessionConfig) -> Self {
        Self::new(config, MemoryStore::new(), InlineCatalog::new())
    }
}

impl<S: KvStore, P: PieceProvider> GameSession<S, P> {
    pub fn new(config: SessionConfig, store: S, provider: P) -> Self {
        let stats = SpecialTileStats::load(&store);
        Self {
            config,
            grid: Grid::new(),
            hand: Hand::new(),
            sequencer: SpawnSequencer::random(0, config.seed),
            clear: ClearEngine::new(config.clear_step_ms),
            rule: Box::new(StandardScore),
            store,
            provider,
            stats,
            rng: SimpleRng::new(config.seed ^ 0x9e37_79b9),
            level: None,
            generation: 0,
            next_request_id: 1,
            status: SessionStatus::Idle,
            score: 0,
            moves: 0,
            lines_cleared: 0,
            events: Vec::new(),
        }
    }

    /// Replace the scoring rule
    pub fn with_score_rule(mut self, rule: Box<dyn ScoreRule>) -> Self {
        self.rule = rule;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn sequencer(&self) -> &SpawnSequencer {
        &self.sequencer
    }

    pub fn level(&self) -> Option<&LevelConfig> {
        self.level.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status == SessionStatus::GameOver
    }

    pub fn is_clearing(&self) -> bool {
        self.clear.is_draining()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn stats(&self) -> &SpecialTileStats {
        &self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start `level`, unloading the current one first.
    ///
    /// The board, hand and score start fresh. Saved hand slots are restored
    /// when allowed, then every remaining empty slot is refilled in order.
    pub fn on_level_loaded(&mut self, level: LevelConfig) -> Result<(), AssetError> {
        if self.level.is_some() {
            self.on_level_unloaded();
        }

        self.generation = self.generation.wrapping_add(1);
        self.grid.reset();
        self.hand.clear();
        self.clear = ClearEngine::new(self.config.clear_step_ms);
        self.score = 0;
        self.moves = 0;
        self.lines_cleared = 0;

        self.provider.on_level_loaded(&level)?;
        self.sequencer = SpawnSequencer::from_level(&level, self.config.seed);
        info!(
            level = %level.level_name,
            pieces = level.piece_count(),
            mode = ?level.play_mode,
            generation = self.generation,
            "level_loaded"
        );
        self.level = Some(level);
        self.status = SessionStatus::Playing;

        // restored pieces keep their saved slots
        self.restore_saved_slots();
        self.fill_empty_slots();
        self.evaluate();
        Ok(())
    }

    /// Tear the level down; outstanding loads are abandoned
    pub fn on_level_unloaded(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.provider.release_all();
        self.grid.reset();
        self.hand.clear();
        self.clear.cancel();
        if let Some(level) = self.level.take() {
            info!(level = %level.level_name, generation = self.generation, "level_unloaded");
        }
        self.status = SessionStatus::Idle;
    }

    /// Advance time: apply finished piece loads and release due clear steps
    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.level.is_none() {
            return;
        }

        let completions = self.provider.poll_completed();
        let mut changed = !completions.is_empty();
        let mut failed = false;
        for completion in completions {
            failed |= !self.apply_completion(completion);
        }
        if failed {
            self.refill_empty_slots();
        }

        if self.clear.is_draining() {
            let steps = self.clear.advance(&mut self.grid, elapsed_ms);
            changed |= !steps.is_empty();
            self.push_release_steps(steps);
        }

        if changed {
            self.evaluate();
        }
    }

    /// Release every pending clear step now
    pub fn finish_clear(&mut self) {
        if !self.clear.is_draining() {
            return;
        }
        let steps = self.clear.finish(&mut self.grid);
        self.push_release_steps(steps);
        self.evaluate();
    }

    /// Lines that would clear if the piece in `slot` were dropped at `origin`
    pub fn preview(&self, slot: usize, origin: (i8, i8)) -> LineSet {
        match self.hand.piece(slot) {
            Some(piece) if !self.clear.is_draining() => lines::preview(&self.grid, piece, origin),
            _ => LineSet::new(),
        }
    }

    /// Check whether the piece in `slot` could be placed at `origin`
    pub fn can_place(&self, slot: usize, origin: (i8, i8)) -> Result<(), PlaceError> {
        self.check_place(slot, origin).map(|_| ())
    }

    fn check_place(&self, slot: usize, origin: (i8, i8)) -> Result<&Piece, PlaceError> {
        match self.status {
            SessionStatus::Playing => {}
            SessionStatus::WaitingForClear => return Err(PlaceError::ClearInProgress),
            SessionStatus::Idle | SessionStatus::GameOver => return Err(PlaceError::NotPlayable),
        }
        if self.clear.is_draining() {
            return Err(PlaceError::ClearInProgress);
        }
        if slot >= HAND_SLOTS {
            return Err(PlaceError::InvalidSlot);
        }
        let piece = self.hand.piece(slot).ok_or(PlaceError::EmptySlot)?;
        if !self.grid.piece_in_range(piece, origin) {
            return Err(PlaceError::OutOfRange);
        }
        if !self.grid.is_empty(piece, origin) {
            return Err(PlaceError::Occupied);
        }
        Ok(piece)
    }

    /// Place the piece in `slot` with its origin on cell `origin`.
    ///
    /// Rejections leave the session untouched. On success the piece is
    /// committed, full lines start clearing (points are granted right away),
    /// the hand closes its gaps toward slot 0 and every empty slot is
    /// refilled while the sequencer can spawn.
    pub fn try_place(&mut self, slot: usize, origin: (i8, i8)) -> Result<Placement, PlaceError> {
        self.check_place(slot, origin)?;
        let Some(piece) = self.hand.take(slot) else {
            return Err(PlaceError::EmptySlot);
        };

        self.grid.commit(&piece, origin);
        let cells: Vec<CellPos> = piece
            .cells_at(origin)
            .map(|(x, y)| (x as u8, y as u8))
            .collect();
        self.moves += 1;
        debug!(slot, piece = piece.id(), x = origin.0, y = origin.1, "piece_placed");
        self.events.push(SessionEvent::Placed {
            slot,
            piece_id: piece.id(),
            origin,
            cells: cells.clone(),
        });

        let detected = lines::detect(&self.grid);
        let mut points = 0;
        if !detected.is_empty() {
            points = self.begin_clear(detected.clone());
        }

        self.refill_empty_slots();
        let empty: Vec<usize> = self.hand.empty_slots().collect();
        for slot in empty {
            self.events.push(SessionEvent::SlotEmptied { slot });
        }

        self.evaluate();

        Ok(Placement {
            slot,
            piece_id: piece.id(),
            origin,
            cells,
            lines: detected,
            points,
        })
    }

    /// Clear `BAND_WIDTH` rows or columns at a random position.
    ///
    /// The band follows the piece in slot 0: rows for a piece at least as
    /// wide as it is tall, columns otherwise. No points are awarded.
    pub fn use_line_bomb(&mut self) -> Option<BandClear> {
        if !self.can_clear_band() {
            return None;
        }
        let (w, h) = self.hand.piece(0)?.size();
        let axis = if w >= h { Axis::Row } else { Axis::Column };
        let start = self.rng.next_range((BOARD_SIZE - BAND_WIDTH + 1) as u32) as u8;
        self.clear_band_at(axis, start)
    }

    /// Clear a band at a chosen position (line bomb with a fixed target).
    ///
    /// Returns `None` without touching anything when no level is loaded or
    /// a line clear is still draining. A band cleared after game over
    /// re-evaluates the hand and resumes play if a piece fits again.
    pub fn clear_band_at(&mut self, axis: Axis, start: u8) -> Option<BandClear> {
        if !self.can_clear_band() {
            debug!(status = self.status.as_str(), "line_bomb_rejected");
            return None;
        }
        let band = clear_band(&mut self.grid, axis, start);
        info!(axis = ?band.axis, start = band.start, cells = band.cells.len(), "line_bomb");
        self.record_specials(&band.destroyed_special);
        self.events.push(SessionEvent::BandCleared {
            axis: band.axis,
            start: band.start,
            cells: band.cells.clone(),
        });
        self.evaluate();
        Some(band)
    }

    fn can_clear_band(&self) -> bool {
        matches!(self.status, SessionStatus::Playing | SessionStatus::GameOver)
            && !self.clear.is_draining()
    }

    /// Persist the hand under the level's namespaced slot keys.
    ///
    /// Empty slots are written as `-1`, which reads back as no saved piece.
    pub fn save_hand(&mut self) -> Result<(), StoreError> {
        let Some(level) = &self.level else {
            return Ok(());
        };
        for slot in 0..HAND_SLOTS {
            let value = match self.hand.get(slot).map(|s| &s.state) {
                Some(SlotState::Ready(piece)) => piece.id() as i64,
                Some(SlotState::Loading(token)) => token.type_index as i64,
                _ => -1,
            };
            self.store.set_int(&slot_key(&level.level_name, slot), value);
        }
        self.store.flush()
    }

    /// Zero the lifetime special tile counters
    pub fn reset_stats(&mut self) -> Result<(), StoreError> {
        self.stats.reset(&mut self.store);
        self.store.flush()
    }

    fn begin_clear(&mut self, detected: LineSet) -> u32 {
        let event = self.clear.begin(&self.grid, detected, self.rule.as_ref());
        self.score = self.score.saturating_add(event.points);
        self.lines_cleared += event.lines.len() as u32;
        info!(
            lines = event.lines.len(),
            points = event.points,
            score = self.score,
            "lines_cleared"
        );

        self.record_specials(&event.destroyed_special);
        let points = event.points;
        self.events.push(SessionEvent::LinesCleared(event));

        let steps = self.clear.advance(&mut self.grid, 0);
        self.push_release_steps(steps);
        points
    }

    fn record_specials(&mut self, kinds: &[SpecialKind]) {
        if kinds.is_empty() {
            return;
        }
        for &kind in kinds {
            self.stats.record(kind, &mut self.store);
            self.events.push(SessionEvent::SpecialDestroyed(kind));
        }
        if let Err(error) = self.store.flush() {
            warn!(error = %error, "stats_flush_failed");
        }
    }

    fn push_release_steps(&mut self, steps: Vec<ReleaseStep>) {
        let delay_ms = self.clear.step_ms();
        self.events.extend(
            steps
                .into_iter()
                .map(|cells| SessionEvent::CellsReleased { cells, delay_ms }),
        );
    }

    fn restore_saved_slots(&mut self) {
        let Some(level) = &self.level else {
            return;
        };
        if self.config.ignore_saved_slots_when_scripted && level.play_mode == PlayMode::Scripted {
            return;
        }
        let name = level.level_name.clone();
        let count = level.piece_count();

        for slot in 0..HAND_SLOTS {
            let saved = self
                .store
                .get_int(&slot_key(&name, slot))
                .or_else(|| self.store.get_int(&legacy_slot_key(slot)));
            match saved {
                None | Some(-1) => {}
                Some(index) if index >= 0 && (index as usize) < count => {
                    debug!(slot, index, "saved_slot_restored");
                    self.request_into(slot, index as usize);
                }
                Some(index) => warn!(slot, index, count, "saved_slot_index_invalid"),
            }
        }
    }

    /// Move the remaining pieces to the front, then fill the empty slots
    fn refill_empty_slots(&mut self) {
        self.close_hand_gaps();
        self.fill_empty_slots();
    }

    /// Request a piece for every empty slot while the sequencer can spawn,
    /// then close any gap a skipped or failed request left behind.
    fn fill_empty_slots(&mut self) {
        let empty: Vec<usize> = self.hand.empty_slots().collect();
        for slot in empty {
            if !self.sequencer.can_spawn() {
                break;
            }
            self.spawn_into(slot);
        }
        self.close_hand_gaps();
    }

    fn close_hand_gaps(&mut self) {
        let Some(first_gap) = self.hand.empty_slots().next() else {
            return;
        };
        let moved = self.hand.close_gaps();
        if moved > 0 {
            self.events.push(SessionEvent::HandShifted {
                removed: first_gap,
                moved,
            });
        }
    }

    fn spawn_into(&mut self, slot: usize) {
        match self.sequencer.next_piece_index() {
            Spawn::Index(index) => self.request_into(slot, index),
            Spawn::Stopped => debug!(slot, "spawn_stopped"),
        }
    }

    fn request_into(&mut self, slot: usize, type_index: usize) {
        let count = self.level.as_ref().map_or(0, LevelConfig::piece_count);
        if type_index >= count {
            warn!(slot, index = type_index, count, "piece_index_out_of_range");
            return;
        }

        let token = LoadToken {
            generation: self.generation,
            request_id: self.next_request_id,
            slot,
            type_index,
        };
        self.next_request_id += 1;

        match self.provider.request(token) {
            LoadPoll::Ready(Ok(piece)) => self.fill(slot, piece),
            LoadPoll::Ready(Err(error)) => self.load_failed(slot, type_index, error),
            LoadPoll::Pending => {
                debug!(slot, index = type_index, request = token.request_id, "piece_load_pending");
                self.hand.set(slot, SlotState::Loading(token));
            }
        }
    }

    /// Apply one finished load; false when it failed and left its slot empty
    fn apply_completion(&mut self, completion: LoadCompletion) -> bool {
        let token = completion.token;
        if token.generation != self.generation {
            debug!(
                request = token.request_id,
                generation = token.generation,
                current = self.generation,
                "load_completion_stale"
            );
            return true;
        }
        let Some(slot) = self.hand.find_loading(token.request_id) else {
            debug!(request = token.request_id, "load_completion_unclaimed");
            return true;
        };
        match completion.result {
            Ok(piece) => {
                self.fill(slot, piece);
                true
            }
            Err(error) => {
                self.hand.set(slot, SlotState::Empty);
                self.load_failed(slot, token.type_index, error);
                false
            }
        }
    }

    fn fill(&mut self, slot: usize, piece: Piece) {
        let piece_id = piece.id();
        self.hand.set(slot, SlotState::Ready(piece));
        self.events.push(SessionEvent::SlotFilled { slot, piece_id });
    }

    fn load_failed(&mut self, slot: usize, type_index: usize, error: AssetError) {
        warn!(slot, index = type_index, error = %error, "piece_load_failed");
        self.events.push(SessionEvent::LoadFailed {
            slot,
            type_index,
            error: error.to_string(),
        });
    }

    /// Refresh movable flags and decide between playing, waiting and game over
    ///
    /// A game-over session is re-evaluated too, so a board change such as a
    /// band clear can put it back into play.
    fn evaluate(&mut self) {
        if self.status == SessionStatus::Idle {
            return;
        }
        if self.clear.is_draining() {
            self.status = SessionStatus::WaitingForClear;
            return;
        }

        for (slot, movable) in self.hand.refresh_movable(&self.grid) {
            self.events.push(SessionEvent::MovableChanged { slot, movable });
        }

        let was_over = self.status == SessionStatus::GameOver;
        if self.hand.any_movable() || self.hand.any_loading() {
            if was_over {
                info!(score = self.score, "game_resumed");
            }
            self.status = SessionStatus::Playing;
        } else if !was_over {
            self.status = SessionStatus::GameOver;
            info!(score = self.score, moves = self.moves, "game_over");
            self.events.push(SessionEvent::GameOver { score: self.score });
        }
    }
}

/// Saved slot key, namespaced by level
pub fn slot_key(level_name: &str, slot: usize) -> String {
    format!("{level_name}_block_{slot}")
}

/// Saved slot key written by older builds
pub fn legacy_slot_key(slot: usize) -> String {
    format!("{slot}block")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{PieceEntry, TileDef};
    use crate::types::{Line, SequenceEndBehavior};

    fn dot_level(seq: &[usize], end: SequenceEndBehavior) -> LevelConfig {
        let mut level = LevelConfig::standard();
        level.level_name = "dots".to_string();
        level.play_mode = PlayMode::Scripted;
        level.spawn_sequence = seq.to_vec();
        level.sequence_end_behavior = end;
        level
    }

    fn instant() -> SessionConfig {
        SessionConfig {
            clear_step_ms: 0,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_level_load_fills_hand_in_order() {
        let mut session = GameSession::in_memory(instant());
        assert_eq!(session.status(), SessionStatus::Idle);

        session
            .on_level_loaded(dot_level(&[0, 1, 2], SequenceEndBehavior::Loop))
            .unwrap();
        assert_eq!(session.status(), SessionStatus::Playing);
        let ids: Vec<_> = (0..3).map(|i| session.hand().piece(i).map(Piece::id)).collect();
        assert_eq!(ids, vec![Some(0), Some(1), Some(2)]);
        assert!(session.hand().slots().iter().all(|s| s.movable));
    }

    #[test]
    fn test_rejections_do_not_mutate() {
        let mut session = GameSession::in_memory(instant());
        assert_eq!(session.try_place(0, (0, 0)), Err(PlaceError::NotPlayable));

        // slot 1 holds the horizontal domino
        session
            .on_level_loaded(dot_level(&[0, 1, 0], SequenceEndBehavior::Loop))
            .unwrap();
        session.drain_events();

        assert_eq!(session.try_place(1, (9, 0)), Err(PlaceError::OutOfRange));
        assert_eq!(session.try_place(5, (0, 0)), Err(PlaceError::InvalidSlot));
        session.try_place(0, (4, 4)).unwrap();
        session.drain_events();

        let before = session.grid().clone();
        let hand_before = session.hand().clone();
        let err = session.try_place(0, (3, 4)).unwrap_err();
        assert_eq!(err, PlaceError::Occupied);
        assert_eq!(err.code(), "occupied");
        assert_eq!(session.grid(), &before);
        assert_eq!(session.hand(), &hand_before);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_placement_compacts_and_refills_last_slot() {
        let mut session = GameSession::in_memory(instant());
        session
            .on_level_loaded(dot_level(&[0, 1, 2, 3], SequenceEndBehavior::Loop))
            .unwrap();
        session.drain_events();

        let placed = session.try_place(0, (0, 0)).unwrap();
        assert_eq!(placed.piece_id, 0);
        assert_eq!(placed.cells, vec![(0, 0)]);

        let ids: Vec<_> = (0..3).map(|i| session.hand().piece(i).map(Piece::id)).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);

        let events = session.drain_events();
        assert!(events.contains(&SessionEvent::HandShifted { removed: 0, moved: 2 }));
        assert!(events.contains(&SessionEvent::SlotFilled { slot: 2, piece_id: 3 }));
    }

    #[test]
    fn test_row_clear_scores_from_empty_count_before_clear() {
        let mut session = GameSession::in_memory(instant());
        session
            .on_level_loaded(dot_level(&[0], SequenceEndBehavior::Loop))
            .unwrap();

        for x in 0..9 {
            session.try_place(0, (x, 3)).unwrap();
        }
        assert_eq!(session.grid().count_empty(), 91);
        session.drain_events();

        let placed = session.try_place(0, (9, 3)).unwrap();
        assert_eq!(placed.lines.as_slice(), &[Line::row(3)]);
        assert_eq!(placed.points, StandardScore.points(90, 1));
        assert_eq!(session.score(), placed.points);
        assert_eq!(session.grid().count_empty(), 100);
        assert_eq!(session.lines_cleared(), 1);

        let events = session.drain_events();
        let cleared: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::LinesCleared(ev) => Some(ev),
                _ => None,
            })
            .collect();
        assert_eq!(cleared.len(), 1);
        assert_eq!(cleared[0].empty_before_clear, 90);
    }

    #[test]
    fn test_staged_clear_blocks_placement_until_drained() {
        let mut session = GameSession::in_memory(SessionConfig::default());
        session
            .on_level_loaded(dot_level(&[0], SequenceEndBehavior::Loop))
            .unwrap();
        for x in 0..10 {
            session.try_place(0, (x, 0)).unwrap();
        }

        assert_eq!(session.status(), SessionStatus::WaitingForClear);
        assert_eq!(session.try_place(0, (0, 5)), Err(PlaceError::ClearInProgress));
        assert!(session.preview(0, (0, 5)).is_empty());

        session.tick(CLEAR_STEP_MS * 4);
        assert!(session.is_clearing());
        session.tick(CLEAR_STEP_MS * 10);
        assert!(!session.is_clearing());
        assert_eq!(session.status(), SessionStatus::Playing);
        assert_eq!(session.grid().count_empty(), 100);
        assert!(session.try_place(0, (0, 5)).is_ok());
    }

    #[test]
    fn test_special_tile_counted_once_and_persisted() {
        let mut level = dot_level(&[1], SequenceEndBehavior::Loop);
        level.pieces[1] = PieceEntry::inline(
            "gem",
            vec![TileDef {
                x: 0,
                y: 0,
                kind: crate::types::TileKind::special(SpecialKind::Gem),
                decorative: false,
            }],
        );
        let mut session = GameSession::in_memory(instant());
        session.on_level_loaded(level).unwrap();

        // row 0 and column 0 complete together on the shared corner
        for x in 1..10 {
            session.try_place(0, (x, 0)).unwrap();
        }
        for y in 1..10 {
            session.try_place(0, (0, y)).unwrap();
        }
        assert_eq!(session.stats().count(SpecialKind::Gem), 0);
        session.drain_events();

        let placed = session.try_place(0, (0, 0)).unwrap();
        assert_eq!(placed.lines.as_slice(), &[Line::column(0), Line::row(0)]);
        assert_eq!(session.stats().count(SpecialKind::Gem), 19);
        let notified = session
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::SpecialDestroyed(SpecialKind::Gem)))
            .count();
        assert_eq!(notified, 19);
        session.try_place(0, (5, 5)).unwrap();

        let before = session.stats().count(SpecialKind::Gem);
        session.clear_band_at(Axis::Row, 5).unwrap();
        assert_eq!(session.stats().count(SpecialKind::Gem), before + 1);
        assert_eq!(
            session.store().get_int("TotalGemsDestroyed"),
            Some(before as i64 + 1)
        );
    }

    #[test]
    fn test_stop_sequence_leaves_slots_empty_then_game_over() {
        let mut session = GameSession::in_memory(instant());
        session
            .on_level_loaded(dot_level(&[0, 0], SequenceEndBehavior::Stop))
            .unwrap();
        assert!(session.hand().get(2).is_some_and(|s| s.is_empty()));
        assert!(!session.sequencer().can_spawn());

        session.try_place(0, (0, 0)).unwrap();
        assert_eq!(session.status(), SessionStatus::Playing);
        session.try_place(0, (2, 0)).unwrap();

        assert!(session.hand().is_all_empty());
        assert!(session.is_game_over());
        assert!(session
            .drain_events()
            .contains(&SessionEvent::GameOver { score: 0 }));
        assert_eq!(session.try_place(0, (0, 0)), Err(PlaceError::NotPlayable));
    }

    #[test]
    fn test_out_of_range_script_entry_is_skipped() {
        let mut session = GameSession::in_memory(instant());
        session
            .on_level_loaded(dot_level(&[0, 500, 0], SequenceEndBehavior::Loop))
            .unwrap();
        // the skipped entry leaves no hole in the middle of the hand
        assert!(session.hand().piece(0).is_some());
        assert!(session.hand().piece(1).is_some());
        assert!(session.hand().get(2).is_some_and(|s| s.is_empty()));
    }

    #[test]
    fn test_skipped_entries_never_strand_the_hand() {
        let mut session = GameSession::in_memory(instant());
        session
            .on_level_loaded(dot_level(&[0, 500], SequenceEndBehavior::Loop))
            .unwrap();

        for i in 0..30i8 {
            session.try_place(0, (i % 10, i / 10)).unwrap();
            assert_eq!(session.status(), SessionStatus::Playing, "move {i}");
            assert!(session.hand().piece(0).is_some(), "move {i}");
            let empty: Vec<_> = session.hand().empty_slots().collect();
            assert!(
                empty.windows(2).all(|w| w[1] == w[0] + 1) && empty.last().map_or(true, |&e| e == 2),
                "gap left in the hand at move {i}: {empty:?}"
            );
        }
    }

    #[test]
    fn test_saved_slots_round_trip() {
        let mut level = LevelConfig::standard();
        level.level_name = "saved".to_string();

        let mut session = GameSession::in_memory(instant());
        session.on_level_loaded(level.clone()).unwrap();
        let ids: Vec<_> = (0..3).map(|i| session.hand().piece(i).map(Piece::id)).collect();
        session.save_hand().unwrap();
        assert_eq!(session.store().get_int("saved_block_0"), ids[0].map(|i| i as i64));

        let store = session.store().clone();
        let mut restored = GameSession::new(
            SessionConfig {
                seed: 777,
                ..instant()
            },
            store,
            InlineCatalog::new(),
        );
        restored.on_level_loaded(level).unwrap();
        let restored_ids: Vec<_> = (0..3).map(|i| restored.hand().piece(i).map(Piece::id)).collect();
        assert_eq!(restored_ids, ids);
    }

    #[test]
    fn test_invalid_and_legacy_saved_slots() {
        let mut store = MemoryStore::new();
        store.set_int("legacy_block_0", 99);
        store.set_int("1block", 4);
        let mut level = LevelConfig::standard();
        level.level_name = "legacy".to_string();

        let mut session = GameSession::new(instant(), store, InlineCatalog::new());
        session.on_level_loaded(level).unwrap();

        // slot 0 fell back to a random refill; slot 1 came from the legacy key
        assert!(session.hand().piece(0).is_some());
        assert_eq!(session.hand().piece(1).map(Piece::id), Some(4));
    }

    #[test]
    fn test_scripted_level_ignores_saved_slots() {
        let mut store = MemoryStore::new();
        store.set_int("dots_block_0", 7);
        let mut session = GameSession::new(instant(), store, InlineCatalog::new());
        session
            .on_level_loaded(dot_level(&[0], SequenceEndBehavior::Loop))
            .unwrap();
        assert_eq!(session.hand().piece(0).map(Piece::id), Some(0));
    }

    #[test]
    fn test_line_bomb_orientation() {
        let mut session = GameSession::in_memory(instant());
        // slot 0 holds a vertical bar, so the bomb clears columns
        session
            .on_level_loaded(dot_level(&[4], SequenceEndBehavior::Loop))
            .unwrap();
        session.try_place(0, (0, 0)).unwrap();

        let band = session.use_line_bomb().unwrap();
        assert_eq!(band.axis, Axis::Column);
        assert!(band.start <= BOARD_SIZE - BAND_WIDTH);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_band_clear_is_rejected_while_idle_or_draining() {
        let mut session = GameSession::in_memory(SessionConfig::default());
        assert!(session.clear_band_at(Axis::Row, 0).is_none());
        assert!(session.use_line_bomb().is_none());
        assert_eq!(session.stats().total(), 0);

        session
            .on_level_loaded(dot_level(&[0], SequenceEndBehavior::Loop))
            .unwrap();
        for x in 0..10 {
            session.try_place(0, (x, 0)).unwrap();
        }
        session.try_place(0, (0, 5)).unwrap_err();
        assert!(session.is_clearing());
        session.drain_events();

        let before = session.grid().clone();
        assert!(session.clear_band_at(Axis::Row, 0).is_none());
        assert!(session.use_line_bomb().is_none());
        assert_eq!(session.grid(), &before);
        assert!(session.drain_events().is_empty());

        session.finish_clear();
        assert!(session.clear_band_at(Axis::Row, 0).is_some());
    }

    #[test]
    fn test_band_clear_resumes_a_finished_game() {
        let mut session = GameSession::in_memory(instant());
        // square3 blocks tile a 9x9 area without completing a line
        session
            .on_level_loaded(dot_level(&[10], SequenceEndBehavior::Loop))
            .unwrap();
        for y in [0, 3, 6] {
            for x in [0, 3, 6] {
                session.try_place(0, (x, y)).unwrap();
            }
        }
        assert!(session.is_game_over());
        session.tick(16);
        let over = session
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::GameOver { .. }))
            .count();
        assert_eq!(over, 1);

        let band = session.clear_band_at(Axis::Row, 0).unwrap();
        assert_eq!(band.cells.len(), 27);
        assert_eq!(session.status(), SessionStatus::Playing);
        assert!(session.hand().any_movable());
        assert!(session.try_place(0, (0, 0)).is_ok());
    }

    #[test]
    fn test_unload_resets_everything() {
        let mut session = GameSession::in_memory(instant());
        session.on_level_loaded(LevelConfig::standard()).unwrap();
        let generation = session.generation();
        session.try_place(0, (0, 0)).ok();

        session.on_level_unloaded();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.hand().is_all_empty());
        assert_eq!(session.grid().count_empty(), 100);
        assert!(session.generation() > generation);
        assert!(session.level().is_none());
    }
}
