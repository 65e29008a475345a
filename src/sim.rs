//! Headless play: a greedy bot drives one session until it ends.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::assets::{FilePieceCatalog, StreamingLoader};
use crate::config::SimConfig;
use crate::core::snapshot::SpecialSnapshot;
use crate::core::{
    GameSession, JsonFileStore, KvStore, LevelConfig, MemoryStore, PieceProvider, SessionConfig,
    SessionEvent,
};
use crate::engine::best_move;

/// Simulated time per idle tick
pub const SIM_TICK_MS: u32 = 16;

/// Idle ticks allowed while waiting on loads before giving up
const MAX_IDLE_TICKS: u32 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimSummary {
    pub level: String,
    pub seed: u32,
    pub moves: u32,
    pub score: u32,
    pub lines: u32,
    pub status: &'static str,
    pub load_failures: u32,
    pub special: SpecialSnapshot,
}

/// Run one simulation described by `config`
pub fn run(config: &SimConfig) -> Result<SimSummary> {
    let level = match &config.level {
        Some(path) => LevelConfig::load(path)
            .with_context(|| format!("failed to load level {}", path.display()))?,
        None => LevelConfig::standard(),
    };

    let store: Box<dyn KvStore> = match &config.store {
        Some(path) => Box::new(
            JsonFileStore::open(path)
                .with_context(|| format!("failed to open store {}", path.display()))?,
        ),
        None => Box::new(MemoryStore::new()),
    };

    let provider: Box<dyn PieceProvider> = match config.load_latency_ms {
        Some(ms) => Box::new(
            StreamingLoader::new(Duration::from_millis(ms))
                .context("failed to start piece loader runtime")?,
        ),
        None => Box::new(FilePieceCatalog::new()),
    };

    let session_config = SessionConfig {
        seed: config.seed,
        clear_step_ms: config.clear_step_ms,
        ..SessionConfig::default()
    };
    let mut session = GameSession::new(session_config, store, provider);
    session
        .on_level_loaded(level)
        .context("level rejected by piece provider")?;

    let summary = play(&mut session, config)?;
    session.on_level_unloaded();
    Ok(summary)
}

/// Play on an already loaded session
pub fn play<S: KvStore, P: PieceProvider>(
    session: &mut GameSession<S, P>,
    config: &SimConfig,
) -> Result<SimSummary> {
    let mut idle_ticks = 0;
    let mut load_failures = 0;

    while session.moves() < config.max_moves && !session.is_game_over() {
        session.tick(SIM_TICK_MS);
        load_failures += count_load_failures(session.drain_events());

        match best_move(session) {
            Some(mv) => {
                idle_ticks = 0;
                let placed = session
                    .try_place(mv.slot, mv.origin)
                    .with_context(|| format!("bot chose an invalid move {mv:?}"))?;
                debug!(
                    slot = placed.slot,
                    piece = placed.piece_id,
                    lines = placed.lines.len(),
                    "sim_move"
                );
            }
            None => {
                idle_ticks += 1;
                if idle_ticks > MAX_IDLE_TICKS {
                    anyhow::bail!("no playable piece after {MAX_IDLE_TICKS} idle ticks");
                }
                if session.hand().any_loading() {
                    thread::sleep(Duration::from_millis(1));
                }
            }
        }
    }
    load_failures += count_load_failures(session.drain_events());

    session.save_hand().context("failed to save hand")?;

    let snapshot = session.snapshot();
    let summary = SimSummary {
        level: snapshot.level_name.unwrap_or_default(),
        seed: config.seed,
        moves: snapshot.moves,
        score: snapshot.score,
        lines: snapshot.lines,
        status: snapshot.status,
        load_failures,
        special: snapshot.special,
    };
    info!(
        level = %summary.level,
        moves = summary.moves,
        score = summary.score,
        status = summary.status,
        "sim_finished"
    );
    Ok(summary)
}

fn count_load_failures(events: Vec<SessionEvent>) -> u32 {
    events
        .iter()
        .filter(|event| matches!(event, SessionEvent::LoadFailed { .. }))
        .count() as u32
}
