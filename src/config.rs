//! Simulator configuration read from the environment.

use std::path::PathBuf;

/// Settings of one `blockfit-sim` run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Level file; the built-in standard level when unset
    pub level: Option<PathBuf>,
    pub seed: u32,
    /// JSON store for saved slots and counters; in-memory when unset
    pub store: Option<PathBuf>,
    pub max_moves: u32,
    pub clear_step_ms: u32,
    /// Load pieces through the streaming loader with this latency
    pub load_latency_ms: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            level: None,
            seed: 1,
            store: None,
            max_moves: 500,
            clear_step_ms: 0,
            load_latency_ms: None,
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset, empty or malformed values keep
    /// their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .and_then(|s| if s.is_empty() { None } else { Some(s) })
        };

        Self {
            level: text("BLOCKFIT_LEVEL").map(PathBuf::from),
            seed: text("BLOCKFIT_SEED")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.seed),
            store: text("BLOCKFIT_STORE").map(PathBuf::from),
            max_moves: text("BLOCKFIT_MAX_MOVES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_moves),
            clear_step_ms: text("BLOCKFIT_CLEAR_STEP_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.clear_step_ms),
            load_latency_ms: text("BLOCKFIT_LOAD_LATENCY_MS").and_then(|s| s.parse().ok()),
        }
    }
}
