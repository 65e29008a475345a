//! Lifetime counters of destroyed special tiles

use tracing::debug;

use crate::store::KvStore;
use crate::types::SpecialKind;

/// Store key of the counter for `kind`
pub fn stat_key(kind: SpecialKind) -> &'static str {
    match kind {
        SpecialKind::Gem => "TotalGemsDestroyed",
        SpecialKind::Star => "TotalStarsDestroyed",
        SpecialKind::Diamond => "TotalDiamondsDestroyed",
    }
}

/// Per-kind counters mirrored into a key-value store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialTileStats {
    counts: [u64; 3],
}

impl SpecialTileStats {
    pub fn load(store: &dyn KvStore) -> Self {
        let mut stats = Self::default();
        for kind in SpecialKind::ALL {
            let value = store.get_int(stat_key(kind)).unwrap_or(0);
            stats.counts[kind as usize] = value.max(0) as u64;
        }
        stats
    }

    /// Count one destroyed tile and write the new total through
    pub fn record(&mut self, kind: SpecialKind, store: &mut dyn KvStore) {
        let count = &mut self.counts[kind as usize];
        *count += 1;
        store.set_int(stat_key(kind), *count as i64);
        debug!(kind = kind.as_str(), total = *count, "special_tile_destroyed");
    }

    pub fn count(&self, kind: SpecialKind) -> u64 {
        self.counts[kind as usize]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn reset(&mut self, store: &mut dyn KvStore) {
        self.counts = [0; 3];
        for kind in SpecialKind::ALL {
            store.set_int(stat_key(kind), 0);
        }
    }
}
