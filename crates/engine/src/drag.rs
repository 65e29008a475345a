use tracing::debug;

use crate::core::{GameSession, KvStore, LineSet, PieceProvider};
use crate::types::Line;

/// Round half up: `floor(v + 0.5)`, saturating at the `i8` range
pub fn round_half_up(v: f32) -> i8 {
    let r = (v + 0.5).floor();
    if r.is_nan() {
        return 0;
    }
    r.clamp(i8::MIN as f32, i8::MAX as f32) as i8
}

/// Cell origin for a piece whose first bounding-box cell is at `pointer`
pub fn origin_for(pointer: (f32, f32)) -> (i8, i8) {
    (round_half_up(pointer.0), round_half_up(pointer.1))
}

/// Difference between two highlight sets
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightChange {
    pub added: LineSet,
    pub removed: LineSet,
}

impl HighlightChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Tracks one drag gesture for a hand slot
///
/// The preview is recomputed only when the rounded origin changes, so a
/// host can call [`DragTracker::update`] on every pointer event.
#[derive(Debug, Clone)]
pub struct DragTracker {
    slot: usize,
    origin: Option<(i8, i8)>,
    highlighted: LineSet,
}

impl DragTracker {
    pub fn begin(slot: usize) -> Self {
        debug!(slot, "drag_begin");
        Self {
            slot,
            origin: None,
            highlighted: LineSet::new(),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn origin(&self) -> Option<(i8, i8)> {
        self.origin
    }

    /// Lines currently highlighted
    pub fn highlighted(&self) -> &[Line] {
        &self.highlighted
    }

    /// Move the piece to `pointer`; returns the highlight change, if any
    pub fn update<S: KvStore, P: PieceProvider>(
        &mut self,
        session: &GameSession<S, P>,
        pointer: (f32, f32),
    ) -> Option<HighlightChange> {
        let origin = origin_for(pointer);
        if self.origin == Some(origin) {
            return None;
        }
        self.origin = Some(origin);

        let next = session.preview(self.slot, origin);
        let change = diff(&self.highlighted, &next);
        self.highlighted = next;
        (!change.is_empty()).then_some(change)
    }

    /// End the gesture without placing; every highlighted line is removed
    pub fn cancel(self) -> HighlightChange {
        debug!(slot = self.slot, "drag_cancel");
        HighlightChange {
            added: LineSet::new(),
            removed: self.highlighted,
        }
    }
}

fn diff(old: &LineSet, new: &LineSet) -> HighlightChange {
    let mut change = HighlightChange::default();
    for line in new.iter().filter(|line| !old.contains(line)) {
        change.added.push(*line);
    }
    for line in old.iter().filter(|line| !new.contains(line)) {
        change.removed.push(*line);
    }
    change
}
