//! Hand - the fixed row of slots holding pieces awaiting placement
//!
//! The hand behaves like a fixed-size queue: occupied slots are kept at the
//! front in arrival order, so every empty slot sits at the back where the
//! session refills it.

use crate::grid::Grid;
use crate::piece::Piece;
use crate::provider::LoadToken;
use crate::types::HAND_SLOTS;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotState {
    #[default]
    Empty,
    /// A piece request is in flight
    Loading(LoadToken),
    Ready(Piece),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    pub state: SlotState,
    /// The piece fits somewhere on the board
    pub movable: bool,
}

impl Slot {
    pub fn piece(&self) -> Option<&Piece> {
        match &self.state {
            SlotState::Ready(piece) => Some(piece),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.state, SlotState::Empty)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SlotState::Loading(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    slots: [Slot; HAND_SLOTS],
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[Slot; HAND_SLOTS] {
        &self.slots
    }

    pub fn get(&self, slot: usize) -> Option<&Slot> {
        self.slots.get(slot)
    }

    pub fn piece(&self, slot: usize) -> Option<&Piece> {
        self.slots.get(slot).and_then(Slot::piece)
    }

    pub fn set(&mut self, slot: usize, state: SlotState) {
        if let Some(target) = self.slots.get_mut(slot) {
            target.state = state;
            target.movable = false;
        }
    }

    /// Remove the ready piece from `slot`, leaving the slot empty
    pub fn take(&mut self, slot: usize) -> Option<Piece> {
        let target = self.slots.get_mut(slot)?;
        match std::mem::take(&mut target.state) {
            SlotState::Ready(piece) => {
                target.movable = false;
                Some(piece)
            }
            other => {
                target.state = other;
                None
            }
        }
    }

    /// Move every non-empty slot toward slot 0, keeping their order.
    ///
    /// Returns the number of slots that moved. Afterwards the empty slots
    /// form a suffix of the hand.
    pub fn close_gaps(&mut self) -> usize {
        let mut next = 0;
        let mut moved = 0;
        for i in 0..HAND_SLOTS {
            if self.slots[i].is_empty() {
                continue;
            }
            if i != next {
                self.slots.swap(i, next);
                moved += 1;
            }
            next += 1;
        }
        moved
    }

    /// Slot currently waiting on `request_id`
    pub fn find_loading(&self, request_id: u64) -> Option<usize> {
        self.slots.iter().position(|slot| match &slot.state {
            SlotState::Loading(token) => token.request_id == request_id,
            _ => false,
        })
    }

    pub fn empty_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_empty())
            .map(|(i, _)| i)
    }

    pub fn any_loading(&self) -> bool {
        self.slots.iter().any(Slot::is_loading)
    }

    pub fn any_movable(&self) -> bool {
        self.slots.iter().any(|slot| slot.movable)
    }

    pub fn is_all_empty(&self) -> bool {
        self.slots.iter().all(Slot::is_empty)
    }

    /// Recompute every `movable` flag against `grid`.
    ///
    /// Returns the slots whose flag changed.
    pub fn refresh_movable(&mut self, grid: &Grid) -> Vec<(usize, bool)> {
        let mut changed = Vec::new();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let movable = slot.piece().is_some_and(|piece| grid.fits_anywhere(piece));
            if movable != slot.movable {
                slot.movable = movable;
                changed.push((i, movable));
            }
        }
        changed
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}
