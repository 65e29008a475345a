use serde::Serialize;

use crate::hand::SlotState;
use crate::provider::PieceProvider;
use crate::session::{GameSession, SessionStatus};
use crate::store::KvStore;
use crate::types::{SpecialKind, BOARD_SIZE, HAND_SLOTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotView {
    #[default]
    Empty,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SlotSnapshot {
    pub state: SlotView,
    pub piece_id: Option<usize>,
    pub movable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SpecialSnapshot {
    pub gems: u64,
    pub stars: u64,
    pub diamonds: u64,
}

/// Plain copy of a session's observable state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionSnapshot {
    pub level_name: Option<String>,
    pub status: &'static str,
    /// Rows bottom to top: 0 empty, 1 normal, 2.. special
    pub board: [[u8; BOARD_SIZE as usize]; BOARD_SIZE as usize],
    pub hand: [SlotSnapshot; HAND_SLOTS],
    pub generation: u32,
    pub score: u32,
    pub moves: u32,
    pub lines: u32,
    pub special: SpecialSnapshot,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Playing => "playing",
            SessionStatus::WaitingForClear => "waiting_for_clear",
            SessionStatus::GameOver => "game_over",
        }
    }
}

impl SessionSnapshot {
    pub fn playable(&self) -> bool {
        self.status == SessionStatus::Playing.as_str()
    }
}

impl<S: KvStore, P: PieceProvider> GameSession<S, P> {
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut board = [[0u8; BOARD_SIZE as usize]; BOARD_SIZE as usize];
        self.grid().write_u8_grid(&mut board);

        let mut hand = [SlotSnapshot::default(); HAND_SLOTS];
        for (out, slot) in hand.iter_mut().zip(self.hand().slots()) {
            *out = match &slot.state {
                SlotState::Empty => SlotSnapshot::default(),
                SlotState::Loading(token) => SlotSnapshot {
                    state: SlotView::Loading,
                    piece_id: Some(token.type_index),
                    movable: false,
                },
                SlotState::Ready(piece) => SlotSnapshot {
                    state: SlotView::Ready,
                    piece_id: Some(piece.id()),
                    movable: slot.movable,
                },
            };
        }

        let stats = self.stats();
        SessionSnapshot {
            level_name: self.level().map(|level| level.level_name.clone()),
            status: self.status().as_str(),
            board,
            hand,
            generation: self.generation(),
            score: self.score(),
            moves: self.moves(),
            lines: self.lines_cleared(),
            special: SpecialSnapshot {
                gems: stats.count(SpecialKind::Gem),
                stars: stats.count(SpecialKind::Star),
                diamonds: stats.count(SpecialKind::Diamond),
            },
        }
    }
}
