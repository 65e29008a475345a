//! Spawn sequencer - chooses the type of the next piece
//!
//! In random mode every call picks uniformly over the level's piece types.
//! In scripted mode the level's spawn sequence is handed out in order; what
//! happens once it runs out depends on [`SequenceEndBehavior`]:
//!
//! | Behavior | After the last entry |
//! |----------|----------------------|
//! | `Loop`   | starts over at entry 0 on the same call |
//! | `Random` | uniform picks for the rest of the level |
//! | `Stop`   | [`Spawn::Stopped`] until the sequence is reset |

use crate::level::LevelConfig;
use crate::rng::SimpleRng;
use crate::types::{PlayMode, SequenceEndBehavior};

/// Result of asking the sequencer for a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spawn {
    /// Piece type index within the level's piece list
    Index(usize),
    /// The scripted sequence ended with `Stop`; leave the slot empty
    Stopped,
}

#[derive(Debug, Clone)]
pub struct SpawnSequencer {
    mode: PlayMode,
    scripted: Vec<usize>,
    end_behavior: SequenceEndBehavior,
    piece_count: usize,
    cursor: usize,
    exhausted: bool,
    rng: SimpleRng,
}

impl SpawnSequencer {
    pub fn new(
        mode: PlayMode,
        scripted: Vec<usize>,
        end_behavior: SequenceEndBehavior,
        piece_count: usize,
        seed: u32,
    ) -> Self {
        Self {
            mode,
            scripted,
            end_behavior,
            piece_count,
            cursor: 0,
            exhausted: false,
            rng: SimpleRng::new(seed),
        }
    }

    /// Random sequencer over `piece_count` types
    pub fn random(piece_count: usize, seed: u32) -> Self {
        Self::new(
            PlayMode::Random,
            Vec::new(),
            SequenceEndBehavior::Loop,
            piece_count,
            seed,
        )
    }

    pub fn from_level(level: &LevelConfig, seed: u32) -> Self {
        Self::new(
            level.play_mode,
            level.spawn_sequence.clone(),
            level.sequence_end_behavior,
            level.piece_count(),
            seed,
        )
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// False only once a scripted `Stop` sequence has run out
    pub fn can_spawn(&self) -> bool {
        !(self.mode == PlayMode::Scripted
            && self.exhausted
            && self.end_behavior == SequenceEndBehavior::Stop)
    }

    /// Choose the type of the next piece
    pub fn next_piece_index(&mut self) -> Spawn {
        if self.mode == PlayMode::Random || self.scripted.is_empty() {
            return Spawn::Index(self.rng.pick(self.piece_count));
        }

        if self.exhausted {
            return match self.end_behavior {
                SequenceEndBehavior::Stop => Spawn::Stopped,
                _ => Spawn::Index(self.rng.pick(self.piece_count)),
            };
        }

        if self.cursor >= self.scripted.len() {
            match self.end_behavior {
                SequenceEndBehavior::Loop => self.cursor = 0,
                SequenceEndBehavior::Random => {
                    self.exhausted = true;
                    return Spawn::Index(self.rng.pick(self.piece_count));
                }
                SequenceEndBehavior::Stop => {
                    self.exhausted = true;
                    return Spawn::Stopped;
                }
            }
        }

        let index = self.scripted[self.cursor];
        self.cursor += 1;
        Spawn::Index(index)
    }

    /// Rewind the scripted sequence to `start` and clear exhaustion.
    ///
    /// A `start` past the end is clamped, so the next call applies the end
    /// behavior immediately.
    pub fn reset(&mut self, start: usize) {
        self.cursor = start.min(self.scripted.len());
        self.exhausted = false;
    }
}
