//! Gesture glue between a pointer-driven host and the core session.
//!
//! The host reports where a dragged piece is, in continuous board
//! coordinates (cell centers sit on integers). This crate turns that into
//! cell origins, keeps the line highlight in sync while dragging, and
//! submits the drop. [`bot`] chooses placements for headless play.

pub mod bot;
pub mod drag;
pub mod place;

pub use blockfit_core as core;
pub use blockfit_types as types;

pub use bot::{best_move, BotMove};
pub use drag::{origin_for, round_half_up, DragTracker, HighlightChange};
pub use place::apply_drop;
