//! Blockfit (workspace facade crate).
//!
//! Re-exports the workspace crates under one name and hosts the headless
//! simulator used by the `blockfit-sim` binary.

pub mod config;
pub mod sim;

pub use blockfit_assets as assets;
pub use blockfit_core as core;
pub use blockfit_engine as engine;
pub use blockfit_types as types;
