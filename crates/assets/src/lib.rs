//! Piece providers backed by files on disk.
//!
//! - [`FilePieceCatalog`] resolves inline and file-backed pieces
//!   synchronously, preloading the whole level when it asks for it.
//! - [`StreamingLoader`] loads every piece on a tokio runtime and hands the
//!   result back on a later session tick.

pub mod catalog;
pub mod streaming;

pub use blockfit_core as core;

pub use catalog::{load_entry, FilePieceCatalog};
pub use streaming::StreamingLoader;
