//! Event types and observers.
//!
//! Submodules:
//! - [`tilesetreload`] – reload a tileset from disk and swap it in the store
pub mod tilesetreload;
