//! Tileset data and ECS resources.
//!
//! Overview
//! - `animconfig` – INI configuration for the tileset path and the clock
//! - `tileset` – immutable tileset model and the tile animation resolver
//! - `tilesetloader` – Tiled XML/JSON parsing, validation, and `LoadError`
//! - `tilesetstore` – loaded tilesets keyed by string, with reload
//! - `worldtime` – caller-owned animation clock
pub mod animconfig;
pub mod tileset;
pub mod tilesetloader;
pub mod tilesetstore;
pub mod worldtime;
