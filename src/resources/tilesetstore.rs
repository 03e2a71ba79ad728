//! Tileset storage.
//!
//! Provides a registry of loaded tilesets keyed by string. Entries are shared
//! as [`Arc<Tileset>`], so any number of systems or threads can hold one while
//! a reload swaps the entry for a new value in a single step.

use std::path::PathBuf;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

use crate::resources::tileset::Tileset;
use crate::resources::tilesetloader::{LoadError, load_tileset};

/// A tileset together with the file it was loaded from.
#[derive(Debug, Clone)]
pub struct TilesetEntry {
    pub tileset: Arc<Tileset>,
    /// Source path, if the tileset came from disk. Used by reloads.
    pub path: Option<PathBuf>,
}

/// Registry of loaded tilesets by key.
#[derive(Resource, Debug, Default)]
pub struct TilesetStore {
    pub map: FxHashMap<String, TilesetEntry>,
}

impl TilesetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        TilesetStore {
            map: FxHashMap::default(),
        }
    }

    /// Get a tileset by its key.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&Arc<Tileset>> {
        self.map.get(key.as_ref()).map(|entry| &entry.tileset)
    }

    /// Insert an in-memory tileset with a specific key.
    pub fn insert(&mut self, key: impl Into<String>, tileset: Tileset) {
        self.map.insert(
            key.into(),
            TilesetEntry {
                tileset: Arc::new(tileset),
                path: None,
            },
        );
    }

    /// Load a tileset file and store it under `key`.
    ///
    /// On failure the store is left untouched.
    pub fn load(
        &mut self,
        key: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Result<Arc<Tileset>, LoadError> {
        let path = path.into();
        let tileset = Arc::new(load_tileset(&path)?);
        self.map.insert(
            key.into(),
            TilesetEntry {
                tileset: Arc::clone(&tileset),
                path: Some(path),
            },
        );
        Ok(tileset)
    }

    /// Load the tileset under `key` again from its source path.
    ///
    /// Returns `Ok(None)` when the key is unknown or has no source path. On
    /// a load error the previous tileset stays in place.
    pub fn reload(&mut self, key: &str) -> Result<Option<Arc<Tileset>>, LoadError> {
        let Some(entry) = self.map.get_mut(key) else {
            return Ok(None);
        };
        let Some(path) = entry.path.as_ref() else {
            return Ok(None);
        };
        let tileset = Arc::new(load_tileset(path)?);
        entry.tileset = Arc::clone(&tileset);
        Ok(Some(tileset))
    }

    /// Remove a tileset.
    pub fn remove(&mut self, key: &str) -> Option<Arc<Tileset>> {
        self.map.remove(key).map(|entry| entry.tileset)
    }

    /// Clear all loaded tilesets.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}
