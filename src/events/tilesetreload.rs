//! Event and observer to hot-reload a tileset from disk.
//!
//! Emitting a [`TilesetReloadEvent`] loads the tileset file again and swaps
//! the [`TilesetStore`] entry in one step. If the file no longer loads, the
//! previous tileset stays in use and the error is logged.
use crate::resources::tilesetstore::TilesetStore;
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{error, info, warn};

/// Request to reload the tileset stored under `key`.
#[derive(Event, Debug, Clone)]
pub struct TilesetReloadEvent {
    pub key: String,
}

/// Observer that reloads a tileset in the [`TilesetStore`].
pub fn tileset_reload_observer(trigger: On<TilesetReloadEvent>, mut store: ResMut<TilesetStore>) {
    let key = trigger.event().key.as_str();
    match store.reload(key) {
        Ok(Some(tileset)) => info!(
            "Reloaded tileset '{}' ({} animated tiles)",
            key,
            tileset.clip_count()
        ),
        Ok(None) => warn!("Tileset '{}' is not reloadable", key),
        Err(e) => error!("Reload of tileset '{}' failed, keeping previous: {}", key, e),
    }
}
