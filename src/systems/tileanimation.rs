//! Tile animation system.
//!
//! - [`tile_animation_system`] resolves the visible tile of every
//!   [`AnimatedTile`] from the absolute animation clock.
//!
//! # Animation Flow
//!
//! 1. Tilesets are loaded into [`TilesetStore`] by key
//! 2. Entities carry an [`AnimatedTile`] naming a tileset key and a base tile
//! 3. [`update_world_time`](crate::systems::time::update_world_time) advances [`WorldTime`]
//! 4. This system calls [`Tileset::resolve`](crate::resources::tileset::Tileset::resolve)
//!    and stores the result in `AnimatedTile::visible`
//!
//! The current frame is derived fresh from the clock each time, so instances
//! of the same tile always agree and there is no per-entity state to drift.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::animatedtile::AnimatedTile;
use crate::resources::tilesetstore::TilesetStore;
use crate::resources::worldtime::WorldTime;

/// Update the visible tile of every animated tile instance.
///
/// Contract
/// - Reads [`WorldTime`] for the animation clock.
/// - Looks up tileset data from [`TilesetStore`].
/// - Mutates [`AnimatedTile::visible`] only when it changes.
/// - Instances whose tileset key is missing keep their current tile.
pub fn tile_animation_system(
    mut query: Query<&mut AnimatedTile>,
    store: Res<TilesetStore>,
    time: Res<WorldTime>,
) {
    let now = time.animation_ms();
    for mut tile in query.iter_mut() {
        let Some(tileset) = store.get(&tile.tileset_key) else {
            debug!("No tileset '{}' for animated tile {}", tile.tileset_key, tile.base);
            continue;
        };
        let visible = tileset.resolve(tile.base, now);
        if tile.visible != visible {
            tile.visible = visible;
        }
    }
}
