//! Animated tile component.
//!
//! An [`AnimatedTile`] is one placed instance of a tileset tile. The
//! [`tile_animation_system`](crate::systems::tileanimation::tile_animation_system)
//! writes the tile to draw into `visible` every frame; renderers read it and
//! never touch the clip data themselves.
use bevy_ecs::prelude::Component;

#[derive(Debug, Clone, Component, PartialEq, Eq)]
pub struct AnimatedTile {
    /// Key in [`TilesetStore`](crate::resources::tilesetstore::TilesetStore).
    pub tileset_key: String,
    /// Tile index as placed in the map.
    pub base: u32,
    /// Tile index to render this frame.
    pub visible: u32,
}

impl AnimatedTile {
    pub fn new(tileset_key: impl Into<String>, base: u32) -> Self {
        Self {
            tileset_key: tileset_key.into(),
            base,
            visible: base,
        }
    }
}
