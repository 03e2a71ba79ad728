//! tileanim library.
//!
//! Loads Tiled tileset definitions and resolves which tile image an animated
//! tile shows at a given moment. Exposes the ECS components, resources,
//! systems, and events for use by renderers and integration tests.

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;
