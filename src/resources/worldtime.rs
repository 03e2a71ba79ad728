//! Animation clock.
//!
//! The caller owns the clock and advances it once per frame through
//! [`update_world_time`](crate::systems::time::update_world_time). Tile
//! animation is resolved from the absolute elapsed time, never from deltas.
use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    /// Scaled milliseconds since the clock started.
    pub elapsed_ms: i64,
    /// Scaled milliseconds added by the last update.
    pub delta_ms: i64,
    pub time_scale: f32,
    /// Offset subtracted from `elapsed_ms` to get the animation clock.
    pub epoch_ms: i64,
    pub frame_count: u64,
    /// Sub-millisecond part of the scaled time not yet added to `elapsed_ms`.
    pub carry_ms: f64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed_ms: 0,
            delta_ms: 0,
            time_scale: 1.0,
            epoch_ms: 0,
            frame_count: 0,
            carry_ms: 0.0,
        }
    }
}

impl WorldTime {
    /// Milliseconds since the animation epoch. May be negative.
    pub fn animation_ms(&self) -> i64 {
        self.elapsed_ms.saturating_sub(self.epoch_ms)
    }
}
