//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per frame, applying `time_scale` to the provided delta.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Advance `WorldTime` by `dt` seconds of unscaled frame time.
///
/// Fractions of a millisecond are carried to the next update so the clock
/// does not drift at frame rates that do not divide a second evenly.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    advance(&mut wt, dt);
}

/// Apply one frame delta to a clock value.
pub fn advance(wt: &mut WorldTime, dt: f32) {
    let scaled = f64::from(dt) * 1000.0 * f64::from(wt.time_scale) + wt.carry_ms;
    let whole = scaled.floor();
    wt.carry_ms = scaled - whole;
    wt.delta_ms = whole as i64;
    wt.elapsed_ms = wt.elapsed_ms.saturating_add(wt.delta_ms);
    wt.frame_count += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixty_fps_does_not_drift() {
        let mut wt = WorldTime::default();
        for _ in 0..60 {
            advance(&mut wt, 1.0 / 60.0);
        }
        assert!((wt.elapsed_ms - 1000).abs() <= 1);
        assert_eq!(wt.frame_count, 60);
    }

    #[test]
    fn test_time_scale() {
        let mut wt = WorldTime {
            time_scale: 2.0,
            ..Default::default()
        };
        advance(&mut wt, 0.5);
        assert_eq!(wt.elapsed_ms, 1000);
        assert_eq!(wt.delta_ms, 1000);
    }

    #[test]
    fn test_negative_scale_runs_backwards() {
        let mut wt = WorldTime {
            time_scale: -1.0,
            ..Default::default()
        };
        advance(&mut wt, 0.25);
        assert_eq!(wt.elapsed_ms, -250);
    }

    #[test]
    fn test_world_update() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        update_world_time(&mut world, 0.1);
        assert_eq!(world.resource::<WorldTime>().elapsed_ms, 100);
    }

    #[test]
    fn test_animation_ms_uses_epoch() {
        let wt = WorldTime {
            elapsed_ms: 100,
            epoch_ms: 300,
            ..Default::default()
        };
        assert_eq!(wt.animation_ms(), -200);
    }
}
