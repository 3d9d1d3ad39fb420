//! Time update system.
//!
//! Updates the world's [`WorldTime`](crate::resources::worldtime::WorldTime)
//! once per frame, applying `time_scale` to the provided delta.

use crate::world::World;

/// Update elapsed and delta seconds on the world clock.
///
/// `dt` is expected to be the unscaled frame delta in seconds. The system
/// applies the current `time_scale` and writes both `elapsed` and `delta`.
pub fn update_world_time(world: &mut World, dt: f64) {
    let wt = &mut world.time;
    let scaled_dt = dt * wt.time_scale;
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.frame_count += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_time_scale() {
        let mut world = World::new();
        world.time.time_scale = 0.5;
        update_world_time(&mut world, 0.2);
        update_world_time(&mut world, 0.2);
        assert!((world.time.delta - 0.1).abs() < 1e-12);
        assert!((world.time.elapsed - 0.2).abs() < 1e-12);
        assert_eq!(world.time.frame_count, 2);
    }
}
