//! Dynamic body component.
//!
//! A [`Rigidbody`] owns one dynamic body in the physics backend for as long
//! as it lives. Its acceleration is the sum of named [`Force`]s that game
//! logic switches on and off independently (gravity, wind, thrust).
//!
//! Per frame:
//!
//! 1. user moves of the object (`modified` / `parentmodified`) teleport the
//!    body;
//! 2. velocity and forces become the body's motion before the step;
//! 3. after the step the body's pose comes back through
//!    [`Transform::internal_set`](crate::components::transform::Transform::internal_set)
//!    and its velocity is copied back here.

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::components::component::{Component, Lifecycle};
use crate::components::kind::ComponentKind;
use crate::error::EngineResult;
use crate::events::transform::{MODIFIED, PARENT_MODIFIED};
use crate::events::EventPayload;
use crate::math::Vector2;
use crate::resources::physics::{BodyHandle, BodyKind, BodyMotion};
use crate::world::context::Context;

/// Constant acceleration contributed while `enabled`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Force {
    pub acceleration: Vector2,
    pub enabled: bool,
}

/// Dynamic body driven by its velocity and a set of named forces.
///
/// ```ignore
/// let mut rb = Rigidbody::with_physics(5.0, Some(300.0));
/// rb.set_force("gravity", Vector2::new(0.0, 980.0))
///     .set_force("wind", Vector2::new(50.0, 0.0));
/// rb.toggle_force("gravity", false); // grounded
/// let id = world.add_component(player, rb)?;
/// ```
#[derive(Clone, Debug)]
pub struct Rigidbody {
    /// World units per second.
    pub velocity: Vector2,
    pub forces: FxHashMap<String, Force>,
    /// `velocity *= 1 - friction * dt` each step.
    pub friction: f64,
    pub max_speed: Option<f64>,
    /// Skipped by the physics step while set.
    pub frozen: bool,
    body: Option<BodyHandle>,
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Rigidbody {
    const KIND: ComponentKind = ComponentKind::Rigidbody;

    fn lifecycle() -> Lifecycle<Self> {
        Lifecycle::new()
            .awake(create_body)
            .prepare_destroy(remove_body)
            .on(MODIFIED, push_pose)
            .on(PARENT_MODIFIED, push_pose)
    }
}

fn create_body(rb: &mut Rigidbody, ctx: &mut Context<'_>) -> EngineResult<()> {
    let global = ctx.global()?;
    let body = ctx
        .world
        .physics_mut()
        .create_body(BodyKind::Dynamic, global.position, global.rotation);
    ctx.world.physics_mut().set_motion(body, rb.motion());
    rb.body = Some(body);
    Ok(())
}

fn remove_body(rb: &mut Rigidbody, ctx: &mut Context<'_>) -> EngineResult<()> {
    match rb.body.take() {
        Some(body) => {
            ctx.world.physics_mut().remove_body(body);
            debug!("rigidbody {} left the physics world", ctx.component);
        }
        None => warn!("rigidbody {} has no body to remove", ctx.component),
    }
    Ok(())
}

/// User moves teleport the body.
fn push_pose(rb: &mut Rigidbody, ctx: &mut Context<'_>, _: &EventPayload) -> EngineResult<()> {
    let Some(body) = rb.body else {
        return Ok(());
    };
    let global = ctx.global()?;
    ctx.world
        .physics_mut()
        .set_pose(body, global.position, global.rotation);
    Ok(())
}

impl Rigidbody {
    pub fn new() -> Self {
        Self {
            velocity: Vector2::ZERO,
            forces: FxHashMap::default(),
            friction: 0.0,
            max_speed: None,
            frozen: false,
            body: None,
        }
    }

    pub fn with_physics(friction: f64, max_speed: Option<f64>) -> Self {
        Self {
            friction,
            max_speed,
            ..Self::new()
        }
    }

    /// Handle of the backing body, once awake.
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    /// Integration parameters for the next physics step.
    pub fn motion(&self) -> BodyMotion {
        BodyMotion {
            velocity: self.velocity,
            acceleration: self.acceleration(),
            friction: self.friction,
            max_speed: self.max_speed,
            frozen: self.frozen,
        }
    }

    /// Insert or replace an enabled force.
    pub fn set_force(&mut self, name: impl Into<String>, acceleration: Vector2) -> &mut Self {
        self.forces.insert(
            name.into(),
            Force {
                acceleration,
                enabled: true,
            },
        );
        self
    }

    pub fn remove_force(&mut self, name: &str) -> Option<Force> {
        self.forces.remove(name)
    }

    /// Returns false for an unknown force.
    pub fn toggle_force(&mut self, name: &str, enabled: bool) -> bool {
        match self.forces.get_mut(name) {
            Some(force) => {
                force.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn force(&self, name: &str) -> Option<Force> {
        self.forces.get(name).copied()
    }

    /// Sum of the enabled forces.
    pub fn acceleration(&self) -> Vector2 {
        self.forces
            .values()
            .filter(|force| force.enabled)
            .fold(Vector2::ZERO, |sum, force| sum + force.acceleration)
    }

    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.velocity = velocity;
    }

    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Rescale the velocity to `speed`, keeping its heading. A body at rest
    /// has no heading and is left alone.
    pub fn set_speed(&mut self, speed: f64) {
        if self.velocity == Vector2::ZERO {
            warn!("set_speed({}) on a rigidbody at rest ignored", speed);
            return;
        }
        self.velocity = self.velocity.normalized() * speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::World;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn forces_are_replaced_by_name() {
        let mut rb = Rigidbody::new();
        rb.set_force("gravity", Vector2::new(0.0, 100.0))
            .set_force("gravity", Vector2::new(0.0, 200.0));
        assert_eq!(rb.forces.len(), 1);
        assert_eq!(
            rb.force("gravity"),
            Some(Force {
                acceleration: Vector2::new(0.0, 200.0),
                enabled: true
            })
        );
    }

    #[test]
    fn disabled_forces_do_not_accelerate() {
        let mut rb = Rigidbody::new();
        rb.set_force("gravity", Vector2::new(0.0, 980.0))
            .set_force("wind", Vector2::new(50.0, 0.0))
            .set_force("thrust", Vector2::new(0.0, -500.0));
        assert!(rb.toggle_force("thrust", false));
        assert!(!rb.toggle_force("missing", true));
        assert_eq!(rb.acceleration(), Vector2::new(50.0, 980.0));

        assert!(rb.remove_force("wind").is_some());
        assert!(rb.remove_force("wind").is_none());
        assert_eq!(rb.acceleration(), Vector2::new(0.0, 980.0));
    }

    #[test]
    fn set_speed_keeps_heading() {
        let mut rb = Rigidbody::new();
        rb.set_speed(10.0);
        assert_eq!(rb.velocity(), Vector2::ZERO);
        rb.set_velocity(Vector2::new(3.0, 4.0));
        rb.set_speed(10.0);
        assert!(approx_eq(rb.velocity().x, 6.0));
        assert!(approx_eq(rb.velocity().y, 8.0));
    }

    #[test]
    fn motion_carries_every_parameter() {
        let mut rb = Rigidbody::with_physics(5.0, Some(300.0));
        rb.set_force("gravity", Vector2::new(0.0, 9.0));
        rb.freeze();
        let motion = rb.motion();
        assert!(approx_eq(motion.friction, 5.0));
        assert_eq!(motion.max_speed, Some(300.0));
        assert_eq!(motion.acceleration, Vector2::new(0.0, 9.0));
        assert!(motion.frozen);
        rb.unfreeze();
        assert!(!rb.motion().frozen);
    }

    #[test]
    fn body_follows_the_component_lifecycle() {
        let mut world = World::new();
        let go = world.create_game_object("crate").unwrap();
        world.transform_mut(go).unwrap().set_position(Vector2::new(3.0, 1.0));
        let id = world.add_component(go, Rigidbody::new()).unwrap();
        let body = world.component::<Rigidbody>(id).unwrap().body().unwrap();
        let state = world.physics().body(body).unwrap();
        assert_eq!(state.kind, BodyKind::Dynamic);
        assert_eq!(state.position, Vector2::new(3.0, 1.0));

        world.destroy_component(id).unwrap();
        assert!(world.physics().body(body).is_none());
    }
}
