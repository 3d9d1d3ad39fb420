//! Physics step and synchronisation.
//!
//! 1. Every live Rigidbody pushes its velocity and forces into its body.
//!    Inactive rigidbodies are frozen for the step.
//! 2. The backend steps.
//! 3. Body poses are pulled back into transforms with
//!    [`Transform::internal_set`](crate::components::transform::Transform::internal_set),
//!    so the next tick reports them as `modifiedinternal`. Velocities are
//!    copied back into the rigidbodies.
//! 4. Each contact is delivered as a `collision` event to both colliders'
//!    game objects.

use log::debug;

use crate::components::kind::ComponentKind;
use crate::components::rigidbody::Rigidbody;
use crate::error::EngineResult;
use crate::events::collision::{CollisionEvent, COLLISION};
use crate::events::eventtarget::dispatch_all;
use crate::events::EventPayload;
use crate::math::Transformation;
use crate::resources::physics::{BodyHandle, Contact};
use crate::world::ids::{ComponentId, GameObjectId};
use crate::world::World;

/// Below this a pulled-back pose counts as unchanged.
const SYNC_EPSILON: f64 = 1e-9;

struct Tracked {
    id: ComponentId,
    owner: GameObjectId,
    body: BodyHandle,
    frozen: bool,
}

fn tracked_bodies(world: &World) -> Vec<Tracked> {
    world
        .components_of_kind(ComponentKind::Rigidbody)
        .into_iter()
        .filter(|id| !world.is_pending_destroy(*id))
        .filter_map(|id| {
            let owner = world.component_owner(id)?;
            let rb = world.component::<Rigidbody>(id).ok()?;
            Some(Tracked {
                id,
                owner,
                body: rb.body()?,
                frozen: rb.frozen || !world.is_component_active(id),
            })
        })
        .collect()
}

/// Advance the simulation by `dt` seconds.
pub fn step(world: &mut World, dt: f64) -> EngineResult<usize> {
    let tracked = tracked_bodies(world);
    for t in &tracked {
        let mut motion = world.component::<Rigidbody>(t.id)?.motion();
        motion.frozen = t.frozen;
        world.physics_mut().set_motion(t.body, motion);
    }

    let contacts = world.physics_mut().step(dt);

    for t in tracked.iter().filter(|t| !t.frozen) {
        pull_back(world, t)?;
    }

    let delivered = contacts.len();
    dispatch_all(COLLISION, contacts, |contact: Contact| {
        deliver(world, contact.a.owner, contact.b.owner)?;
        deliver(world, contact.b.owner, contact.a.owner)
    })?;
    Ok(delivered)
}

fn pull_back(world: &mut World, t: &Tracked) -> EngineResult<()> {
    let Some(state) = world.physics().body(t.body) else {
        return Ok(());
    };
    world.component_mut::<Rigidbody>(t.id)?.velocity = state.velocity;

    let global = world.to_global(t.owner)?;
    let moved = !state.position.approx_eq(global.position, SYNC_EPSILON);
    let turned = !state.rotation.equals(&global.rotation, SYNC_EPSILON);
    if !moved && !turned {
        return Ok(());
    }
    let target = Transformation::identity(t.owner.raw())
        .with_position(state.position)
        .with_rotation(state.rotation)
        .with_scale(global.scale);
    let local = world.global_to_local(t.owner, &target)?;
    world.transform_mut(t.owner)?.internal_set(
        moved.then_some(local.position),
        turned.then_some(local.rotation),
        None,
    );
    Ok(())
}

fn deliver(world: &mut World, collider: ComponentId, other: ComponentId) -> EngineResult<()> {
    let (Some(owner), Some(other_object)) = (world.component_owner(collider), world.component_owner(other)) else {
        return Ok(());
    };
    if world.is_pending_destroy(collider) {
        debug!("collision for {} dropped: it is being destroyed", collider);
        return Ok(());
    }
    let payload = EventPayload::Collision(CollisionEvent {
        collider,
        other,
        other_object,
    });
    world.emit(owner, COLLISION, &payload).map(|_| ())
}
