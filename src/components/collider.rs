//! Behaviour shared by [`BoxCollider`](super::boxcollider::BoxCollider) and
//! [`CircleCollider`](super::circlecollider::CircleCollider).
//!
//! A collider attaches one shape to the body of its *governing* Rigidbody:
//! the Rigidbody on the collider's own game object, or else the one on its
//! nearest ancestor. Without one, the collider creates and owns a static
//! body placed at its game object's world pose.
//!
//! The collider keeps that attachment current:
//!
//! - `componentadd` / `componentremove` for a Rigidbody anywhere above it
//!   re-resolve the governing body and reconnect if it changed;
//! - `modified` / `parentmodified` (user moves only) re-place the shape, or
//!   the owned static body. A scale change rebuilds the shape.
//!
//! Engine writes (`modifiedinternal`) are ignored: they come from the body
//! the shape already rides on.

use log::{debug, warn};

use crate::components::component::{ColliderShape, Lifecycle};
use crate::components::kind::ComponentKind;
use crate::components::rigidbody::Rigidbody;
use crate::error::EngineResult;
use crate::events::transform::{MODIFIED, PARENT_MODIFIED};
use crate::events::{self, EventPayload};
use crate::math::transformable;
use crate::math::{Transformation, Vector2};
use crate::resources::physics::{BodyHandle, BodyKind, Shape, ShapeDesc, ShapeHandle};
use crate::world::context::Context;
use crate::world::ids::{ComponentId, GameObjectId};
use crate::world::World;

/// Where a collider's shape currently lives in the physics backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    pub body: Option<BodyHandle>,
    pub shape: Option<ShapeHandle>,
    /// Governing Rigidbody, `None` when the body is the collider's own.
    pub rigidbody: Option<ComponentId>,
    /// The body is a static body created for this collider.
    pub owns_body: bool,
}

impl Attachment {
    pub fn is_connected(&self) -> bool {
        self.shape.is_some()
    }
}

/// Rigidbody on `go` or its nearest ancestor, skipping those being destroyed.
pub(crate) fn governing_rigidbody(world: &World, go: GameObjectId) -> EngineResult<Option<ComponentId>> {
    let mut chain = vec![go];
    chain.extend(world.ancestors(go)?);
    for candidate in chain {
        let found = world
            .query_components(candidate, ComponentKind::Rigidbody)
            .into_iter()
            .find(|id| !world.is_pending_destroy(*id));
        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}

/// Lifecycle hooks every collider kind registers.
pub(crate) fn collider_lifecycle<C: ColliderShape>() -> Lifecycle<C> {
    Lifecycle::new()
        .awake(connect::<C>)
        .prepare_destroy(disconnect::<C>)
        .on(events::COMPONENT_ADD, reresolve::<C>)
        .on(events::COMPONENT_REMOVE, reresolve::<C>)
        .on(MODIFIED, follow::<C>)
        .on(PARENT_MODIFIED, follow::<C>)
}

/// Shape size in world units for the given global scale.
fn scaled(shape: Shape, scale: Vector2) -> Shape {
    match shape {
        Shape::Box { size } => Shape::Box {
            size: Vector2::new(size.x * scale.x.abs(), size.y * scale.y.abs()),
        },
        Shape::Circle { radius } => Shape::Circle {
            radius: radius * scale.x.abs().max(scale.y.abs()),
        },
    }
}

/// The collider's offset point expressed in the frame of the body sitting on
/// `frame`'s world pose. Bodies carry no scale.
fn body_offset(world: &World, go: GameObjectId, frame: GameObjectId, offset: Vector2) -> EngineResult<Vector2> {
    let point = Transformation::identity(0)
        .with_position(offset)
        .with_parent(Some(world.transformation(go)?));
    let point = transformable::to_global(&point)?.position;
    let body = world.to_global(frame)?;
    Ok((point - body.position).rotated(-body.rotation))
}

fn connect<C: ColliderShape>(collider: &mut C, ctx: &mut Context<'_>) -> EngineResult<()> {
    let go = ctx.game_object;
    let rigidbody = governing_rigidbody(ctx.world, go)?;
    let (body, frame, owns_body) = match rigidbody {
        Some(rb) => {
            let frame = ctx.world.component_owner(rb).unwrap_or(go);
            match ctx.world.component::<Rigidbody>(rb).ok().and_then(Rigidbody::body) {
                Some(body) => (body, frame, false),
                None => {
                    warn!("collider {}: rigidbody {} has no body yet", ctx.component, rb);
                    return Ok(());
                }
            }
        }
        None => {
            let global = ctx.global()?;
            let body = ctx
                .world
                .physics_mut()
                .create_body(BodyKind::Static, global.position, global.rotation);
            (body, go, true)
        }
    };
    let scale = ctx.global()?.scale;
    let desc = ShapeDesc {
        shape: scaled(collider.shape(), scale),
        offset: body_offset(ctx.world, go, frame, collider.offset())?,
        owner: ctx.component,
    };
    let shape = ctx.world.physics_mut().attach_shape(body, desc);
    *collider.attachment_mut() = Attachment {
        body: Some(body),
        shape,
        rigidbody,
        owns_body,
    };
    debug!(
        "collider {} connected to {:?} ({})",
        ctx.component,
        body,
        if owns_body { "own static body" } else { "rigidbody" }
    );
    Ok(())
}

fn release<C: ColliderShape>(collider: &mut C, world: &mut World) {
    let attachment = std::mem::take(collider.attachment_mut());
    if let Some(shape) = attachment.shape {
        world.physics_mut().detach_shape(shape);
    }
    if attachment.owns_body {
        if let Some(body) = attachment.body {
            world.physics_mut().remove_body(body);
        }
    }
}

fn disconnect<C: ColliderShape>(collider: &mut C, ctx: &mut Context<'_>) -> EngineResult<()> {
    if !collider.attachment().is_connected() {
        warn!("collider {} is not connected", ctx.component);
    }
    release(collider, ctx.world);
    Ok(())
}

fn reconnect<C: ColliderShape>(collider: &mut C, ctx: &mut Context<'_>) -> EngineResult<()> {
    release(collider, ctx.world);
    connect(collider, ctx)
}

fn reresolve<C: ColliderShape>(collider: &mut C, ctx: &mut Context<'_>, payload: &EventPayload) -> EngineResult<()> {
    let EventPayload::Component { id, kind } = payload else {
        return Ok(());
    };
    if *id == ctx.component || *kind != ComponentKind::Rigidbody {
        return Ok(());
    }
    let governing = governing_rigidbody(ctx.world, ctx.game_object)?;
    if governing == collider.attachment().rigidbody && collider.attachment().is_connected() {
        return Ok(());
    }
    debug!("collider {} changes governing rigidbody to {:?}", ctx.component, governing);
    reconnect(collider, ctx)
}

fn follow<C: ColliderShape>(collider: &mut C, ctx: &mut Context<'_>, payload: &EventPayload) -> EngineResult<()> {
    if let EventPayload::Transform(delta) = payload {
        if delta.scale.is_some() {
            return reconnect(collider, ctx);
        }
    }
    let attachment = collider.attachment().clone();
    let (Some(body), Some(shape)) = (attachment.body, attachment.shape) else {
        return Ok(());
    };
    let go = ctx.game_object;
    if attachment.owns_body {
        let global = ctx.global()?;
        ctx.world
            .physics_mut()
            .set_pose(body, global.position, global.rotation);
        let offset = body_offset(ctx.world, go, go, collider.offset())?;
        ctx.world.physics_mut().set_shape_offset(shape, offset);
        return Ok(());
    }
    let frame = attachment
        .rigidbody
        .and_then(|rb| ctx.world.component_owner(rb))
        .unwrap_or(go);
    let offset = body_offset(ctx.world, go, frame, collider.offset())?;
    ctx.world.physics_mut().set_shape_offset(shape, offset);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::boxcollider::BoxCollider;
    use crate::components::circlecollider::CircleCollider;
    use crate::math::Angle;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn collider_without_rigidbody_owns_a_static_body() {
        let mut world = World::new();
        let wall = world.create_game_object("wall").unwrap();
        world.transform_mut(wall).unwrap().set_position(Vector2::new(5.0, 5.0));
        let id = world.add_component(wall, BoxCollider::new(Vector2::new(2.0, 2.0))).unwrap();

        let attachment = world.component::<BoxCollider>(id).unwrap().attachment().clone();
        assert!(attachment.owns_body);
        assert_eq!(attachment.rigidbody, None);
        let body = world.physics().body(attachment.body.unwrap()).unwrap();
        assert_eq!(body.kind, BodyKind::Static);
        assert!(body.position.approx_eq(Vector2::new(5.0, 5.0), EPSILON));
    }

    #[test]
    fn collider_rides_on_ancestor_rigidbody() {
        let mut world = World::new();
        let ship = world.create_game_object("ship").unwrap();
        let rb = world.add_component(ship, Rigidbody::new()).unwrap();
        let wing = world.create_child(ship, "wing").unwrap();
        world.transform_mut(wing).unwrap().set_position(Vector2::new(3.0, 0.0));
        let id = world.add_component(wing, CircleCollider::new(1.0)).unwrap();

        let attachment = world.component::<CircleCollider>(id).unwrap().attachment().clone();
        assert_eq!(attachment.rigidbody, Some(rb));
        assert!(!attachment.owns_body);
        assert_eq!(attachment.body, world.component::<Rigidbody>(rb).unwrap().body());
    }

    #[test]
    fn adding_a_rigidbody_above_reconnects_the_collider() {
        let mut world = World::new();
        let root = world.create_game_object("root").unwrap();
        let child = world.create_child(root, "child").unwrap();
        let id = world.add_component(child, BoxCollider::new(Vector2::ONE)).unwrap();
        assert!(world.component::<BoxCollider>(id).unwrap().attachment().owns_body);
        let bodies_before = world.physics().body_count();

        let rb = world.add_component(root, Rigidbody::new()).unwrap();
        let attachment = world.component::<BoxCollider>(id).unwrap().attachment().clone();
        assert_eq!(attachment.rigidbody, Some(rb));
        assert!(!attachment.owns_body);
        // the collider's own static body is gone, the rigidbody's was added
        assert_eq!(world.physics().body_count(), bodies_before);

        world.remove_component(rb).unwrap();
        let attachment = world.component::<BoxCollider>(id).unwrap().attachment().clone();
        assert!(attachment.owns_body);
        assert!(attachment.is_connected());
    }

    #[test]
    fn offset_is_expressed_in_the_body_frame() {
        let mut world = World::new();
        let root = world.create_game_object("root").unwrap();
        world
            .transform_mut(root)
            .unwrap()
            .set_rotation(Angle::from_degrees(90.0));
        world.add_component(root, Rigidbody::new()).unwrap();
        let child = world.create_child(root, "child").unwrap();
        world.transform_mut(child).unwrap().set_position(Vector2::new(2.0, 0.0));

        let offset = body_offset(&world, child, root, Vector2::new(1.0, 0.0)).unwrap();
        assert!(offset.approx_eq(Vector2::new(3.0, 0.0), EPSILON));
    }

    #[test]
    fn scale_grows_the_shape() {
        let shape = scaled(Shape::Circle { radius: 2.0 }, Vector2::new(-3.0, 1.0));
        assert_eq!(shape, Shape::Circle { radius: 6.0 });
    }
}
