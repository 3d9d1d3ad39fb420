//! Physics collaborator seam.
//!
//! The engine core never simulates anything itself. It talks to a
//! [`PhysicsEngine`] through handles: rigidbodies own dynamic bodies,
//! colliders attach shapes to the body that governs them (or to a static body
//! of their own), and after every [`step`](PhysicsEngine::step) the resulting
//! poses are pulled back into transforms.
//!
//! [`SimplePhysics`] is the built-in backend: explicit Euler integration of
//! velocity and acceleration with friction and speed clamping, optional
//! global gravity, and pairwise overlap tests between axis-aligned boxes and
//! circles. Rotation is carried through but never integrated, and box
//! shapes stay axis-aligned regardless of body rotation.

use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::math::{Angle, Vector2};
use crate::world::ids::ComponentId;

static NEXT_BODY: AtomicU64 = AtomicU64::new(1);
static NEXT_SHAPE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BodyHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ShapeHandle(u64);

impl BodyHandle {
    fn next() -> Self {
        BodyHandle(NEXT_BODY.fetch_add(1, Ordering::Relaxed))
    }
}

impl ShapeHandle {
    fn next() -> Self {
        ShapeHandle(NEXT_SHAPE.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BodyKind {
    /// Integrated every step.
    Dynamic,
    /// Never moved by the step; only by [`PhysicsEngine::set_pose`].
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Shape {
    /// Axis-aligned box centred on the shape position.
    Box { size: Vector2 },
    Circle { radius: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeDesc {
    pub shape: Shape,
    /// Offset from the body origin, in the body's frame.
    pub offset: Vector2,
    /// Collider component that owns the shape.
    pub owner: ComponentId,
}

/// Integration parameters pushed into a dynamic body before each step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMotion {
    pub velocity: Vector2,
    pub acceleration: Vector2,
    /// Velocity damping factor: `velocity *= 1 - friction * dt`.
    pub friction: f64,
    pub max_speed: Option<f64>,
    pub frozen: bool,
}

impl Default for BodyMotion {
    fn default() -> Self {
        Self {
            velocity: Vector2::ZERO,
            acceleration: Vector2::ZERO,
            friction: 0.0,
            max_speed: None,
            frozen: false,
        }
    }
}

/// World-space pose and velocity of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub kind: BodyKind,
    pub position: Vector2,
    pub rotation: Angle,
    pub velocity: Vector2,
}

/// Two shapes overlapping after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: ShapeDesc,
    pub b: ShapeDesc,
}

pub trait PhysicsEngine {
    fn create_body(&mut self, kind: BodyKind, position: Vector2, rotation: Angle) -> BodyHandle;
    /// Remove a body and every shape attached to it. Returns false if unknown.
    fn remove_body(&mut self, body: BodyHandle) -> bool;
    fn attach_shape(&mut self, body: BodyHandle, desc: ShapeDesc) -> Option<ShapeHandle>;
    fn detach_shape(&mut self, shape: ShapeHandle) -> bool;
    fn has_shape(&self, shape: ShapeHandle) -> bool;
    fn set_shape_offset(&mut self, shape: ShapeHandle, offset: Vector2) -> bool;
    fn set_pose(&mut self, body: BodyHandle, position: Vector2, rotation: Angle) -> bool;
    fn set_motion(&mut self, body: BodyHandle, motion: BodyMotion) -> bool;
    fn body(&self, body: BodyHandle) -> Option<BodyState>;
    /// Advance the simulation by `dt` seconds and report overlapping shapes.
    fn step(&mut self, dt: f64) -> Vec<Contact>;
    fn clear(&mut self);
    fn body_count(&self) -> usize;
}

#[derive(Debug, Clone)]
struct Body {
    kind: BodyKind,
    position: Vector2,
    rotation: Angle,
    motion: BodyMotion,
    shapes: Vec<ShapeHandle>,
}

#[derive(Debug, Clone, Copy)]
struct AttachedShape {
    body: BodyHandle,
    desc: ShapeDesc,
}

#[derive(Debug, Default)]
pub struct SimplePhysics {
    pub gravity: Vector2,
    bodies: FxHashMap<BodyHandle, Body>,
    shapes: FxHashMap<ShapeHandle, AttachedShape>,
}

impl SimplePhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gravity(gravity: Vector2) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    fn integrate(body: &mut Body, gravity: Vector2, dt: f64) {
        let motion = &mut body.motion;
        if motion.frozen {
            return;
        }
        motion.velocity += (motion.acceleration + gravity) * dt;
        if motion.friction > 0.0 {
            let factor = (1.0 - motion.friction * dt).max(0.0);
            motion.velocity *= factor;
        }
        if let Some(max_speed) = motion.max_speed {
            if motion.velocity.length() > max_speed {
                motion.velocity = motion.velocity.normalized() * max_speed;
            }
        }
        body.position += motion.velocity * dt;
    }

    fn world_center(&self, shape: &AttachedShape) -> Option<Vector2> {
        let body = self.bodies.get(&shape.body)?;
        Some(body.position + shape.desc.offset.rotated(body.rotation))
    }
}

/// Overlap test between two shapes placed at world-space centres.
pub fn shapes_overlap(a: Shape, a_center: Vector2, b: Shape, b_center: Vector2) -> bool {
    match (a, b) {
        (Shape::Box { size: sa }, Shape::Box { size: sb }) => {
            let (min_a, max_a) = aabb(a_center, sa);
            let (min_b, max_b) = aabb(b_center, sb);
            min_a.x < max_b.x && max_a.x > min_b.x && min_a.y < max_b.y && max_a.y > min_b.y
        }
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            a_center.distance(b_center) < ra + rb
        }
        (Shape::Box { size }, Shape::Circle { radius }) => {
            box_circle_overlap(a_center, size, b_center, radius)
        }
        (Shape::Circle { radius }, Shape::Box { size }) => {
            box_circle_overlap(b_center, size, a_center, radius)
        }
    }
}

/// Returns (min, max) of a box centred on `center`.
/// Handles negative size by normalizing to proper min/max.
pub fn aabb(center: Vector2, size: Vector2) -> (Vector2, Vector2) {
    let p0 = center - size * 0.5;
    let p1 = center + size * 0.5;
    let min = Vector2::new(p0.x.min(p1.x), p0.y.min(p1.y));
    let max = Vector2::new(p0.x.max(p1.x), p0.y.max(p1.y));
    (min, max)
}

fn box_circle_overlap(box_center: Vector2, size: Vector2, circle: Vector2, radius: f64) -> bool {
    let (min, max) = aabb(box_center, size);
    let closest = Vector2::new(circle.x.clamp(min.x, max.x), circle.y.clamp(min.y, max.y));
    closest.distance(circle) < radius
}

impl PhysicsEngine for SimplePhysics {
    fn create_body(&mut self, kind: BodyKind, position: Vector2, rotation: Angle) -> BodyHandle {
        let handle = BodyHandle::next();
        self.bodies.insert(
            handle,
            Body {
                kind,
                position,
                rotation,
                motion: BodyMotion::default(),
                shapes: Vec::new(),
            },
        );
        debug!("physics: created {:?} body {:?} at {}", kind, handle, position);
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        match self.bodies.remove(&body) {
            Some(removed) => {
                for shape in removed.shapes {
                    self.shapes.remove(&shape);
                }
                true
            }
            None => false,
        }
    }

    fn attach_shape(&mut self, body: BodyHandle, desc: ShapeDesc) -> Option<ShapeHandle> {
        let Some(target) = self.bodies.get_mut(&body) else {
            warn!("physics: cannot attach shape to unknown body {:?}", body);
            return None;
        };
        let handle = ShapeHandle::next();
        target.shapes.push(handle);
        self.shapes.insert(handle, AttachedShape { body, desc });
        Some(handle)
    }

    fn detach_shape(&mut self, shape: ShapeHandle) -> bool {
        let Some(attached) = self.shapes.remove(&shape) else {
            return false;
        };
        if let Some(body) = self.bodies.get_mut(&attached.body) {
            body.shapes.retain(|s| *s != shape);
        }
        true
    }

    fn has_shape(&self, shape: ShapeHandle) -> bool {
        self.shapes.contains_key(&shape)
    }

    fn set_shape_offset(&mut self, shape: ShapeHandle, offset: Vector2) -> bool {
        match self.shapes.get_mut(&shape) {
            Some(attached) => {
                attached.desc.offset = offset;
                true
            }
            None => false,
        }
    }

    fn set_pose(&mut self, body: BodyHandle, position: Vector2, rotation: Angle) -> bool {
        match self.bodies.get_mut(&body) {
            Some(target) => {
                target.position = position;
                target.rotation = rotation;
                true
            }
            None => false,
        }
    }

    fn set_motion(&mut self, body: BodyHandle, motion: BodyMotion) -> bool {
        match self.bodies.get_mut(&body) {
            Some(target) => {
                target.motion = motion;
                true
            }
            None => false,
        }
    }

    fn body(&self, body: BodyHandle) -> Option<BodyState> {
        self.bodies.get(&body).map(|b| BodyState {
            kind: b.kind,
            position: b.position,
            rotation: b.rotation,
            velocity: b.motion.velocity,
        })
    }

    fn step(&mut self, dt: f64) -> Vec<Contact> {
        let gravity = self.gravity;
        for body in self.bodies.values_mut() {
            if body.kind == BodyKind::Dynamic {
                Self::integrate(body, gravity, dt);
            }
        }

        let mut handles: Vec<ShapeHandle> = self.shapes.keys().copied().collect();
        handles.sort();
        let mut placed = Vec::with_capacity(handles.len());
        for handle in handles {
            let Some(attached) = self.shapes.get(&handle).copied() else {
                continue;
            };
            let Some(center) = self.world_center(&attached) else {
                continue;
            };
            let kind = self.bodies.get(&attached.body).map(|b| b.kind);
            placed.push((attached, center, kind));
        }

        let mut contacts = Vec::new();
        for (i, (a, a_center, a_kind)) in placed.iter().enumerate() {
            for (b, b_center, b_kind) in &placed[i + 1..] {
                if a.body == b.body {
                    continue;
                }
                if *a_kind != Some(BodyKind::Dynamic) && *b_kind != Some(BodyKind::Dynamic) {
                    continue;
                }
                if shapes_overlap(a.desc.shape, *a_center, b.desc.shape, *b_center) {
                    contacts.push(Contact {
                        a: a.desc,
                        b: b.desc,
                    });
                }
            }
        }
        contacts
    }

    fn clear(&mut self) {
        self.bodies.clear();
        self.shapes.clear();
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
