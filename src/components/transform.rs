//! Local spatial state of a game object.
//!
//! Every game object owns exactly one [`Transform`] for its whole life. The
//! values are local to the parent's frame. Once per frame the world ticks
//! each transform (see [`crate::systems::transform`]): the values are compared
//! with last frame's, and the differences are classified as user-caused or
//! engine-caused before the change events go out.
//!
//! Engine writes go through [`Transform::internal_set`], which records the
//! written values. At tick time a channel whose current value still equals
//! the recorded one is attributed to the engine.

use std::cell::Cell;

use crate::components::component::Component;
use crate::components::kind::ComponentKind;
use crate::error::EngineResult;
use crate::events::eventtarget::{EventTarget, ListenerId};
use crate::events::transform::{FrameDelta, TransformDelta};
use crate::math::{Angle, Transformation, Vector2};

/// Closure notified of this transform's own change events.
pub type TransformObserver = Box<dyn FnMut(&TransformDelta) -> EngineResult<()>>;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct EngineWrites {
    position: Option<Vector2>,
    rotation: Option<Angle>,
    scale: Option<Vector2>,
}

/// Cached world-space values, valid while the world's transform epoch is
/// unchanged.
#[derive(Debug, Clone, Copy)]
struct GlobalCache {
    epoch: u64,
    position: Vector2,
    rotation: Angle,
    scale: Vector2,
}

#[derive(Debug)]
pub struct Transform {
    position: Vector2,
    rotation: Angle,
    scale: Vector2,
    prev_position: Vector2,
    prev_rotation: Angle,
    prev_scale: Vector2,
    engine_writes: EngineWrites,
    global: Cell<Option<GlobalCache>>,
    observers: EventTarget<TransformObserver>,
}

impl Component for Transform {
    const KIND: ComponentKind = ComponentKind::Transform;
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::from_parts(Vector2::ZERO, Angle::ZERO, Vector2::ONE)
    }

    pub fn from_parts(position: Vector2, rotation: Angle, scale: Vector2) -> Self {
        Self {
            position,
            rotation,
            scale,
            prev_position: position,
            prev_rotation: rotation,
            prev_scale: scale,
            engine_writes: EngineWrites::default(),
            global: Cell::new(None),
            observers: EventTarget::new(),
        }
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn rotation(&self) -> Angle {
        self.rotation
    }

    pub fn scale(&self) -> Vector2 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vector2) -> &mut Self {
        self.position = position;
        self
    }

    pub fn set_rotation(&mut self, rotation: Angle) -> &mut Self {
        self.rotation = rotation;
        self
    }

    pub fn set_scale(&mut self, scale: Vector2) -> &mut Self {
        self.scale = scale;
        self
    }

    /// In-place access, e.g. `transform.position_mut().add_mut(step)`.
    pub fn position_mut(&mut self) -> &mut Vector2 {
        &mut self.position
    }

    pub fn rotation_mut(&mut self) -> &mut Angle {
        &mut self.rotation
    }

    pub fn scale_mut(&mut self) -> &mut Vector2 {
        &mut self.scale
    }

    pub fn translate(&mut self, offset: Vector2) -> &mut Self {
        self.position += offset;
        self
    }

    pub fn rotate(&mut self, angle: Angle) -> &mut Self {
        self.rotation += angle;
        self
    }

    /// Engine-side write. The next tick reports these channels as
    /// `modifiedinternal` instead of `modified`.
    pub fn internal_set(
        &mut self,
        position: Option<Vector2>,
        rotation: Option<Angle>,
        scale: Option<Vector2>,
    ) {
        if let Some(position) = position {
            self.position = position;
            self.engine_writes.position = Some(position);
        }
        if let Some(rotation) = rotation {
            self.rotation = rotation;
            self.engine_writes.rotation = Some(rotation);
        }
        if let Some(scale) = scale {
            self.scale = scale;
            self.engine_writes.scale = Some(scale);
        }
    }

    /// True when a value differs from last frame's.
    pub fn is_dirty(&self) -> bool {
        self.position != self.prev_position
            || self.rotation_changed()
            || self.scale != self.prev_scale
    }

    /// Exact on the raw value: `Angle`'s `==` tolerates tiny steps and
    /// treats whole turns as equal.
    fn rotation_changed(&self) -> bool {
        self.rotation.raw_radian() != self.prev_rotation.raw_radian()
    }

    /// Compute this frame's differences, then make the current values the
    /// new baseline and forget engine writes.
    ///
    /// Returns `None` when nothing changed.
    pub(crate) fn take_frame_delta(&mut self) -> Option<FrameDelta> {
        let mut frame = FrameDelta::default();
        let writes = self.engine_writes;

        if self.position != self.prev_position {
            let diff = self.position - self.prev_position;
            frame.all.position = Some(diff);
            if writes.position == Some(self.position) {
                frame.engine.position = Some(diff);
            } else {
                frame.user.position = Some(diff);
            }
        }
        if self.rotation_changed() {
            let diff = self.rotation - self.prev_rotation;
            frame.all.rotation = Some(diff);
            if writes.rotation.is_some_and(|r| r.raw_radian() == self.rotation.raw_radian()) {
                frame.engine.rotation = Some(diff);
            } else {
                frame.user.rotation = Some(diff);
            }
        }
        if self.scale != self.prev_scale {
            let diff = self.scale - self.prev_scale;
            frame.all.scale = Some(diff);
            if writes.scale == Some(self.scale) {
                frame.engine.scale = Some(diff);
            } else {
                frame.user.scale = Some(diff);
            }
        }

        self.prev_position = self.position;
        self.prev_rotation = self.rotation;
        self.prev_scale = self.scale;
        self.engine_writes = EngineWrites::default();

        (!frame.all.is_empty()).then_some(frame)
    }

    /// Local values as a parentless transformation.
    pub fn local(&self, id: u64) -> Transformation {
        Transformation::identity(id)
            .with_position(self.position)
            .with_rotation(self.rotation)
            .with_scale(self.scale)
    }

    pub(crate) fn cached_global(&self, id: u64, epoch: u64) -> Option<Transformation> {
        let cache = self.global.get().filter(|cache| cache.epoch == epoch)?;
        Some(
            Transformation::identity(id)
                .with_position(cache.position)
                .with_rotation(cache.rotation)
                .with_scale(cache.scale),
        )
    }

    pub(crate) fn store_global(&self, global: &Transformation, epoch: u64) {
        self.global.set(Some(GlobalCache {
            epoch,
            position: global.position,
            rotation: global.rotation,
            scale: global.scale,
        }));
    }

    /// Register a closure for one of this transform's own change events.
    pub fn observe(&mut self, event: impl Into<String>, observer: TransformObserver) -> ListenerId {
        self.observers.add_listener(event, observer)
    }

    pub fn unobserve(&mut self, id: ListenerId) -> bool {
        self.observers.remove_listener(id)
    }

    pub(crate) fn notify(&mut self, event: &str, delta: &TransformDelta) -> EngineResult<usize> {
        self.observers.dispatch(event, |observer| observer(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_transform_has_no_delta() {
        let mut t = Transform::new();
        assert!(t.take_frame_delta().is_none());
        t.set_position(Vector2::new(1.0, 0.0));
        t.set_position(Vector2::ZERO);
        assert!(t.take_frame_delta().is_none());
    }

    #[test]
    fn user_write_is_classified_as_user() {
        let mut t = Transform::new();
        t.set_position(Vector2::new(3.0, 4.0));
        let frame = t.take_frame_delta().unwrap();
        assert_eq!(frame.all.position, Some(Vector2::new(3.0, 4.0)));
        assert_eq!(frame.user.position, Some(Vector2::new(3.0, 4.0)));
        assert!(frame.engine.is_empty());
    }

    #[test]
    fn internal_set_is_classified_as_engine() {
        let mut t = Transform::new();
        t.internal_set(Some(Vector2::new(3.0, 4.0)), None, Some(Vector2::new(2.0, 2.0)));
        let frame = t.take_frame_delta().unwrap();
        assert_eq!(frame.engine.position, Some(Vector2::new(3.0, 4.0)));
        assert_eq!(frame.engine.scale, Some(Vector2::ONE));
        assert!(frame.user.is_empty());
        // engine writes are forgotten after the tick
        t.translate(Vector2::new(1.0, 0.0));
        let next = t.take_frame_delta().unwrap();
        assert_eq!(next.user.position, Some(Vector2::new(1.0, 0.0)));
    }

    #[test]
    fn user_overwrite_after_internal_set_counts_as_user() {
        let mut t = Transform::new();
        t.internal_set(Some(Vector2::new(3.0, 0.0)), None, None);
        t.set_position(Vector2::new(5.0, 0.0));
        let frame = t.take_frame_delta().unwrap();
        assert_eq!(frame.user.position, Some(Vector2::new(5.0, 0.0)));
        assert!(frame.engine.is_empty());
    }

    #[test]
    fn rotation_delta_is_reported_per_channel() {
        let mut t = Transform::new();
        t.rotate(Angle::from_degrees(30.0));
        t.internal_set(None, None, Some(Vector2::new(0.5, 0.5)));
        let frame = t.take_frame_delta().unwrap();
        assert_eq!(frame.user.rotation, Some(Angle::from_degrees(30.0)));
        assert!(frame.user.scale.is_none());
        assert!(frame.engine.scale.is_some());
        assert!(!t.is_dirty());
    }

    #[test]
    fn slow_spins_and_full_turns_are_reported() {
        let mut t = Transform::new();
        t.rotate(Angle::from_radians(1e-9));
        assert!(t.is_dirty());
        let frame = t.take_frame_delta().unwrap();
        assert!((frame.user.rotation.unwrap().raw_radian() - 1e-9).abs() < 1e-15);

        t.rotate(Angle::from_degrees(360.0));
        let frame = t.take_frame_delta().unwrap();
        assert!((frame.all.rotation.unwrap().raw_degree() - 360.0).abs() < 1e-6);
        assert!(t.take_frame_delta().is_none());
    }

    #[test]
    fn global_cache_is_keyed_by_epoch() {
        let t = Transform::new();
        let global = Transformation::identity(1).with_position(Vector2::new(1.0, 2.0));
        t.store_global(&global, 7);
        assert!(t.cached_global(1, 8).is_none());
        assert_eq!(t.cached_global(1, 7).unwrap().position, Vector2::new(1.0, 2.0));
    }
}
