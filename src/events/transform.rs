//! Transform change notifications.
//!
//! Once per frame every live transform compares its local values with the
//! previous frame's and emits, when something changed:
//!
//! - [`CHANGE`] on itself and [`PARENT_CHANGE`] on every descendant, with
//!   the full delta;
//! - [`MODIFIED`] / [`PARENT_MODIFIED`] with the part written by user code;
//! - [`MODIFIED_INTERNAL`] / [`PARENT_MODIFIED_INTERNAL`] with the part
//!   written by the physics engine through
//!   [`Transform::internal_set`](crate::components::transform::Transform::internal_set).
//!
//! Colliders push `modified` moves into physics; rigidbodies ignore their
//! own `modifiedinternal` echoes, which keeps the two from feeding back.

use serde::Serialize;

use crate::math::{Angle, Vector2};

pub const CHANGE: &str = "change";
pub const PARENT_CHANGE: &str = "parentchange";
pub const MODIFIED: &str = "modified";
pub const PARENT_MODIFIED: &str = "parentmodified";
pub const MODIFIED_INTERNAL: &str = "modifiedinternal";
pub const PARENT_MODIFIED_INTERNAL: &str = "parentmodifiedinternal";

/// Per-channel differences against the previous frame.
///
/// `None` means "unchanged", which listeners can tell apart from a change
/// that happens to be zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TransformDelta {
    pub position: Option<Vector2>,
    pub rotation: Option<Angle>,
    pub scale: Option<Vector2>,
}

impl TransformDelta {
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.scale.is_none()
    }
}

/// The three views of one frame's transform change.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameDelta {
    pub all: TransformDelta,
    /// Channels last written by user code.
    pub user: TransformDelta,
    /// Channels last written by the physics engine.
    pub engine: TransformDelta,
}

/// Event names for the same change seen from the object itself and from
/// its descendants.
pub(crate) const CHANNELS: [(&str, &str); 3] = [
    (CHANGE, PARENT_CHANGE),
    (MODIFIED, PARENT_MODIFIED),
    (MODIFIED_INTERNAL, PARENT_MODIFIED_INTERNAL),
];

pub fn is_transform_event(name: &str) -> bool {
    CHANNELS
        .iter()
        .any(|(own, parent)| *own == name || *parent == name)
}
