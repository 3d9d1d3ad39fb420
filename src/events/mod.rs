//! Event names, payloads and the [`EventTarget`](eventtarget::EventTarget)
//! registry.
//!
//! Lifecycle hooks are ordinary listeners registered under the names below;
//! a component only receives an event it registered a handler for.
//!
//! Submodules overview:
//! - [`eventtarget`] – named handler registry with id-based removal
//! - [`transform`] – per-frame transform change events and deltas
//! - [`collision`] – collider overlap events

pub mod collision;
pub mod eventtarget;
pub mod transform;

use crate::components::kind::ComponentKind;
use crate::world::ids::ComponentId;

use self::collision::CollisionEvent;
use self::transform::TransformDelta;

pub const AWAKE: &str = "awake";
pub const START: &str = "start";
pub const ENABLE: &str = "enable";
pub const DISABLE: &str = "disable";
pub const PRE_RENDER: &str = "prerender";
pub const POST_RENDER: &str = "postrender";
pub const EARLY_UPDATE: &str = "earlyupdate";
pub const UPDATE: &str = "update";
pub const LATE_UPDATE: &str = "lateupdate";
pub const DESTROY: &str = "destroy";
pub const PREPARE_DESTROY: &str = "preparedestroy";
pub const COMPONENT_ADD: &str = "componentadd";
pub const COMPONENT_REMOVE: &str = "componentremove";

/// Data carried by an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    None,
    Transform(TransformDelta),
    Component { id: ComponentId, kind: ComponentKind },
    Collision(CollisionEvent),
    /// The camera being rendered.
    Camera(ComponentId),
}
