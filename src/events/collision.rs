//! Collision notification.
//!
//! After every physics step the scene delivers one [`COLLISION`] event per
//! overlapping collider pair to each participant's game object. Each side
//! receives a [`CollisionEvent`] where `collider` is its own collider.

use serde::Serialize;

use crate::world::ids::{ComponentId, GameObjectId};

pub const COLLISION: &str = "collision";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollisionEvent {
    /// The receiving side's collider.
    pub collider: ComponentId,
    pub other: ComponentId,
    pub other_object: GameObjectId,
}
