//! Engine error type.
//!
//! Structural-contract violations (a second [`Transform`], a name with a path
//! separator, a malformed find query, an impossible hierarchy) are reported
//! as [`EngineError`] values and never recovered from inside the engine.
//! Missing-reference conditions that can come from idempotent retries are
//! logged as warnings instead and do not produce errors.
//!
//! [`Transform`]: crate::components::transform::Transform

use crate::components::kind::ComponentKind;
use crate::world::ids::{ComponentId, GameObjectId};

/// Errors produced by the engine core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A single-instance component kind was added twice to one game object.
    #[error("{kind} allows a single instance per game object and '{object}' already has one")]
    SingletonViolation { kind: ComponentKind, object: String },

    /// A Rigidbody would end up nested inside another body.
    #[error("cannot add Rigidbody to '{object}': {reason}")]
    InvalidRigidbody { object: String, reason: &'static str },

    /// Game object names are path segments and may not contain `/`.
    #[error("invalid game object name '{0}': names may not contain '/'")]
    InvalidName(String),

    /// A find query was empty or contained an empty segment.
    #[error("malformed find query '{0}'")]
    MalformedQuery(String),

    #[error("game object {0} does not exist")]
    MissingGameObject(GameObjectId),

    #[error("component {0} does not exist")]
    MissingComponent(ComponentId),

    /// A typed access named the wrong concrete type.
    #[error("component {id} is not a {expected}")]
    ComponentTypeMismatch {
        id: ComponentId,
        expected: &'static str,
    },

    #[error("cannot parent {child} under {parent}: {child} is an ancestor of {parent}")]
    HierarchyCycle {
        parent: GameObjectId,
        child: GameObjectId,
    },

    #[error("hierarchy is deeper than {0} levels")]
    HierarchyTooDeep(usize),

    /// The object was queued for destruction and its place in the tree is
    /// frozen until the flush removes it.
    #[error("game object {0} is being destroyed")]
    PendingDestroy(GameObjectId),

    /// The Transform is owned by its game object for its whole life.
    #[error("the Transform of '{0}' cannot be removed")]
    TransformRemoval(String),

    #[error("config error: {0}")]
    Config(String),

    /// Failure reported by a user lifecycle hook.
    #[error("{0}")]
    Hook(String),
}

impl EngineError {
    /// Convenience constructor for hook implementations.
    pub fn hook(message: impl Into<String>) -> Self {
        EngineError::Hook(message.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
