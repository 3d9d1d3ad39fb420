//! Process-unique identifiers.
//!
//! Every id type draws from its own monotonic counter, so ids are never
//! reused, even across [`World::reset`](super::World::reset). Comparing two
//! component ids therefore tells which one was registered first.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GAME_OBJECT_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a [`GameObject`](super::gameobject::GameObject).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GameObjectId(u64);

impl GameObjectId {
    pub(crate) fn next() -> Self {
        GameObjectId(NEXT_GAME_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, also used as the id of the object's transformation.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GameObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a registered component. Monotonic in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentId(u64);

impl ComponentId {
    pub(crate) fn next() -> Self {
        ComponentId(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let a = ComponentId::next();
        let b = ComponentId::next();
        assert!(b > a);
        let g1 = GameObjectId::next();
        let g2 = GameObjectId::next();
        assert!(g2.raw() > g1.raw());
    }
}
