//! Game object node.
//!
//! A [`GameObject`] is a named node of the scene tree. It owns its
//! [`Transform`] and the ids of its components, grouped by kind in
//! registration order. The components themselves live in the world's
//! registry.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::components::kind::{ComponentKind, ComponentQuery};
use crate::components::transform::Transform;
use crate::world::ids::{ComponentId, GameObjectId};

pub(crate) type ComponentList = SmallVec<[ComponentId; 2]>;

#[derive(Debug)]
pub struct GameObject {
    id: GameObjectId,
    pub(crate) name: String,
    pub(crate) parent: Option<GameObjectId>,
    pub(crate) children: Vec<GameObjectId>,
    pub(crate) components: FxHashMap<ComponentKind, ComponentList>,
    pub(crate) transform: Transform,
    pub(crate) transform_id: ComponentId,
    /// Own flag; the effective state also depends on every ancestor.
    pub(crate) active: bool,
    /// Set once the scene started. Components added afterwards start
    /// immediately.
    pub(crate) initialized: bool,
    pub(crate) pending_destroy: bool,
}

impl GameObject {
    pub(crate) fn new(id: GameObjectId, name: String, transform_id: ComponentId) -> Self {
        let mut components = FxHashMap::default();
        components.insert(ComponentKind::Transform, ComponentList::from_slice(&[transform_id]));
        Self {
            id,
            name,
            parent: None,
            children: Vec::new(),
            components,
            transform: Transform::new(),
            transform_id,
            active: true,
            initialized: false,
            pending_destroy: false,
        }
    }

    pub fn id(&self) -> GameObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<GameObjectId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[GameObjectId] {
        &self.children
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_id(&self) -> ComponentId {
        self.transform_id
    }

    /// The object's own flag, ignoring ancestors.
    pub fn own_active(&self) -> bool {
        self.active
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_pending_destroy(&self) -> bool {
        self.pending_destroy
    }

    pub fn has_kind(&self, kind: ComponentKind) -> bool {
        self.components.get(&kind).is_some_and(|list| !list.is_empty())
    }

    pub fn components_of(&self, kind: ComponentKind) -> &[ComponentId] {
        self.components.get(&kind).map_or(&[], |list| list.as_slice())
    }

    /// Ids matching `query`, in registration order.
    pub fn matching(&self, query: ComponentQuery) -> Vec<ComponentId> {
        let mut ids: Vec<ComponentId> = self
            .components
            .iter()
            .filter(|(kind, _)| query.matches(**kind))
            .flat_map(|(_, list)| list.iter().copied())
            .collect();
        ids.sort();
        ids
    }

    /// Every attached component id, in registration order.
    pub fn component_ids(&self) -> Vec<ComponentId> {
        let mut ids: Vec<ComponentId> = self.components.values().flatten().copied().collect();
        ids.sort();
        ids
    }

    pub(crate) fn attach_component(&mut self, kind: ComponentKind, id: ComponentId) {
        self.components.entry(kind).or_default().push(id);
    }

    /// Returns false if `id` was not attached.
    pub(crate) fn detach_component(&mut self, kind: ComponentKind, id: ComponentId) -> bool {
        let Some(list) = self.components.get_mut(&kind) else {
            return false;
        };
        let Some(index) = list.iter().position(|c| *c == id) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.components.remove(&kind);
        }
        true
    }
}
