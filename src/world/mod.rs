//! The world context.
//!
//! [`World`] owns everything a scene is made of: the game object tree, the
//! component registry, the end-of-frame destroy queue, the frame clock and
//! the physics backend. There is no global state; independent worlds can
//! coexist and [`World::reset`] rebuilds one from scratch.
//!
//! Submodules overview:
//! - [`ids`] – process-unique game object and component ids
//! - [`gameobject`] – tree node owning a transform and component ids
//! - [`context`] – what a lifecycle hook receives
//! - [`destroy`] – deferred destruction queue and the [`Destroyable`](destroy::Destroyable) trait
//! - [`snapshot`] – serializable dump of the tree for debugging
//!
//! Component registration, lookup and event dispatch live in `registry.rs`.

pub mod context;
pub mod destroy;
pub mod gameobject;
pub mod ids;
mod registry;
pub mod snapshot;

use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

use crate::components::transform::{Transform, TransformObserver};
use crate::error::{EngineError, EngineResult};
use crate::events::eventtarget::ListenerId;
use crate::math::transformable::{self, MAX_HIERARCHY_DEPTH};
use crate::math::Transformation;
use crate::resources::physics::{PhysicsEngine, SimplePhysics};
use crate::resources::worldtime::WorldTime;

use self::destroy::DestroyQueue;
use self::gameobject::GameObject;
use self::ids::{ComponentId, GameObjectId};
use self::registry::ComponentSlot;

pub use self::registry::ComponentInfo;

pub struct World {
    pub(crate) objects: FxHashMap<GameObjectId, GameObject>,
    pub(crate) roots: Vec<GameObjectId>,
    /// Live component ids in registration order.
    pub(crate) registry: Vec<ComponentId>,
    pub(crate) slots: FxHashMap<ComponentId, ComponentSlot>,
    pub(crate) destroy_queue: DestroyQueue,
    pub time: WorldTime,
    pub(crate) physics: Box<dyn PhysicsEngine>,
    started: bool,
    /// Bumped on every transform write or hierarchy change; cached globals
    /// from an older epoch are stale.
    pub(crate) transform_epoch: u64,
    unload_requested: bool,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("objects", &self.objects.len())
            .field("components", &self.registry.len())
            .field("pending_destroy", &self.destroy_queue.len())
            .field("time", &self.time)
            .field("started", &self.started)
            .finish()
    }
}

fn validate_name(name: &str) -> EngineResult<()> {
    if name.contains('/') {
        return Err(EngineError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl World {
    pub fn new() -> Self {
        Self::with_physics(Box::new(SimplePhysics::new()))
    }

    pub fn with_physics(physics: Box<dyn PhysicsEngine>) -> Self {
        Self {
            objects: FxHashMap::default(),
            roots: Vec::new(),
            registry: Vec::new(),
            slots: FxHashMap::default(),
            destroy_queue: DestroyQueue::default(),
            time: WorldTime::default(),
            physics,
            started: false,
            transform_epoch: 0,
            unload_requested: false,
        }
    }

    /// Drop every object and component and start over with an empty world.
    ///
    /// The physics backend is kept (cleared) along with the time scale. No
    /// hooks run; queued external disposables are dropped.
    pub fn reset(&mut self) {
        let mut physics = std::mem::replace(&mut self.physics, Box::new(SimplePhysics::new()));
        physics.clear();
        let time_scale = self.time.time_scale;
        let dropped = self.objects.len();
        *self = World::with_physics(physics);
        self.time.time_scale = time_scale;
        info!("world reset ({} game objects dropped)", dropped);
    }

    pub fn physics(&self) -> &dyn PhysicsEngine {
        self.physics.as_ref()
    }

    pub fn physics_mut(&mut self) -> &mut dyn PhysicsEngine {
        self.physics.as_mut()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Ask the scene to unload at the end of the current frame.
    pub fn request_unload(&mut self) {
        self.unload_requested = true;
    }

    pub fn unload_requested(&self) -> bool {
        self.unload_requested
    }

    pub(crate) fn clear_unload_request(&mut self) {
        self.unload_requested = false;
    }

    pub(crate) fn mark_started(&mut self) -> bool {
        let first = !self.started;
        self.started = true;
        for object in self.objects.values_mut() {
            object.initialized = true;
        }
        first
    }

    // ==================== GAME OBJECTS ====================

    /// Create a root game object with an identity transform.
    pub fn create_game_object(&mut self, name: impl Into<String>) -> EngineResult<GameObjectId> {
        let name = name.into();
        validate_name(&name)?;
        let id = GameObjectId::next();
        let transform_id = ComponentId::next();
        let mut object = GameObject::new(id, name, transform_id);
        object.initialized = self.started;
        debug!("created game object '{}' {}", object.name, id);
        self.objects.insert(id, object);
        self.slots.insert(transform_id, ComponentSlot::transform(id));
        self.registry.push(transform_id);
        self.roots.push(id);
        Ok(id)
    }

    pub fn create_child(
        &mut self,
        parent: GameObjectId,
        name: impl Into<String>,
    ) -> EngineResult<GameObjectId> {
        self.ensure_not_doomed(parent)?;
        let child = self.create_game_object(name)?;
        self.add_child(parent, child)?;
        Ok(child)
    }

    pub fn game_object(&self, id: GameObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: GameObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub(crate) fn object(&self, id: GameObjectId) -> EngineResult<&GameObject> {
        self.objects.get(&id).ok_or(EngineError::MissingGameObject(id))
    }

    pub(crate) fn object_mut(&mut self, id: GameObjectId) -> EngineResult<&mut GameObject> {
        self.objects
            .get_mut(&id)
            .ok_or(EngineError::MissingGameObject(id))
    }

    /// Live game object ids in creation order.
    pub fn game_objects(&self) -> Vec<GameObjectId> {
        let mut ids: Vec<GameObjectId> = self.objects.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn game_object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn roots(&self) -> &[GameObjectId] {
        &self.roots
    }

    pub fn name(&self, id: GameObjectId) -> Option<&str> {
        self.objects.get(&id).map(|o| o.name())
    }

    pub fn set_name(&mut self, id: GameObjectId, name: impl Into<String>) -> EngineResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.object_mut(id)?.name = name;
        Ok(())
    }

    // ==================== HIERARCHY ====================

    pub fn parent(&self, id: GameObjectId) -> Option<GameObjectId> {
        self.objects.get(&id).and_then(|o| o.parent)
    }

    pub fn children(&self, id: GameObjectId) -> &[GameObjectId] {
        self.objects.get(&id).map_or(&[], |o| o.children())
    }

    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self, id: GameObjectId) -> EngineResult<Vec<GameObjectId>> {
        let mut ancestors = Vec::new();
        let mut cursor = self.object(id)?.parent;
        while let Some(parent) = cursor {
            if ancestors.len() >= MAX_HIERARCHY_DEPTH {
                return Err(EngineError::HierarchyTooDeep(MAX_HIERARCHY_DEPTH));
            }
            ancestors.push(parent);
            cursor = self.objects.get(&parent).and_then(|o| o.parent);
        }
        Ok(ancestors)
    }

    /// Descendants in depth-first pre-order, excluding `id`.
    pub fn descendants(&self, id: GameObjectId) -> EngineResult<Vec<GameObjectId>> {
        let mut out = Vec::new();
        let mut stack: Vec<(GameObjectId, usize)> = self
            .object(id)?
            .children
            .iter()
            .rev()
            .map(|child| (*child, 1))
            .collect();
        while let Some((current, depth)) = stack.pop() {
            if depth > MAX_HIERARCHY_DEPTH {
                return Err(EngineError::HierarchyTooDeep(MAX_HIERARCHY_DEPTH));
            }
            out.push(current);
            if let Some(object) = self.objects.get(&current) {
                stack.extend(object.children.iter().rev().map(|child| (*child, depth + 1)));
            }
        }
        Ok(out)
    }

    /// `id` followed by its descendants in pre-order.
    pub(crate) fn subtree(&self, id: GameObjectId) -> EngineResult<Vec<GameObjectId>> {
        let mut ids = vec![id];
        ids.extend(self.descendants(id)?);
        Ok(ids)
    }

    fn subtree_height(&self, id: GameObjectId) -> EngineResult<usize> {
        let base = self.ancestors(id)?.len();
        let mut height = 0;
        for descendant in self.descendants(id)? {
            height = height.max(self.ancestors(descendant)?.len() - base);
        }
        Ok(height)
    }

    pub fn is_ancestor_of(&self, ancestor: GameObjectId, id: GameObjectId) -> EngineResult<bool> {
        Ok(self.ancestors(id)?.contains(&ancestor))
    }

    /// Move `child` under `parent`, detaching it from its previous parent.
    ///
    /// Fails if `child` is `parent` or one of its ancestors, if the move
    /// would make the tree deeper than [`MAX_HIERARCHY_DEPTH`], or if either
    /// object is queued for destruction.
    pub fn add_child(&mut self, parent: GameObjectId, child: GameObjectId) -> EngineResult<()> {
        self.ensure_not_doomed(child)?;
        self.ensure_not_doomed(parent)?;
        let parent_depth = self.ancestors(parent)?.len();
        if parent == child || self.is_ancestor_of(child, parent)? {
            return Err(EngineError::HierarchyCycle { parent, child });
        }
        if parent_depth + 1 + self.subtree_height(child)? > MAX_HIERARCHY_DEPTH {
            return Err(EngineError::HierarchyTooDeep(MAX_HIERARCHY_DEPTH));
        }
        self.reparent(child, Some(parent))
    }

    /// Detach `child` from `parent`, making it a root. Warns and returns
    /// false if it is not a child of `parent`.
    pub fn remove_child(&mut self, parent: GameObjectId, child: GameObjectId) -> EngineResult<bool> {
        if self.parent(child) != Some(parent) {
            warn!("remove_child: {} is not a child of {}", child, parent);
            return Ok(false);
        }
        self.ensure_not_doomed(child)?;
        self.reparent(child, None)?;
        Ok(true)
    }

    fn ensure_not_doomed(&self, id: GameObjectId) -> EngineResult<()> {
        if self.object(id)?.pending_destroy {
            return Err(EngineError::PendingDestroy(id));
        }
        Ok(())
    }

    pub fn set_parent(&mut self, child: GameObjectId, parent: Option<GameObjectId>) -> EngineResult<()> {
        match parent {
            Some(parent) => self.add_child(parent, child),
            None => {
                self.ensure_not_doomed(child)?;
                self.reparent(child, None)
            }
        }
    }

    /// Reparent `child` while keeping its world-space transform.
    ///
    /// The new local values are written as a user modification.
    pub fn set_parent_keep_world(
        &mut self,
        child: GameObjectId,
        parent: Option<GameObjectId>,
    ) -> EngineResult<()> {
        let global = self.to_global(child)?;
        self.set_parent(child, parent)?;
        let frame = parent.map(|p| self.transformation(p)).transpose()?;
        let local = transformable::to_local(&global, frame.as_ref())?;
        self.transform_mut(child)?
            .set_position(local.position)
            .set_rotation(local.rotation)
            .set_scale(local.scale);
        Ok(())
    }

    fn reparent(&mut self, child: GameObjectId, parent: Option<GameObjectId>) -> EngineResult<()> {
        let before = self.activation_states(child)?;
        let previous = self.object(child)?.parent;
        match previous {
            Some(old) => {
                if let Some(old_parent) = self.objects.get_mut(&old) {
                    old_parent.children.retain(|c| *c != child);
                }
            }
            None => self.roots.retain(|r| *r != child),
        }
        match parent {
            Some(new_parent) => self.object_mut(new_parent)?.children.push(child),
            None => self.roots.push(child),
        }
        self.object_mut(child)?.parent = parent;
        self.transform_epoch += 1;
        debug!("reparented {} from {:?} to {:?}", child, previous, parent);
        self.notify_activation_changes(before)
    }

    // ==================== ACTIVE STATE ====================

    /// Own flag AND every ancestor's own flag.
    pub fn is_active(&self, id: GameObjectId) -> bool {
        let mut cursor = Some(id);
        let mut steps = 0;
        while let Some(current) = cursor {
            let Some(object) = self.objects.get(&current) else {
                return false;
            };
            if !object.active || steps > MAX_HIERARCHY_DEPTH {
                return false;
            }
            steps += 1;
            cursor = object.parent;
        }
        true
    }

    /// Set the object's own flag. Components whose effective state changes
    /// receive `enable` or `disable`.
    pub fn set_active(&mut self, id: GameObjectId, active: bool) -> EngineResult<()> {
        if self.object(id)?.active == active {
            return Ok(());
        }
        let before = self.activation_states(id)?;
        self.object_mut(id)?.active = active;
        self.notify_activation_changes(before)
    }

    // ==================== FIND ====================

    /// Resolve a `/`-separated name path from the roots.
    ///
    /// Each segment is matched breadth-first against the children of every
    /// match of the previous segment; the first match wins. Walks the tree,
    /// so avoid calling it every frame.
    pub fn find(&self, query: &str) -> EngineResult<Option<GameObjectId>> {
        Ok(self.resolve_path(None, query)?.into_iter().next())
    }

    /// Resolve relative to `from`'s children; a leading `/` is absolute.
    pub fn find_from(&self, from: GameObjectId, query: &str) -> EngineResult<Option<GameObjectId>> {
        self.object(from)?;
        Ok(self.resolve_path(Some(from), query)?.into_iter().next())
    }

    /// Every object matching the path, in breadth-first order.
    pub fn find_all(&self, query: &str) -> EngineResult<Vec<GameObjectId>> {
        self.resolve_path(None, query)
    }

    fn resolve_path(&self, from: Option<GameObjectId>, query: &str) -> EngineResult<Vec<GameObjectId>> {
        let (absolute, path) = match query.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, query),
        };
        let segments: Vec<&str> = path.split('/').collect();
        if path.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(EngineError::MalformedQuery(query.to_string()));
        }

        let mut frontier: Vec<GameObjectId> = match (absolute, from) {
            (false, Some(from)) => self.children(from).to_vec(),
            _ => self.roots.clone(),
        };
        for (index, segment) in segments.iter().enumerate() {
            let matched: Vec<GameObjectId> = frontier
                .iter()
                .copied()
                .filter(|id| self.name(*id) == Some(*segment))
                .collect();
            if index + 1 == segments.len() {
                return Ok(matched);
            }
            frontier = matched
                .iter()
                .flat_map(|id| self.children(*id).iter().copied())
                .collect();
        }
        Ok(Vec::new())
    }

    // ==================== TRANSFORMS ====================

    pub fn transform(&self, id: GameObjectId) -> EngineResult<&Transform> {
        Ok(&self.object(id)?.transform)
    }

    /// Mutable access. Invalidates every cached global transform.
    pub fn transform_mut(&mut self, id: GameObjectId) -> EngineResult<&mut Transform> {
        self.transform_epoch += 1;
        Ok(&mut self.object_mut(id)?.transform)
    }

    /// The object's transform as a chain of local transformations.
    pub fn transformation(&self, id: GameObjectId) -> EngineResult<Rc<Transformation>> {
        let mut chain = self.ancestors(id)?;
        chain.reverse();
        chain.push(id);
        let mut parent: Option<Rc<Transformation>> = None;
        for node in chain {
            let local = self.object(node)?.transform.local(node.raw()).with_parent(parent);
            parent = Some(Rc::new(local));
        }
        parent.ok_or(EngineError::MissingGameObject(id))
    }

    /// World-space transform, cached until the next transform write or
    /// hierarchy change anywhere in the world.
    pub fn to_global(&self, id: GameObjectId) -> EngineResult<Transformation> {
        let object = self.object(id)?;
        if let Some(cached) = object.transform.cached_global(id.raw(), self.transform_epoch) {
            return Ok(cached);
        }
        let global = transformable::to_global(self.transformation(id)?.as_ref())?;
        object.transform.store_global(&global, self.transform_epoch);
        Ok(global)
    }

    /// `id`'s transform expressed relative to `target` (`None` is world
    /// space).
    pub fn to_local(&self, id: GameObjectId, target: Option<GameObjectId>) -> EngineResult<Transformation> {
        let t = self.transformation(id)?;
        let frame = target.map(|g| self.transformation(g)).transpose()?;
        transformable::to_local(&t, frame.as_ref())
    }

    /// Convert a world-space transformation into `id`'s parent frame.
    pub fn global_to_local(&self, id: GameObjectId, global: &Transformation) -> EngineResult<Transformation> {
        let frame = self
            .parent(id)
            .map(|p| self.transformation(p))
            .transpose()?;
        transformable::to_local(&global.detached(), frame.as_ref())
    }

    /// Register a closure for one of `id`'s own transform events.
    pub fn observe_transform(
        &mut self,
        id: GameObjectId,
        event: impl Into<String>,
        observer: TransformObserver,
    ) -> EngineResult<ListenerId> {
        Ok(self.object_mut(id)?.transform.observe(event, observer))
    }

    pub fn unobserve_transform(&mut self, id: GameObjectId, listener: ListenerId) -> bool {
        self.objects
            .get_mut(&id)
            .is_some_and(|o| o.transform.unobserve(listener))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Angle, Vector2};

    const EPSILON: f64 = 1e-9;

    #[test]
    fn names_may_not_contain_separator() {
        let mut world = World::new();
        assert_eq!(
            world.create_game_object("a/b"),
            Err(EngineError::InvalidName("a/b".into()))
        );
        let go = world.create_game_object("ok").unwrap();
        assert!(world.set_name(go, "no/pe").is_err());
        assert_eq!(world.name(go), Some("ok"));
    }

    #[test]
    fn reparenting_moves_between_child_lists() {
        let mut world = World::new();
        let a = world.create_game_object("a").unwrap();
        let b = world.create_game_object("b").unwrap();
        let c = world.create_child(a, "c").unwrap();
        world.add_child(b, c).unwrap();
        assert!(world.children(a).is_empty());
        assert_eq!(world.children(b), &[c]);
        assert_eq!(world.roots(), &[a, b]);
        assert!(world.remove_child(b, c).unwrap());
        assert!(!world.remove_child(b, c).unwrap());
        assert_eq!(world.roots(), &[a, b, c]);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut world = World::new();
        let a = world.create_game_object("a").unwrap();
        let b = world.create_child(a, "b").unwrap();
        assert_eq!(
            world.add_child(b, a),
            Err(EngineError::HierarchyCycle { parent: b, child: a })
        );
        assert!(matches!(world.add_child(a, a), Err(EngineError::HierarchyCycle { .. })));
    }

    #[test]
    fn depth_is_bounded() {
        let mut world = World::new();
        let mut tip = world.create_game_object("n").unwrap();
        for _ in 0..MAX_HIERARCHY_DEPTH {
            tip = world.create_child(tip, "n").unwrap();
        }
        assert_eq!(
            world.create_child(tip, "n").map(|_| ()),
            Err(EngineError::HierarchyTooDeep(MAX_HIERARCHY_DEPTH))
        );
    }

    #[test]
    fn find_paths() {
        let mut world = World::new();
        let ui = world.create_game_object("ui").unwrap();
        let panel = world.create_child(ui, "panel").unwrap();
        let first = world.create_child(panel, "button").unwrap();
        let second = world.create_child(panel, "button").unwrap();

        assert_eq!(world.find("ui/panel/button").unwrap(), Some(first));
        assert_eq!(world.find("/ui/panel").unwrap(), Some(panel));
        assert_eq!(world.find_all("ui/panel/button").unwrap(), vec![first, second]);
        assert_eq!(world.find_from(ui, "panel/button").unwrap(), Some(first));
        assert_eq!(world.find_from(panel, "/ui").unwrap(), Some(ui));
        assert_eq!(world.find("ui/missing").unwrap(), None);
        assert!(matches!(world.find("ui//panel"), Err(EngineError::MalformedQuery(_))));
        assert!(matches!(world.find(""), Err(EngineError::MalformedQuery(_))));
        assert!(matches!(world.find("/"), Err(EngineError::MalformedQuery(_))));
    }

    #[test]
    fn global_transform_is_cached_until_a_write() {
        let mut world = World::new();
        let a = world.create_game_object("a").unwrap();
        let b = world.create_child(a, "b").unwrap();
        world.transform_mut(a).unwrap().set_position(Vector2::new(10.0, 0.0));
        world.transform_mut(b).unwrap().set_position(Vector2::new(2.0, 0.0));

        let first = world.to_global(b).unwrap();
        let second = world.to_global(b).unwrap();
        assert_eq!(first.position, Vector2::new(12.0, 0.0));
        assert_eq!(first.position.x.to_bits(), second.position.x.to_bits());

        world.transform_mut(a).unwrap().rotate(Angle::from_degrees(90.0));
        let rotated = world.to_global(b).unwrap();
        assert!(rotated.position.approx_eq(Vector2::new(10.0, 2.0), EPSILON));
    }

    #[test]
    fn keep_world_reparent_preserves_global_pose() {
        let mut world = World::new();
        let c = world.create_game_object("c").unwrap();
        let b = world.create_game_object("b").unwrap();
        world.transform_mut(c).unwrap().set_position(Vector2::new(0.0, 5.0)).set_rotation(Angle::from_degrees(45.0));
        world.transform_mut(b).unwrap().set_position(Vector2::new(2.0, 0.0));
        world.set_parent_keep_world(b, Some(c)).unwrap();
        assert!(world.to_global(b).unwrap().position.approx_eq(Vector2::new(2.0, 0.0), EPSILON));
        world.set_parent_keep_world(b, None).unwrap();
        assert!(world.transform(b).unwrap().position().approx_eq(Vector2::new(2.0, 0.0), EPSILON));
    }

    #[test]
    fn reset_drops_everything() {
        let mut world = World::new();
        world.time.time_scale = 2.0;
        world.create_game_object("a").unwrap();
        world.reset();
        assert_eq!(world.game_object_count(), 0);
        assert_eq!(world.component_count(), 0);
        assert_eq!(world.time.time_scale, 2.0);
    }
}
