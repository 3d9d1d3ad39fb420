//! Deferred destruction.
//!
//! Destroying anything is a two-step affair. The request runs the object's
//! `prepare_destroy` right away (to disconnect from collaborators such as
//! physics) and queues it; the actual removal happens in the end-of-frame
//! flush, after rendering. Until then the object stays in every registry,
//! so iteration and lookups earlier in the same frame still see it.
//!
//! The queue is keyed by what is being destroyed, so requesting the same
//! destruction twice in one frame is a no-op.

use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::components::kind::ComponentKind;
use crate::error::{EngineError, EngineResult};
use crate::events::eventtarget::dispatch_all;
use crate::events::{self, EventPayload};
use crate::world::World;
use crate::world::ids::{ComponentId, GameObjectId};

/// An object outside the world that wants the same deferred teardown.
pub trait Destroyable {
    /// Called when destruction is requested.
    fn prepare_destroy(&mut self) {}

    /// Called during the end-of-frame flush. The object is dropped afterwards.
    fn destroy(&mut self) -> EngineResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum DestroyKey {
    GameObject(GameObjectId),
    Component(ComponentId),
    External(u64),
}

#[derive(Default)]
pub(crate) struct DestroyQueue {
    order: Vec<DestroyKey>,
    queued: FxHashSet<DestroyKey>,
    externals: FxHashMap<u64, Box<dyn Destroyable>>,
    next_external: u64,
}

impl DestroyQueue {
    /// Returns false if `key` is already queued.
    fn push(&mut self, key: DestroyKey) -> bool {
        if !self.queued.insert(key) {
            return false;
        }
        self.order.push(key);
        true
    }

    fn drain(&mut self) -> Vec<DestroyKey> {
        self.queued.clear();
        std::mem::take(&mut self.order)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}

impl World {
    /// Queue a component for destruction at the end of the frame.
    ///
    /// Attached components are detached first and their game object is
    /// notified with `componentremove`, as with
    /// [`remove_component`](World::remove_component). Idempotent: returns
    /// false if the component is unknown or already queued.
    pub fn destroy_component(&mut self, id: ComponentId) -> EngineResult<bool> {
        let Some(slot) = self.slots.get(&id) else {
            warn!("destroy_component: {} is not registered", id);
            return Ok(false);
        };
        if slot.kind == ComponentKind::Transform {
            let name = self.name(slot.owner).unwrap_or_default().to_string();
            return Err(EngineError::TransformRemoval(name));
        }
        if slot.pending_destroy {
            return Ok(false);
        }
        let attached = self
            .objects
            .get(&slot.owner)
            .is_some_and(|o| o.components_of(slot.kind).contains(&id));
        if attached {
            return self.remove_component(id);
        }
        self.mark_component(id)
    }

    /// Flag, run `prepare_destroy`, queue.
    fn mark_component(&mut self, id: ComponentId) -> EngineResult<bool> {
        match self.slots.get_mut(&id) {
            Some(slot) if !slot.pending_destroy => slot.pending_destroy = true,
            _ => return Ok(false),
        }
        let prepared = self.dispatch(id, events::PREPARE_DESTROY, &EventPayload::None);
        self.destroy_queue.push(DestroyKey::Component(id));
        prepared.map(|_| true)
    }

    /// Queue a game object and its whole subtree for destruction at the end
    /// of the frame. Every component gets `prepare_destroy` now, children
    /// before their parents.
    pub fn destroy_game_object(&mut self, go: GameObjectId) -> EngineResult<bool> {
        let Some(object) = self.objects.get(&go) else {
            warn!("destroy_game_object: {} does not exist", go);
            return Ok(false);
        };
        if object.pending_destroy {
            return Ok(false);
        }
        let subtree = self.subtree(go)?;
        let mut components = Vec::new();
        for node in subtree.iter().rev() {
            if let Some(object) = self.objects.get_mut(node) {
                object.pending_destroy = true;
                components.extend(object.component_ids());
            }
        }
        let prepared = dispatch_all(events::PREPARE_DESTROY, components, |id: ComponentId| {
            match self.slots.get_mut(&id) {
                Some(slot) if !slot.pending_destroy => slot.pending_destroy = true,
                _ => return Ok(()),
            }
            self.dispatch(id, events::PREPARE_DESTROY, &EventPayload::None).map(|_| ())
        });
        self.destroy_queue.push(DestroyKey::GameObject(go));
        debug!("queued {} ({} objects) for destruction", go, subtree.len());
        prepared.map(|_| true)
    }

    /// Queue an external object for the end-of-frame flush.
    pub fn destroy_later(&mut self, mut object: Box<dyn Destroyable>) {
        object.prepare_destroy();
        let key = self.destroy_queue.next_external;
        self.destroy_queue.next_external += 1;
        self.destroy_queue.externals.insert(key, object);
        self.destroy_queue.push(DestroyKey::External(key));
    }

    pub fn pending_destroy_count(&self) -> usize {
        self.destroy_queue.len()
    }

    /// Finalize everything queued so far: `destroy` hooks run, then the
    /// objects leave every registry and are dropped.
    ///
    /// Destruction requested by those hooks waits for the next flush. Every
    /// queued item is processed even if some fail; the first error is
    /// returned. Returns how many queued items were finalized.
    pub fn flush_destroyed(&mut self) -> EngineResult<usize> {
        let keys = self.destroy_queue.drain();
        let mut finalized = 0;
        dispatch_all(events::DESTROY, keys, |key: DestroyKey| {
            let done = match key {
                DestroyKey::Component(id) => self.finalize_component(id)?,
                DestroyKey::GameObject(go) => self.finalize_game_object(go)?,
                DestroyKey::External(n) => match self.destroy_queue.externals.remove(&n) {
                    Some(mut external) => {
                        external.destroy()?;
                        true
                    }
                    None => false,
                },
            };
            if done {
                finalized += 1;
            }
            Ok(())
        })?;
        Ok(finalized)
    }

    fn finalize_component(&mut self, id: ComponentId) -> EngineResult<bool> {
        if !self.slots.contains_key(&id) {
            return Ok(false);
        }
        let result = self.dispatch(id, events::DESTROY, &EventPayload::None);
        self.unregister(id);
        result.map(|_| true)
    }

    fn finalize_game_object(&mut self, go: GameObjectId) -> EngineResult<bool> {
        if !self.objects.contains_key(&go) {
            return Ok(false);
        }
        let subtree = self.subtree(go)?;
        let mut components = Vec::new();
        for node in subtree.iter().rev() {
            if let Some(object) = self.objects.get(node) {
                components.extend(object.component_ids());
            }
        }
        let result = dispatch_all(events::DESTROY, components, |id: ComponentId| {
            self.finalize_component(id).map(|_| ())
        });

        match self.parent(go) {
            Some(parent) => {
                if let Some(parent) = self.objects.get_mut(&parent) {
                    parent.children.retain(|c| *c != go);
                }
            }
            None => self.roots.retain(|r| *r != go),
        }
        for node in &subtree {
            self.objects.remove(node);
        }
        self.transform_epoch += 1;
        debug!("destroyed {} ({} objects)", go, subtree.len());
        result.map(|_| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Handle {
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Destroyable for Handle {
        fn prepare_destroy(&mut self) {
            self.log.borrow_mut().push("prepare");
        }

        fn destroy(&mut self) -> EngineResult<()> {
            self.log.borrow_mut().push("destroy");
            Ok(())
        }
    }

    #[test]
    fn queue_deduplicates_keys() {
        let mut queue = DestroyQueue::default();
        let key = DestroyKey::External(1);
        assert!(queue.push(key));
        assert!(!queue.push(key));
        assert_eq!(queue.drain(), vec![key]);
        assert!(queue.push(key));
    }

    #[test]
    fn external_objects_are_prepared_now_and_destroyed_at_flush() {
        let mut world = World::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        world.destroy_later(Box::new(Handle { log: Rc::clone(&log) }));
        assert_eq!(*log.borrow(), vec!["prepare"]);
        assert_eq!(world.pending_destroy_count(), 1);
        assert_eq!(world.flush_destroyed().unwrap(), 1);
        assert_eq!(*log.borrow(), vec!["prepare", "destroy"]);
        assert_eq!(world.flush_destroyed().unwrap(), 0);
    }

    #[test]
    fn destroying_an_object_removes_its_subtree_at_flush() {
        let mut world = World::new();
        let root = world.create_game_object("root").unwrap();
        let child = world.create_child(root, "child").unwrap();
        let keep = world.create_game_object("keep").unwrap();
        let components_before = world.component_count();

        assert!(world.destroy_game_object(root).unwrap());
        assert!(!world.destroy_game_object(root).unwrap());
        assert_eq!(world.find("root/child").unwrap(), Some(child));

        world.flush_destroyed().unwrap();
        assert!(!world.contains(root));
        assert!(!world.contains(child));
        assert_eq!(world.roots(), &[keep]);
        assert_eq!(world.component_count(), components_before - 2);
    }

    #[test]
    fn transforms_cannot_be_destroyed_alone() {
        let mut world = World::new();
        let go = world.create_game_object("go").unwrap();
        let transform = world.game_object(go).unwrap().transform_id();
        assert!(matches!(world.destroy_component(transform), Err(EngineError::TransformRemoval(_))));
        assert!(matches!(world.remove_component(transform), Err(EngineError::TransformRemoval(_))));
    }
}
