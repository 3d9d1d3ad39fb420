//! Component registry: registration, lookup, activation and dispatch.
//!
//! Component instances live in slots keyed by [`ComponentId`]. While one of
//! its hooks runs, a component's instance is taken out of its slot and lent
//! to the hook, so the hook can receive `&mut Self` next to a [`Context`]
//! holding `&mut World`. Events sent to a component whose instance is out
//! (raised by its own hook) wait in the slot and are delivered, in order,
//! as soon as the hook returns.

use log::{debug, error, warn};
use std::any::TypeId;

use crate::components::component::{
    erase_event_hook, Component, ComponentObject, ErasedHook, EventHook, Initializer,
};
use crate::components::kind::{Category, ComponentKind, ComponentQuery};
use crate::components::transform::Transform;
use crate::error::{EngineError, EngineResult};
use crate::events::eventtarget::{dispatch_all, EventTarget, ListenerId};
use crate::events::{self, EventPayload};
use crate::world::context::Context;
use crate::world::ids::{ComponentId, GameObjectId};
use crate::world::World;

pub(crate) struct ComponentSlot {
    pub(crate) owner: GameObjectId,
    pub(crate) kind: ComponentKind,
    type_id: TypeId,
    type_name: &'static str,
    pub(crate) active: bool,
    pub(crate) pending_destroy: bool,
    pub(crate) started: bool,
    /// `None` for transforms, whose data lives in the game object, and
    /// while a hook of this component runs.
    pub(crate) instance: Option<Box<dyn ComponentObject>>,
    listeners: EventTarget<ErasedHook>,
    /// Events raised on this component by its own running hook.
    deferred: Vec<(String, EventPayload)>,
}

impl ComponentSlot {
    pub(crate) fn transform(owner: GameObjectId) -> Self {
        Self {
            owner,
            kind: ComponentKind::Transform,
            type_id: TypeId::of::<Transform>(),
            type_name: std::any::type_name::<Transform>(),
            active: true,
            pending_destroy: false,
            started: true,
            instance: None,
            listeners: EventTarget::new(),
            deferred: Vec::new(),
        }
    }
}

/// Read-only summary of a registered component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    pub id: ComponentId,
    pub owner: GameObjectId,
    pub kind: ComponentKind,
    pub type_name: &'static str,
    pub active: bool,
    pub pending_destroy: bool,
}

/// The hook's own result wins over failures of the events it deferred.
fn first_failure<T>(result: EngineResult<T>, delivered: EngineResult<()>) -> EngineResult<T> {
    match (result, delivered) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(e), Err(later)) => {
            error!("additional failure in deferred event: {}", later);
            Err(e)
        }
        (Err(e), Ok(())) | (Ok(_), Err(e)) => Err(e),
    }
}

impl World {
    // ==================== REGISTRATION ====================

    pub fn add_component<C: Component>(&mut self, go: GameObjectId, component: C) -> EngineResult<ComponentId> {
        self.add_component_with(go, component, Vec::new())
    }

    /// Register `component` on `go`.
    ///
    /// Single-instance kinds and Rigidbody placement are validated before
    /// anything is registered. Then the initializers run in order, followed
    /// by `awake`, `enable` (if effectively active), `start` (if the object
    /// is already initialized) and a `componentadd` notification to `go`
    /// and its descendants. A failing initializer unregisters the
    /// component again and its error is returned.
    pub fn add_component_with<C: Component>(
        &mut self,
        go: GameObjectId,
        component: C,
        initializers: Vec<Initializer<C>>,
    ) -> EngineResult<ComponentId> {
        let object = self.object(go)?;
        if C::KIND.is_singleton() && object.has_kind(C::KIND) {
            return Err(EngineError::SingletonViolation {
                kind: C::KIND,
                object: object.name().to_string(),
            });
        }
        if C::KIND == ComponentKind::Rigidbody {
            self.validate_rigidbody(go)?;
        }

        let id = ComponentId::next();
        let mut listeners = EventTarget::new();
        for (name, hook) in C::lifecycle().into_listeners() {
            listeners.add_listener(name, hook);
        }
        self.slots.insert(
            id,
            ComponentSlot {
                owner: go,
                kind: C::KIND,
                type_id: TypeId::of::<C>(),
                type_name: std::any::type_name::<C>(),
                active: true,
                pending_destroy: false,
                started: false,
                instance: Some(Box::new(component)),
                listeners,
                deferred: Vec::new(),
            },
        );
        self.registry.push(id);
        self.object_mut(go)?.attach_component(C::KIND, id);
        debug!("registered {} {} on {}", C::KIND, id, go);

        if let Err(e) = self.run_initializers(id, go, initializers) {
            warn!("initializer of {} {} failed, unregistering: {}", C::KIND, id, e);
            self.unregister(id);
            return Err(e);
        }

        self.dispatch(id, events::AWAKE, &EventPayload::None)?;
        if self.is_component_active(id) {
            self.dispatch(id, events::ENABLE, &EventPayload::None)?;
        }
        if self.object(go)?.initialized {
            self.start_component(id)?;
        }
        let payload = EventPayload::Component { id, kind: C::KIND };
        self.emit_subtree(go, events::COMPONENT_ADD, &payload)?;
        Ok(id)
    }

    fn run_initializers<C: Component>(
        &mut self,
        id: ComponentId,
        owner: GameObjectId,
        initializers: Vec<Initializer<C>>,
    ) -> EngineResult<()> {
        if initializers.is_empty() {
            return Ok(());
        }
        let Some(mut instance) = self.take_instance(id) else {
            return Err(EngineError::MissingComponent(id));
        };
        let mut result = Ok(());
        match instance.as_any_mut().downcast_mut::<C>() {
            Some(component) => {
                let mut ctx = Context::new(self, owner, id);
                for initializer in initializers {
                    if let Err(e) = initializer(component, &mut ctx) {
                        result = Err(e);
                        break;
                    }
                }
            }
            None => {
                result = Err(EngineError::ComponentTypeMismatch {
                    id,
                    expected: std::any::type_name::<C>(),
                })
            }
        }
        let delivered = self.restore_instance(id, instance);
        first_failure(result, delivered)
    }

    /// A Rigidbody may not share a subtree with another Rigidbody, and may
    /// not sit below a Collider it would have to carry.
    fn validate_rigidbody(&self, go: GameObjectId) -> EngineResult<()> {
        let object = self.object(go)?;
        let invalid = |reason| EngineError::InvalidRigidbody {
            object: object.name().to_string(),
            reason,
        };
        if object.has_kind(ComponentKind::Rigidbody) {
            return Err(invalid("it already has a Rigidbody"));
        }
        for ancestor in self.ancestors(go)? {
            let Some(a) = self.objects.get(&ancestor) else { continue };
            if a.has_kind(ComponentKind::Rigidbody) {
                return Err(invalid("an ancestor already has a Rigidbody"));
            }
            if !a.matching(Category::Collider.into()).is_empty() {
                return Err(invalid("an ancestor has a Collider"));
            }
        }
        for descendant in self.descendants(go)? {
            if self.objects.get(&descendant).is_some_and(|d| d.has_kind(ComponentKind::Rigidbody)) {
                return Err(invalid("a descendant already has a Rigidbody"));
            }
        }
        Ok(())
    }

    pub(crate) fn start_component(&mut self, id: ComponentId) -> EngineResult<()> {
        match self.slots.get_mut(&id) {
            Some(slot) if !slot.started && !slot.pending_destroy => slot.started = true,
            _ => return Ok(()),
        }
        self.dispatch(id, events::START, &EventPayload::None).map(|_| ())
    }

    /// Mark every game object initialized and dispatch `start` to every
    /// component that has not started yet, in registration order.
    ///
    /// Calling it again only starts components that missed it.
    pub fn start(&mut self) -> EngineResult<()> {
        if self.mark_started() {
            debug!("world started with {} components", self.registry.len());
        }
        let snapshot = self.registry.clone();
        for id in snapshot {
            self.start_component(id)?;
        }
        Ok(())
    }

    /// Remove the slot and every reference to it. No hook runs.
    pub(crate) fn unregister(&mut self, id: ComponentId) -> Option<GameObjectId> {
        let slot = self.slots.remove(&id)?;
        if let Ok(index) = self.registry.binary_search(&id) {
            self.registry.remove(index);
        }
        if let Some(owner) = self.objects.get_mut(&slot.owner) {
            owner.detach_component(slot.kind, id);
        }
        Some(slot.owner)
    }

    /// Detach from the owner, notify, and queue for destruction.
    ///
    /// Warns and returns false when the component is not attached to any
    /// game object anymore.
    pub fn remove_component(&mut self, id: ComponentId) -> EngineResult<bool> {
        let Some(slot) = self.slots.get(&id) else {
            warn!("remove_component: {} is not registered", id);
            return Ok(false);
        };
        let (owner, kind) = (slot.owner, slot.kind);
        if kind == ComponentKind::Transform {
            let name = self.name(owner).unwrap_or_default().to_string();
            return Err(EngineError::TransformRemoval(name));
        }
        let detached = self
            .objects
            .get_mut(&owner)
            .is_some_and(|o| o.detach_component(kind, id));
        if !detached {
            warn!("remove_component: {} is not attached to {}", id, owner);
            return Ok(false);
        }
        let notified = self.emit_subtree(owner, events::COMPONENT_REMOVE, &EventPayload::Component { id, kind });
        let destroyed = self.destroy_component(id);
        notified?;
        destroyed.map(|_| true)
    }

    // ==================== LOOKUP ====================

    pub fn component_count(&self) -> usize {
        self.registry.len()
    }

    /// Every live component id in registration order.
    pub fn components(&self) -> &[ComponentId] {
        &self.registry
    }

    pub fn component_info(&self, id: ComponentId) -> Option<ComponentInfo> {
        self.slots.get(&id).map(|slot| ComponentInfo {
            id,
            owner: slot.owner,
            kind: slot.kind,
            type_name: slot.type_name,
            active: slot.active,
            pending_destroy: slot.pending_destroy,
        })
    }

    pub fn component_kind(&self, id: ComponentId) -> Option<ComponentKind> {
        self.slots.get(&id).map(|slot| slot.kind)
    }

    pub fn component_owner(&self, id: ComponentId) -> Option<GameObjectId> {
        self.slots.get(&id).map(|slot| slot.owner)
    }

    /// First component of concrete type `C` on `go`.
    pub fn get_component<C: Component>(&self, go: GameObjectId) -> Option<ComponentId> {
        self.get_components::<C>(go).into_iter().next()
    }

    pub fn get_components<C: Component>(&self, go: GameObjectId) -> Vec<ComponentId> {
        let Some(object) = self.objects.get(&go) else {
            return Vec::new();
        };
        object
            .components_of(C::KIND)
            .iter()
            .copied()
            .filter(|id| self.slots.get(id).is_some_and(|s| s.type_id == TypeId::of::<C>()))
            .collect()
    }

    /// First component on `go` matching a kind or category.
    pub fn query_component(&self, go: GameObjectId, query: impl Into<ComponentQuery>) -> Option<ComponentId> {
        self.query_components(go, query).into_iter().next()
    }

    pub fn query_components(&self, go: GameObjectId, query: impl Into<ComponentQuery>) -> Vec<ComponentId> {
        self.objects
            .get(&go)
            .map(|o| o.matching(query.into()))
            .unwrap_or_default()
    }

    /// Live components of `kind` across the world, in registration order.
    pub fn components_of_kind(&self, kind: ComponentKind) -> Vec<ComponentId> {
        self.registry
            .iter()
            .copied()
            .filter(|id| self.slots.get(id).is_some_and(|s| s.kind == kind))
            .collect()
    }

    pub fn component<C: Component>(&self, id: ComponentId) -> EngineResult<&C> {
        let slot = self.slots.get(&id).ok_or(EngineError::MissingComponent(id))?;
        let Some(instance) = slot.instance.as_deref() else {
            debug!("{} {} is not accessible right now", slot.kind, id);
            return Err(EngineError::MissingComponent(id));
        };
        instance
            .as_any()
            .downcast_ref::<C>()
            .ok_or(EngineError::ComponentTypeMismatch {
                id,
                expected: std::any::type_name::<C>(),
            })
    }

    pub fn component_mut<C: Component>(&mut self, id: ComponentId) -> EngineResult<&mut C> {
        let slot = self.slots.get_mut(&id).ok_or(EngineError::MissingComponent(id))?;
        let Some(instance) = slot.instance.as_deref_mut() else {
            debug!("{} {} is not accessible right now", slot.kind, id);
            return Err(EngineError::MissingComponent(id));
        };
        instance
            .as_any_mut()
            .downcast_mut::<C>()
            .ok_or(EngineError::ComponentTypeMismatch {
                id,
                expected: std::any::type_name::<C>(),
            })
    }

    /// Run `f` with the component and a context, like a hook would.
    pub fn with_component<C, R, F>(&mut self, id: ComponentId, f: F) -> EngineResult<R>
    where
        C: Component,
        F: FnOnce(&mut C, &mut Context<'_>) -> EngineResult<R>,
    {
        let owner = self.component_owner(id).ok_or(EngineError::MissingComponent(id))?;
        let Some(mut instance) = self.take_instance(id) else {
            return Err(EngineError::MissingComponent(id));
        };
        let result = match instance.as_any_mut().downcast_mut::<C>() {
            Some(component) => f(component, &mut Context::new(self, owner, id)),
            None => Err(EngineError::ComponentTypeMismatch {
                id,
                expected: std::any::type_name::<C>(),
            }),
        };
        let delivered = self.restore_instance(id, instance);
        first_failure(result, delivered)
    }

    fn take_instance(&mut self, id: ComponentId) -> Option<Box<dyn ComponentObject>> {
        self.slots.get_mut(&id).and_then(|slot| slot.instance.take())
    }

    /// Put the instance back and deliver the events its hook raised on it.
    fn restore_instance(&mut self, id: ComponentId, instance: Box<dyn ComponentObject>) -> EngineResult<()> {
        let Some(slot) = self.slots.get_mut(&id) else {
            return Ok(());
        };
        slot.instance = Some(instance);
        let deferred = std::mem::take(&mut slot.deferred);
        dispatch_all("deferred", deferred, |(event, payload): (String, EventPayload)| {
            self.dispatch(id, &event, &payload).map(|_| ())
        })
        .map(|_| ())
    }

    /// Read access to a stored component through its object-safe view.
    pub(crate) fn instance(&self, id: ComponentId) -> Option<&dyn ComponentObject> {
        self.slots.get(&id).and_then(|slot| slot.instance.as_deref())
    }

    pub fn is_pending_destroy(&self, id: ComponentId) -> bool {
        self.slots.get(&id).is_some_and(|slot| slot.pending_destroy)
    }

    // ==================== ACTIVATION ====================

    /// Own flag AND the owner's effective state.
    pub fn is_component_active(&self, id: ComponentId) -> bool {
        self.slots
            .get(&id)
            .is_some_and(|slot| slot.active && self.is_active(slot.owner))
    }

    pub fn set_component_active(&mut self, id: ComponentId, active: bool) -> EngineResult<()> {
        let slot = self.slots.get(&id).ok_or(EngineError::MissingComponent(id))?;
        if slot.active == active {
            return Ok(());
        }
        let before = vec![(id, self.is_component_active(id))];
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.active = active;
        }
        self.notify_activation_changes(before)
    }

    /// Effective state of every component in `root`'s subtree.
    pub(crate) fn activation_states(&self, root: GameObjectId) -> EngineResult<Vec<(ComponentId, bool)>> {
        let mut states = Vec::new();
        for go in self.subtree(root)? {
            if let Some(object) = self.objects.get(&go) {
                for id in object.component_ids() {
                    states.push((id, self.is_component_active(id)));
                }
            }
        }
        states.sort();
        Ok(states)
    }

    /// Dispatch `enable`/`disable` to components whose state changed.
    pub(crate) fn notify_activation_changes(&mut self, before: Vec<(ComponentId, bool)>) -> EngineResult<()> {
        let changed: Vec<(ComponentId, bool)> = before
            .into_iter()
            .filter_map(|(id, was)| {
                let now = self.is_component_active(id);
                (now != was).then_some((id, now))
            })
            .collect();
        dispatch_all(events::ENABLE, changed, |(id, now): (ComponentId, bool)| {
            let name = if now { events::ENABLE } else { events::DISABLE };
            self.dispatch(id, name, &EventPayload::None).map(|_| ())
        })
        .map(|_| ())
    }

    // ==================== LISTENERS & DISPATCH ====================

    /// Add a listener for `event` on component `id` of type `C`.
    pub fn add_listener<C: Component>(
        &mut self,
        id: ComponentId,
        event: impl Into<String>,
        hook: EventHook<C>,
    ) -> EngineResult<ListenerId> {
        let slot = self.slots.get_mut(&id).ok_or(EngineError::MissingComponent(id))?;
        if slot.type_id != TypeId::of::<C>() {
            return Err(EngineError::ComponentTypeMismatch {
                id,
                expected: std::any::type_name::<C>(),
            });
        }
        Ok(slot.listeners.add_listener(event, erase_event_hook(hook)))
    }

    pub fn remove_listener(&mut self, id: ComponentId, listener: ListenerId) -> bool {
        self.slots
            .get_mut(&id)
            .is_some_and(|slot| slot.listeners.remove_listener(listener))
    }

    pub fn listener_count(&self, id: ComponentId, event: &str) -> usize {
        self.slots
            .get(&id)
            .map_or(0, |slot| slot.listeners.listener_count(event))
    }

    /// Send a named event to one component. Returns the number of handlers
    /// invoked.
    pub fn dispatch_event(&mut self, id: ComponentId, event: &str, payload: &EventPayload) -> EngineResult<usize> {
        self.dispatch(id, event, payload)
    }

    pub(crate) fn dispatch(&mut self, id: ComponentId, event: &str, payload: &EventPayload) -> EngineResult<usize> {
        let Some(slot) = self.slots.get(&id) else {
            return Ok(0);
        };
        let handlers = slot.listeners.handlers(event);
        if handlers.is_empty() {
            return Ok(0);
        }
        let (owner, kind) = (slot.owner, slot.kind);
        let Some(mut instance) = self.take_instance(id) else {
            if kind == ComponentKind::Transform {
                return Ok(0);
            }
            debug!("deferring '{}' for {}: its hook is running", event, id);
            if let Some(slot) = self.slots.get_mut(&id) {
                slot.deferred.push((event.to_string(), payload.clone()));
            }
            return Ok(0);
        };
        let result = {
            let mut ctx = Context::new(self, owner, id);
            dispatch_all(event, handlers.iter(), |handler: &ErasedHook| {
                handler(instance.as_any_mut(), &mut ctx, payload)
            })
        };
        let delivered = self.restore_instance(id, instance);
        first_failure(result, delivered)
    }

    /// Send a named event to `go`: its transform observers (for transform
    /// payloads) and then each of its live components in registration
    /// order. Every receiver runs; the first error is returned.
    pub fn emit(&mut self, go: GameObjectId, event: &str, payload: &EventPayload) -> EngineResult<usize> {
        let Some(object) = self.objects.get_mut(&go) else {
            return Ok(0);
        };
        let mut invoked = 0;
        let mut first_error = None;
        if let EventPayload::Transform(delta) = payload {
            match object.transform.notify(event, delta) {
                Ok(n) => invoked += n,
                Err(e) => first_error = Some(e),
            }
        }
        let receivers: Vec<ComponentId> = object
            .component_ids()
            .into_iter()
            .filter(|id| self.slots.get(id).is_some_and(|s| !s.pending_destroy))
            .collect();
        match dispatch_all(event, receivers, |id: ComponentId| {
            invoked += self.dispatch(id, event, payload)?;
            Ok(())
        }) {
            Ok(_) => {}
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(invoked),
        }
    }

    /// [`emit`](World::emit) to `go` and then to each descendant.
    pub fn emit_subtree(&mut self, go: GameObjectId, event: &str, payload: &EventPayload) -> EngineResult<usize> {
        let targets = self.subtree(go)?;
        let mut invoked = 0;
        dispatch_all(event, targets, |target: GameObjectId| {
            invoked += self.emit(target, event, payload)?;
            Ok(())
        })?;
        Ok(invoked)
    }
}
