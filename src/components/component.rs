//! Component model.
//!
//! A component is any `'static` type implementing [`Component`]. It opts into
//! lifecycle phases by returning a [`Lifecycle`] whose hook slots it filled
//! in: only present hooks are registered as listeners, so a component
//! without an `update` hook is never visited by the update pass.
//!
//! # Example
//!
//! ```ignore
//! struct Spinner { speed: f64 }
//!
//! fn spin(me: &mut Spinner, ctx: &mut Context<'_>) -> EngineResult<()> {
//!     let step = Angle::from_degrees(me.speed * ctx.delta());
//!     ctx.transform_mut()?.rotate(step);
//!     Ok(())
//! }
//!
//! impl Component for Spinner {
//!     fn lifecycle() -> Lifecycle<Self> {
//!         Lifecycle::new().update(spin)
//!     }
//! }
//! ```
//!
//! Hooks are plain function pointers. They receive the component itself and
//! a [`Context`] giving access to the rest of the world.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::components::kind::ComponentKind;
use crate::error::{EngineError, EngineResult};
use crate::events::{self, EventPayload};
use crate::resources::physics::Shape;
use crate::resources::renderer::DrawCommand;
use crate::math::Vector2;
use crate::world::context::Context;

/// Lifecycle hook.
pub type Hook<C> = fn(&mut C, &mut Context<'_>) -> EngineResult<()>;

/// Hook for a named event, receiving its payload.
pub type EventHook<C> = fn(&mut C, &mut Context<'_>, &EventPayload) -> EngineResult<()>;

/// Configuration callback run once by
/// [`World::add_component_with`](crate::world::World::add_component_with)
/// before `awake`.
pub type Initializer<C> = Box<dyn FnOnce(&mut C, &mut Context<'_>) -> EngineResult<()>>;

/// Box an initializer closure, fixing its argument types.
pub fn init<C, F>(f: F) -> Initializer<C>
where
    F: FnOnce(&mut C, &mut Context<'_>) -> EngineResult<()> + 'static,
{
    Box::new(f)
}

pub(crate) type ErasedHook =
    Rc<dyn Fn(&mut dyn Any, &mut Context<'_>, &EventPayload) -> EngineResult<()>>;

pub trait Component: Any + Sized {
    const KIND: ComponentKind = ComponentKind::Behaviour;

    fn lifecycle() -> Lifecycle<Self> {
        Lifecycle::new()
    }

    /// Drawing capability, for kinds in the renderable category.
    fn as_renderable(&self) -> Option<&dyn Renderable> {
        None
    }
}

/// Something the render pass can draw.
pub trait Renderable {
    fn z_index(&self) -> i32;
    fn draw_command(&self) -> DrawCommand;
}

/// Geometry of a collider component.
pub trait ColliderShape: Component {
    fn shape(&self) -> Shape;
    /// Offset from the owning game object's origin, in its local frame.
    fn offset(&self) -> Vector2;
    fn attachment(&self) -> &crate::components::collider::Attachment;
    fn attachment_mut(&mut self) -> &mut crate::components::collider::Attachment;
}

/// Object-safe view of a stored component.
pub(crate) trait ComponentObject: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn renderable(&self) -> Option<&dyn Renderable>;
}

impl<C: Component> ComponentObject for C {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn renderable(&self) -> Option<&dyn Renderable> {
        Component::as_renderable(self)
    }
}

/// Optional lifecycle hooks of a component type.
pub struct Lifecycle<C> {
    awake: Option<Hook<C>>,
    start: Option<Hook<C>>,
    on_enable: Option<Hook<C>>,
    on_disable: Option<Hook<C>>,
    on_pre_render: Option<EventHook<C>>,
    on_post_render: Option<EventHook<C>>,
    early_update: Option<Hook<C>>,
    update: Option<Hook<C>>,
    late_update: Option<Hook<C>>,
    on_destroy: Option<Hook<C>>,
    prepare_destroy: Option<Hook<C>>,
    events: Vec<(String, EventHook<C>)>,
}

impl<C> Default for Lifecycle<C> {
    fn default() -> Self {
        Self {
            awake: None,
            start: None,
            on_enable: None,
            on_disable: None,
            on_pre_render: None,
            on_post_render: None,
            early_update: None,
            update: None,
            late_update: None,
            on_destroy: None,
            prepare_destroy: None,
            events: Vec::new(),
        }
    }
}

impl<C> fmt::Debug for Lifecycle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.event_names()).finish()
    }
}

impl<C> Lifecycle<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn awake(mut self, hook: Hook<C>) -> Self {
        self.awake = Some(hook);
        self
    }

    pub fn start(mut self, hook: Hook<C>) -> Self {
        self.start = Some(hook);
        self
    }

    pub fn on_enable(mut self, hook: Hook<C>) -> Self {
        self.on_enable = Some(hook);
        self
    }

    pub fn on_disable(mut self, hook: Hook<C>) -> Self {
        self.on_disable = Some(hook);
        self
    }

    /// Runs before each camera renders; the payload names the camera.
    pub fn on_pre_render(mut self, hook: EventHook<C>) -> Self {
        self.on_pre_render = Some(hook);
        self
    }

    pub fn on_post_render(mut self, hook: EventHook<C>) -> Self {
        self.on_post_render = Some(hook);
        self
    }

    pub fn early_update(mut self, hook: Hook<C>) -> Self {
        self.early_update = Some(hook);
        self
    }

    pub fn update(mut self, hook: Hook<C>) -> Self {
        self.update = Some(hook);
        self
    }

    pub fn late_update(mut self, hook: Hook<C>) -> Self {
        self.late_update = Some(hook);
        self
    }

    /// Runs during the end-of-frame destroy pass.
    pub fn on_destroy(mut self, hook: Hook<C>) -> Self {
        self.on_destroy = Some(hook);
        self
    }

    /// Runs as soon as destruction is requested, before the object is queued.
    pub fn prepare_destroy(mut self, hook: Hook<C>) -> Self {
        self.prepare_destroy = Some(hook);
        self
    }

    /// Subscribe to an arbitrary named event.
    pub fn on(mut self, event: impl Into<String>, hook: EventHook<C>) -> Self {
        self.events.push((event.into(), hook));
        self
    }

    fn plain_hooks(&self) -> [(&'static str, Option<Hook<C>>); 9] {
        [
            (events::AWAKE, self.awake),
            (events::START, self.start),
            (events::ENABLE, self.on_enable),
            (events::DISABLE, self.on_disable),
            (events::EARLY_UPDATE, self.early_update),
            (events::UPDATE, self.update),
            (events::LATE_UPDATE, self.late_update),
            (events::DESTROY, self.on_destroy),
            (events::PREPARE_DESTROY, self.prepare_destroy),
        ]
    }

    /// Names of the events this lifecycle subscribes to.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .plain_hooks()
            .into_iter()
            .filter(|(_, hook)| hook.is_some())
            .map(|(name, _)| name.to_string())
            .collect();
        if self.on_pre_render.is_some() {
            names.push(events::PRE_RENDER.to_string());
        }
        if self.on_post_render.is_some() {
            names.push(events::POST_RENDER.to_string());
        }
        names.extend(self.events.iter().map(|(name, _)| name.clone()));
        names
    }
}

impl<C: 'static> Lifecycle<C> {
    /// Type-erased listeners for every present hook.
    pub(crate) fn into_listeners(self) -> Vec<(String, ErasedHook)> {
        let mut listeners = Vec::new();
        for (name, hook) in self.plain_hooks() {
            if let Some(hook) = hook {
                listeners.push((name.to_string(), erase_hook(hook)));
            }
        }
        let render_hooks = [
            (events::PRE_RENDER, self.on_pre_render),
            (events::POST_RENDER, self.on_post_render),
        ];
        for (name, hook) in render_hooks {
            if let Some(hook) = hook {
                listeners.push((name.to_string(), erase_event_hook(hook)));
            }
        }
        for (name, hook) in self.events {
            listeners.push((name, erase_event_hook(hook)));
        }
        listeners
    }
}

fn erased<F>(f: F) -> ErasedHook
where
    F: Fn(&mut dyn Any, &mut Context<'_>, &EventPayload) -> EngineResult<()> + 'static,
{
    Rc::new(f)
}

fn mismatch<C>(ctx: &Context<'_>) -> EngineError {
    EngineError::ComponentTypeMismatch {
        id: ctx.component,
        expected: std::any::type_name::<C>(),
    }
}

fn erase_hook<C: 'static>(hook: Hook<C>) -> ErasedHook {
    erased(move |instance, ctx, _payload| match instance.downcast_mut::<C>() {
        Some(component) => hook(component, ctx),
        None => Err(mismatch::<C>(ctx)),
    })
}

pub(crate) fn erase_event_hook<C: 'static>(hook: EventHook<C>) -> ErasedHook {
    erased(move |instance, ctx, payload| match instance.downcast_mut::<C>() {
        Some(component) => hook(component, ctx, payload),
        None => Err(mismatch::<C>(ctx)),
    })
}
