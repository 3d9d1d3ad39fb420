//! Camera render pass.
//!
//! Runs once per frame after every gameplay phase, also while the scene is
//! paused. For each active camera, in registration order:
//!
//! 1. `prerender` is dispatched to every active component, with the camera
//!    as payload;
//! 2. active renderables are drawn in ascending `z_index` order (ties keep
//!    registration order), each with its world-space transform;
//! 3. `postrender` is dispatched like `prerender`.

use crate::components::camera::Camera;
use crate::components::kind::{Category, ComponentKind};
use crate::error::EngineResult;
use crate::events::eventtarget::dispatch_all;
use crate::events::{self, EventPayload};
use crate::resources::renderer::{DrawItem, Renderer};
use crate::world::ids::ComponentId;
use crate::world::World;

fn live(world: &World, id: ComponentId) -> bool {
    !world.is_pending_destroy(id) && world.is_component_active(id)
}

fn broadcast(world: &mut World, event: &str, camera: ComponentId) -> EngineResult<()> {
    let receivers: Vec<ComponentId> = world
        .components()
        .iter()
        .copied()
        .filter(|id| live(world, *id))
        .collect();
    let payload = EventPayload::Camera(camera);
    dispatch_all(event, receivers, |id: ComponentId| {
        world.dispatch(id, event, &payload).map(|_| ())
    })
    .map(|_| ())
}

fn draw_list(world: &World) -> EngineResult<Vec<DrawItem>> {
    let mut items = Vec::new();
    for &id in world.components() {
        let Some(info) = world.component_info(id) else { continue };
        if info.kind.category() != Some(Category::Renderable) || !live(world, id) {
            continue;
        }
        let Some(renderable) = world.instance(id).and_then(|i| i.renderable()) else {
            continue;
        };
        items.push(DrawItem {
            component: id,
            object: info.owner,
            kind: info.kind,
            z_index: renderable.z_index(),
            transform: world.to_global(info.owner)?,
            command: renderable.draw_command(),
        });
    }
    items.sort_by_key(|item| item.z_index);
    Ok(items)
}

/// Render every active camera. Returns the number of camera passes.
pub fn render(world: &mut World, renderer: &mut dyn Renderer) -> EngineResult<usize> {
    let cameras: Vec<ComponentId> = world
        .components_of_kind(ComponentKind::Camera)
        .into_iter()
        .filter(|id| live(world, *id))
        .collect();
    let mut passes = 0;
    for camera in cameras {
        let Some(owner) = world.component_owner(camera) else { continue };
        broadcast(world, events::PRE_RENDER, camera)?;
        let global = world.to_global(owner)?;
        let view = world.component::<Camera>(camera)?.view(camera, &global);
        renderer.begin(&view);
        for item in draw_list(world)? {
            renderer.draw(&item);
        }
        renderer.end();
        broadcast(world, events::POST_RENDER, camera)?;
        passes += 1;
    }
    Ok(passes)
}
