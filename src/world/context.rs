//! What a lifecycle hook gets besides its own component.

use crate::components::transform::Transform;
use crate::error::EngineResult;
use crate::events::EventPayload;
use crate::math::Transformation;
use crate::world::World;
use crate::world::ids::{ComponentId, GameObjectId};

/// Mutable world access for the component whose hook is running.
///
/// The running component itself is not reachable through `world` while the
/// hook runs; it is the hook's first argument instead.
pub struct Context<'w> {
    pub world: &'w mut World,
    pub game_object: GameObjectId,
    pub component: ComponentId,
}

impl<'w> Context<'w> {
    pub fn new(world: &'w mut World, game_object: GameObjectId, component: ComponentId) -> Self {
        Self {
            world,
            game_object,
            component,
        }
    }

    pub fn transform(&self) -> EngineResult<&Transform> {
        self.world.transform(self.game_object)
    }

    pub fn transform_mut(&mut self) -> EngineResult<&mut Transform> {
        self.world.transform_mut(self.game_object)
    }

    pub fn global(&self) -> EngineResult<Transformation> {
        self.world.to_global(self.game_object)
    }

    /// Scaled seconds of the current frame.
    pub fn delta(&self) -> f64 {
        self.world.time.delta
    }

    pub fn name(&self) -> &str {
        self.world.name(self.game_object).unwrap_or_default()
    }

    /// Send an event to the owning game object's components and transform
    /// observers. The running component gets it after its hook returns.
    pub fn emit(&mut self, event: &str, payload: &EventPayload) -> EngineResult<usize> {
        self.world.emit(self.game_object, event, payload)
    }

    /// Queue this component for end-of-frame destruction.
    pub fn destroy_self(&mut self) -> EngineResult<bool> {
        self.world.remove_component(self.component)
    }

    /// Queue the owning game object for end-of-frame destruction.
    pub fn destroy_game_object(&mut self) -> EngineResult<bool> {
        self.world.destroy_game_object(self.game_object)
    }
}
