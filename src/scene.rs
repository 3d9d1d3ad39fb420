//! Scene frame loop.
//!
//! A [`Scene`] owns a [`World`] and a renderer and drives one frame per
//! [`Scene::update`] call:
//!
//! 1. advance the world clock;
//! 2. `earlyupdate` (Behaviour pass, then component pass, where transforms
//!    emit their change events);
//! 3. physics step and pull-back;
//! 4. `update`, then `lateupdate` (Behaviour pass first each time);
//! 5. render every active camera;
//! 6. finalize everything destroyed during the frame;
//! 7. honour an unload requested by a hook.
//!
//! Steps 2 to 4 are skipped while paused; rendering and destruction always
//! run. A failing hook aborts the rest of the frame and its error is
//! returned.

use log::{info, warn};

use crate::error::EngineResult;
use crate::resources::gameconfig::GameConfig;
use crate::resources::physics::SimplePhysics;
use crate::resources::renderer::Renderer;
use crate::systems::destroy::flush;
use crate::systems::phases::{run_phase, Pass, Phase};
use crate::systems::physics;
use crate::systems::render::render;
use crate::systems::time::update_world_time;
use crate::world::ids::GameObjectId;
use crate::world::World;

/// Discrete states a scene can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SceneState {
    /// Built but not started; frames only render.
    #[default]
    Loaded,
    Running,
    Paused,
    /// Torn down. Further frames do nothing.
    Unloaded,
}

pub struct Scene<R: Renderer> {
    pub world: World,
    renderer: R,
    state: SceneState,
    name: String,
}

impl<R: Renderer> Scene<R> {
    pub fn new(name: impl Into<String>, renderer: R) -> Self {
        Self::with_world(name, World::new(), renderer)
    }

    pub fn with_world(name: impl Into<String>, world: World, renderer: R) -> Self {
        Self {
            world,
            renderer,
            state: SceneState::Loaded,
            name: name.into(),
        }
    }

    /// Scene whose physics and clock follow `config`.
    pub fn with_config(name: impl Into<String>, config: &GameConfig, renderer: R) -> Self {
        let mut world = World::with_physics(Box::new(SimplePhysics::with_gravity(config.gravity)));
        world.time.time_scale = config.time_scale;
        Self::with_world(name, world, renderer)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Start every component and begin running frames.
    pub fn start(&mut self) -> EngineResult<()> {
        if self.state != SceneState::Loaded {
            warn!("scene '{}' cannot start from {:?}", self.name, self.state);
            return Ok(());
        }
        self.world.start()?;
        self.set_state(SceneState::Running);
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state == SceneState::Running {
            self.set_state(SceneState::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.state == SceneState::Paused {
            self.set_state(SceneState::Running);
        }
    }

    fn set_state(&mut self, state: SceneState) {
        info!("scene '{}': {:?} -> {:?}", self.name, self.state, state);
        self.state = state;
    }

    /// Run one frame of `dt` unscaled seconds.
    pub fn update(&mut self, dt: f64) -> EngineResult<()> {
        if self.state == SceneState::Unloaded {
            return Ok(());
        }
        let running = self.state == SceneState::Running;
        update_world_time(&mut self.world, if running { dt } else { 0.0 });

        if running {
            self.gameplay_phase(Phase::EarlyUpdate)?;
            let delta = self.world.time.delta;
            physics::step(&mut self.world, delta)?;
            self.gameplay_phase(Phase::Update)?;
            self.gameplay_phase(Phase::LateUpdate)?;
        }

        render(&mut self.world, &mut self.renderer)?;
        flush(&mut self.world)?;

        if self.world.unload_requested() {
            self.world.clear_unload_request();
            self.unload()?;
        }
        Ok(())
    }

    fn gameplay_phase(&mut self, phase: Phase) -> EngineResult<()> {
        run_phase(&mut self.world, Pass::Behaviour, phase)?;
        run_phase(&mut self.world, Pass::Component, phase)?;
        Ok(())
    }

    /// Run up to `frames` frames of `dt` seconds, stopping early on unload.
    /// Returns the number of frames run.
    pub fn run(&mut self, frames: u64, dt: f64) -> EngineResult<u64> {
        let mut ran = 0;
        while ran < frames && self.state != SceneState::Unloaded {
            self.update(dt)?;
            ran += 1;
        }
        Ok(ran)
    }

    /// Destroy every game object through the regular destroy protocol, then
    /// reset the world.
    pub fn unload(&mut self) -> EngineResult<()> {
        if self.state == SceneState::Unloaded {
            return Ok(());
        }
        let roots: Vec<GameObjectId> = self.world.roots().to_vec();
        let mut result = Ok(());
        for root in roots {
            if let Err(e) = self.world.destroy_game_object(root) {
                result = result.and(Err(e));
            }
        }
        let flushed = flush(&mut self.world);
        self.world.reset();
        self.set_state(SceneState::Unloaded);
        result.and(flushed.map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::renderer::HeadlessRenderer;

    #[test]
    fn paused_scene_still_renders() {
        let mut scene = Scene::new("test", HeadlessRenderer::new());
        let cam = scene.world.create_game_object("camera").unwrap();
        scene
            .world
            .add_component(cam, crate::components::camera::Camera::new(crate::math::Vector2::new(10.0, 10.0)))
            .unwrap();
        scene.start().unwrap();
        scene.pause();
        scene.update(0.1).unwrap();
        assert_eq!(scene.renderer().passes, 1);
        assert_eq!(scene.world.time.elapsed, 0.0);
        scene.resume();
        scene.update(0.1).unwrap();
        assert_eq!(scene.state(), SceneState::Running);
        assert!(scene.world.time.elapsed > 0.0);
    }

    #[test]
    fn unload_request_is_honoured_at_end_of_frame() {
        let mut scene = Scene::new("test", HeadlessRenderer::new());
        scene.world.create_game_object("thing").unwrap();
        scene.start().unwrap();
        scene.world.request_unload();
        assert_eq!(scene.run(10, 0.1).unwrap(), 1);
        assert_eq!(scene.state(), SceneState::Unloaded);
        assert_eq!(scene.world.game_object_count(), 0);
    }
}
