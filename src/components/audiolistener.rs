use log::debug;

use crate::components::component::{Component, Lifecycle};
use crate::components::kind::ComponentKind;
use crate::error::EngineResult;
use crate::world::context::Context;

/// Point in the world audio is heard from. At most one per game object.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioListener {
    /// Master volume in `[0, 1]`.
    pub volume: f32,
    pub muted: bool,
}

impl Default for AudioListener {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
        }
    }
}

impl AudioListener {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
            muted: false,
        }
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }
}

fn enabled(listener: &mut AudioListener, ctx: &mut Context<'_>) -> EngineResult<()> {
    debug!("audio listener on '{}' at volume {}", ctx.name(), listener.effective_volume());
    Ok(())
}

fn disabled(_: &mut AudioListener, ctx: &mut Context<'_>) -> EngineResult<()> {
    debug!("audio listener on '{}' silenced", ctx.name());
    Ok(())
}

impl Component for AudioListener {
    const KIND: ComponentKind = ComponentKind::AudioListener;

    fn lifecycle() -> Lifecycle<Self> {
        Lifecycle::new().on_enable(enabled).on_disable(disabled)
    }
}
