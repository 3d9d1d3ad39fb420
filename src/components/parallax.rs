use crate::components::component::{Component, Renderable};
use crate::components::kind::ComponentKind;
use crate::math::Vector2;
use crate::resources::renderer::DrawCommand;

/// Background layer that scrolls slower than the camera.
///
/// A `factor` of (0, 0) pins the layer to the screen, (1, 1) moves it with
/// the world.
#[derive(Clone, Debug, PartialEq)]
pub struct ParallaxBackground {
    pub tex_key: String,
    pub factor: Vector2,
    /// Tile the texture to fill the viewport.
    pub repeat: bool,
    pub z_index: i32,
}

impl ParallaxBackground {
    pub fn new(tex_key: impl Into<String>, factor: Vector2) -> Self {
        Self {
            tex_key: tex_key.into(),
            factor,
            repeat: true,
            z_index: i32::MIN,
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

impl Component for ParallaxBackground {
    const KIND: ComponentKind = ComponentKind::ParallaxBackground;

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        Some(self)
    }
}

impl Renderable for ParallaxBackground {
    fn z_index(&self) -> i32 {
        self.z_index
    }

    fn draw_command(&self) -> DrawCommand {
        DrawCommand::Parallax {
            tex_key: self.tex_key.clone(),
            factor: self.factor,
            repeat: self.repeat,
        }
    }
}
