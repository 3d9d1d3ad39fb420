use crate::components::component::{Component, Renderable};
use crate::components::kind::ComponentKind;
use crate::math::Vector2;
use crate::resources::renderer::DrawCommand;

/// Sprite is identified by a texture key, its size in world units and a offset if the texture is a spritesheet.
/// The offset is used to select the correct frame from the spritesheet.
/// The origin selects the pivot point (in pixels) relative to the texture's top-left
/// used for placement/rotation/scaling when rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub tex_key: String,
    pub width: f64,
    pub height: f64,
    pub offset: Vector2,
    pub origin: Vector2,
    pub flip_h: bool,
    pub flip_v: bool,
    pub z_index: i32,
}

impl Sprite {
    /// Sprite centred on its game object.
    pub fn new(tex_key: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            tex_key: tex_key.into(),
            width,
            height,
            offset: Vector2::ZERO,
            origin: Vector2::new(width * 0.5, height * 0.5),
            flip_h: false,
            flip_v: false,
            z_index: 0,
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Select a spritesheet frame.
    pub fn with_frame_offset(mut self, offset: Vector2) -> Self {
        self.offset = offset;
        self
    }
}

impl Component for Sprite {
    const KIND: ComponentKind = ComponentKind::Sprite;

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        Some(self)
    }
}

impl Renderable for Sprite {
    fn z_index(&self) -> i32 {
        self.z_index
    }

    fn draw_command(&self) -> DrawCommand {
        DrawCommand::Sprite {
            tex_key: self.tex_key.clone(),
            size: Vector2::new(self.width, self.height),
            offset: self.offset,
            origin: self.origin,
            flip_h: self.flip_h,
            flip_v: self.flip_v,
        }
    }
}
