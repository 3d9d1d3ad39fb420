//! Rendering collaborator seam.
//!
//! Once per frame and per active camera the render pass calls
//! [`Renderer::begin`], then [`Renderer::draw`] for every active renderable
//! component in ascending `z_index` order, then [`Renderer::end`]. Items carry
//! world-space transforms, so a backend never walks the hierarchy itself.
//!
//! [`HeadlessRenderer`] records what it was asked to draw; the demo binary
//! and the tests use it in place of a real backend.

use log::trace;
use serde::Serialize;

use crate::components::kind::ComponentKind;
use crate::components::tilemap::TilePosition;
use crate::math::{Angle, Transformation, Vector2};
use crate::world::ids::{ComponentId, GameObjectId};

/// Camera parameters resolved to world space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraView {
    pub camera: ComponentId,
    /// World-space point shown at the centre of the viewport.
    pub target: Vector2,
    pub rotation: Angle,
    pub zoom: f64,
    pub viewport: Vector2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Sprite {
        tex_key: String,
        size: Vector2,
        /// Frame offset inside a spritesheet.
        offset: Vector2,
        /// Pivot relative to the texture's top-left corner.
        origin: Vector2,
        flip_h: bool,
        flip_v: bool,
    },
    TileMap {
        tile_size: f64,
        tiles: Vec<TilePosition>,
    },
    Parallax {
        tex_key: String,
        /// How much of the camera's movement the layer follows.
        factor: Vector2,
        repeat: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawItem {
    pub component: ComponentId,
    pub object: GameObjectId,
    pub kind: ComponentKind,
    pub z_index: i32,
    /// World-space transform of the owning game object.
    pub transform: Transformation,
    pub command: DrawCommand,
}

pub trait Renderer {
    fn begin(&mut self, view: &CameraView);
    fn draw(&mut self, item: &DrawItem);
    fn end(&mut self);
}

/// Renderer that keeps the last frame's draw list per camera.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    pub passes: u64,
    pub draws: u64,
    current: Option<CameraView>,
    pub last_frame: Vec<(CameraView, Vec<DrawItem>)>,
    pending: Vec<DrawItem>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw items submitted for `camera` during the last pass.
    pub fn items_for(&self, camera: ComponentId) -> Option<&[DrawItem]> {
        self.last_frame
            .iter()
            .find(|(view, _)| view.camera == camera)
            .map(|(_, items)| items.as_slice())
    }
}

impl Renderer for HeadlessRenderer {
    fn begin(&mut self, view: &CameraView) {
        if self.last_frame.first().is_some_and(|(first, _)| first.camera == view.camera) {
            self.last_frame.clear();
        }
        self.current = Some(view.clone());
        self.pending.clear();
    }

    fn draw(&mut self, item: &DrawItem) {
        trace!("draw {:?} {} z={}", item.kind, item.component, item.z_index);
        self.draws += 1;
        self.pending.push(item.clone());
    }

    fn end(&mut self) {
        if let Some(view) = self.current.take() {
            self.passes += 1;
            let items = std::mem::take(&mut self.pending);
            self.last_frame.push((view, items));
        }
    }
}
