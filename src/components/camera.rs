use crate::components::component::Component;
use crate::components::kind::ComponentKind;
use crate::math::{Transformation, Vector2};
use crate::resources::renderer::CameraView;
use crate::world::ids::ComponentId;

/// Renders the scene once per frame, looking at its game object's world
/// position and rotation.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub zoom: f64,
    /// Size of the output in pixels.
    pub viewport: Vector2,
}

impl Camera {
    pub fn new(viewport: Vector2) -> Self {
        Self { zoom: 1.0, viewport }
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Resolve the camera against its game object's world transform.
    pub fn view(&self, id: ComponentId, global: &Transformation) -> CameraView {
        CameraView {
            camera: id,
            target: global.position,
            rotation: global.rotation,
            zoom: self.zoom,
            viewport: self.viewport,
        }
    }
}

impl Component for Camera {
    const KIND: ComponentKind = ComponentKind::Camera;
}
