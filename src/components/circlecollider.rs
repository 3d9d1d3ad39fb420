use crate::components::collider::{collider_lifecycle, Attachment};
use crate::components::component::{ColliderShape, Component, Lifecycle};
use crate::components::kind::ComponentKind;
use crate::math::Vector2;
use crate::resources::physics::Shape;

/// Circle centred on its game object's origin plus `offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleCollider {
    pub radius: f64,
    pub offset: Vector2,
    attachment: Attachment,
}

impl CircleCollider {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            offset: Vector2::ZERO,
            attachment: Attachment::default(),
        }
    }

    pub fn with_offset(mut self, offset: Vector2) -> Self {
        self.offset = offset;
        self
    }

    pub fn contains_point(&self, position: Vector2, point: Vector2) -> bool {
        (position + self.offset).distance(point) <= self.radius
    }
}

impl Component for CircleCollider {
    const KIND: ComponentKind = ComponentKind::CircleCollider;

    fn lifecycle() -> Lifecycle<Self> {
        collider_lifecycle()
    }
}

impl ColliderShape for CircleCollider {
    fn shape(&self) -> Shape {
        Shape::Circle {
            radius: self.radius,
        }
    }

    fn offset(&self) -> Vector2 {
        self.offset
    }

    fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    fn attachment_mut(&mut self) -> &mut Attachment {
        &mut self.attachment
    }
}
