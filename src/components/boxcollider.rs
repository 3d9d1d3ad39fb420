use crate::components::collider::{collider_lifecycle, Attachment};
use crate::components::component::{ColliderShape, Component, Lifecycle};
use crate::components::kind::ComponentKind;
use crate::math::Vector2;
use crate::resources::physics::{aabb, Shape};

/// Axis-aligned box centred on its game object's origin plus `offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxCollider {
    pub size: Vector2,
    pub offset: Vector2,
    attachment: Attachment,
}

impl BoxCollider {
    /// Create a BoxCollider with given size
    pub fn new(size: Vector2) -> Self {
        Self {
            size,
            offset: Vector2::ZERO,
            attachment: Attachment::default(),
        }
    }

    /// Modify BoxCollider with given offset
    pub fn with_offset(mut self, offset: Vector2) -> Self {
        self.offset = offset;
        self
    }

    /// Returns (min, max) of the collider AABB for a given world position.
    /// Handles negative size by normalizing to proper min/max.
    pub fn aabb(&self, position: Vector2) -> (Vector2, Vector2) {
        aabb(position + self.offset, self.size)
    }

    /// Point containment in world space.
    pub fn contains_point(&self, position: Vector2, point: Vector2) -> bool {
        let (min, max) = self.aabb(position);
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

impl Component for BoxCollider {
    const KIND: ComponentKind = ComponentKind::BoxCollider;

    fn lifecycle() -> Lifecycle<Self> {
        collider_lifecycle()
    }
}

impl ColliderShape for BoxCollider {
    fn shape(&self) -> Shape {
        Shape::Box { size: self.size }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_is_centred_on_offset_position() {
        let collider = BoxCollider::new(Vector2::new(4.0, 2.0)).with_offset(Vector2::new(1.0, 0.0));
        let (min, max) = collider.aabb(Vector2::new(10.0, 10.0));
        assert_eq!(min, Vector2::new(9.0, 9.0));
        assert_eq!(max, Vector2::new(13.0, 11.0));
    }

    #[test]
    fn negative_size_is_normalized() {
        let collider = BoxCollider::new(Vector2::new(-2.0, -2.0));
        let (min, max) = collider.aabb(Vector2::ZERO);
        assert_eq!(min, Vector2::new(-1.0, -1.0));
        assert_eq!(max, Vector2::new(1.0, 1.0));
        assert!(collider.contains_point(Vector2::ZERO, Vector2::new(1.0, 0.5)));
        assert!(!collider.contains_point(Vector2::ZERO, Vector2::new(1.5, 0.0)));
    }
}
