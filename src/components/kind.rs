//! Component kind tags and coarse categories.

use serde::Serialize;
use std::fmt;

/// Concrete component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ComponentKind {
    Transform,
    /// User game logic. Driven by the Behaviour passes, never the generic ones.
    Behaviour,
    Rigidbody,
    BoxCollider,
    CircleCollider,
    Sprite,
    Camera,
    AudioListener,
    TileMap,
    ParallaxBackground,
}

/// Union of several concrete kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Renderable,
    Collider,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 10] = [
        ComponentKind::Transform,
        ComponentKind::Behaviour,
        ComponentKind::Rigidbody,
        ComponentKind::BoxCollider,
        ComponentKind::CircleCollider,
        ComponentKind::Sprite,
        ComponentKind::Camera,
        ComponentKind::AudioListener,
        ComponentKind::TileMap,
        ComponentKind::ParallaxBackground,
    ];

    /// At most one instance per game object.
    pub fn is_singleton(self) -> bool {
        matches!(
            self,
            ComponentKind::Transform
                | ComponentKind::AudioListener
                | ComponentKind::TileMap
                | ComponentKind::ParallaxBackground
        )
    }

    pub fn category(self) -> Option<Category> {
        match self {
            ComponentKind::BoxCollider | ComponentKind::CircleCollider => Some(Category::Collider),
            ComponentKind::Sprite | ComponentKind::TileMap | ComponentKind::ParallaxBackground => {
                Some(Category::Renderable)
            }
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Transform => "Transform",
            ComponentKind::Behaviour => "Behaviour",
            ComponentKind::Rigidbody => "Rigidbody",
            ComponentKind::BoxCollider => "BoxCollider",
            ComponentKind::CircleCollider => "CircleCollider",
            ComponentKind::Sprite => "Sprite",
            ComponentKind::Camera => "Camera",
            ComponentKind::AudioListener => "AudioListener",
            ComponentKind::TileMap => "TileMap",
            ComponentKind::ParallaxBackground => "ParallaxBackground",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Category {
    pub fn kinds(self) -> impl Iterator<Item = ComponentKind> {
        ComponentKind::ALL
            .into_iter()
            .filter(move |kind| kind.category() == Some(self))
    }
}

/// Argument of the component lookups: a concrete kind or a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentQuery {
    Kind(ComponentKind),
    Category(Category),
}

impl ComponentQuery {
    pub fn matches(self, kind: ComponentKind) -> bool {
        match self {
            ComponentQuery::Kind(k) => k == kind,
            ComponentQuery::Category(c) => kind.category() == Some(c),
        }
    }
}

impl From<ComponentKind> for ComponentQuery {
    fn from(kind: ComponentKind) -> Self {
        ComponentQuery::Kind(kind)
    }
}

impl From<Category> for ComponentQuery {
    fn from(category: Category) -> Self {
        ComponentQuery::Category(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_unions_of_kinds() {
        let renderables: Vec<_> = Category::Renderable.kinds().collect();
        assert_eq!(
            renderables,
            vec![ComponentKind::Sprite, ComponentKind::TileMap, ComponentKind::ParallaxBackground]
        );
        assert!(ComponentQuery::from(Category::Collider).matches(ComponentKind::CircleCollider));
        assert!(!ComponentQuery::from(Category::Collider).matches(ComponentKind::Rigidbody));
    }

    #[test]
    fn singleton_kinds() {
        assert!(ComponentKind::Transform.is_singleton());
        assert!(ComponentKind::AudioListener.is_singleton());
        assert!(!ComponentKind::Sprite.is_singleton());
        assert_eq!(ComponentKind::TileMap.to_string(), "TileMap");
    }
}
