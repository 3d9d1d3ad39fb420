//! Serializable dump of a world, for debugging and the `--snapshot` flag.

use serde::Serialize;

use crate::components::kind::ComponentKind;
use crate::error::EngineResult;
use crate::math::{Transformation, Vector2};
use crate::world::World;
use crate::world::ids::{ComponentId, GameObjectId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseSnapshot {
    pub position: Vector2,
    /// Degrees in `[0, 360)`.
    pub rotation: f64,
    pub scale: Vector2,
}

impl From<&Transformation> for PoseSnapshot {
    fn from(t: &Transformation) -> Self {
        Self {
            position: t.position,
            rotation: t.rotation.degree(),
            scale: t.scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSnapshot {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub type_name: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSnapshot {
    pub id: GameObjectId,
    pub name: String,
    pub parent: Option<GameObjectId>,
    pub children: Vec<GameObjectId>,
    pub active: bool,
    pub local: PoseSnapshot,
    pub global: PoseSnapshot,
    pub components: Vec<ComponentSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub frame: u64,
    pub elapsed: f64,
    pub objects: Vec<ObjectSnapshot>,
}

impl World {
    /// Objects in creation order with their local and world-space poses.
    pub fn snapshot(&self) -> EngineResult<WorldSnapshot> {
        let mut objects = Vec::with_capacity(self.game_object_count());
        for id in self.game_objects() {
            let object = self.object(id)?;
            let local = object.transform().local(id.raw());
            let global = self.to_global(id)?;
            let components = object
                .component_ids()
                .into_iter()
                .filter_map(|c| self.component_info(c))
                .map(|info| ComponentSnapshot {
                    id: info.id,
                    kind: info.kind,
                    type_name: info.type_name,
                    active: info.active,
                })
                .collect();
            objects.push(ObjectSnapshot {
                id,
                name: object.name().to_string(),
                parent: object.parent(),
                children: object.children().to_vec(),
                active: self.is_active(id),
                local: PoseSnapshot::from(&local),
                global: PoseSnapshot::from(&global),
                components,
            });
        }
        Ok(WorldSnapshot {
            frame: self.time.frame_count,
            elapsed: self.time.elapsed,
            objects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_tree_and_poses() {
        let mut world = World::new();
        let a = world.create_game_object("a").unwrap();
        let b = world.create_child(a, "b").unwrap();
        world.transform_mut(a).unwrap().set_position(Vector2::new(10.0, 0.0));
        world.transform_mut(b).unwrap().set_position(Vector2::new(2.0, 0.0));

        let snapshot = world.snapshot().unwrap();
        assert_eq!(snapshot.objects.len(), 2);
        let child = &snapshot.objects[1];
        assert_eq!(child.parent, Some(a));
        assert_eq!(child.global.position, Vector2::new(12.0, 0.0));
        assert_eq!(child.components[0].kind, ComponentKind::Transform);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["objects"][1]["name"], "b");
        assert_eq!(json["objects"][1]["components"][0]["kind"], "Transform");
    }
}
