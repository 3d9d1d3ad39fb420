//! Integration tests for the game object tree and coordinate conversions.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test hierarchy_integration
//! ```

use std::rc::Rc;

use rivet2d::error::EngineError;
use rivet2d::math::transformable::{to_global, to_local};
use rivet2d::math::{Angle, Transformation, Vector2};
use rivet2d::world::World;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn node(id: u64, position: Vector2, degrees: f64, scale: Vector2) -> Transformation {
    Transformation::identity(id)
        .with_position(position)
        .with_rotation(Angle::from_degrees(degrees))
        .with_scale(scale)
}

// =============================================================================
// Coordinate conversions
// =============================================================================

#[test]
fn global_then_local_round_trips_through_a_deep_chain() {
    let mut parent: Option<Rc<Transformation>> = None;
    for i in 0..8 {
        let t = node(
            i,
            Vector2::new(3.0 + i as f64, -2.0 * i as f64),
            15.0 * i as f64,
            Vector2::new(1.0 + 0.1 * i as f64, 0.5 + 0.2 * i as f64),
        )
        .with_parent(parent.clone());
        parent = Some(Rc::new(t));
    }
    let leaf = parent.unwrap();
    let global = to_global(&leaf).unwrap();
    let back = to_local(&global, leaf.parent.as_ref()).unwrap();

    assert!(back.position.approx_eq(leaf.position, 1e-7));
    assert!(back.rotation.equals(&leaf.rotation, 1e-7));
    assert!(back.scale.approx_eq(leaf.scale, 1e-7));
}

#[test]
fn world_round_trip_restores_local_values() {
    let mut world = World::new();
    let a = world.create_game_object("a").unwrap();
    world
        .transform_mut(a)
        .unwrap()
        .set_position(Vector2::new(4.0, 1.0))
        .set_rotation(Angle::from_degrees(30.0))
        .set_scale(Vector2::new(2.0, 3.0));
    let b = world.create_child(a, "b").unwrap();
    world
        .transform_mut(b)
        .unwrap()
        .set_position(Vector2::new(-1.0, 7.0))
        .set_rotation(Angle::from_degrees(-80.0));

    let global = world.to_global(b).unwrap();
    let local = world.global_to_local(b, &global).unwrap();
    assert!(local.position.approx_eq(Vector2::new(-1.0, 7.0), 1e-7));
    assert!(local.rotation.equals(&Angle::from_degrees(-80.0), 1e-7));
    assert!(local.scale.approx_eq(Vector2::ONE, 1e-7));
}

#[test]
fn to_global_is_bit_identical_when_unchanged() {
    let mut world = World::new();
    let a = world.create_game_object("a").unwrap();
    world
        .transform_mut(a)
        .unwrap()
        .set_position(Vector2::new(0.1, 0.2))
        .set_rotation(Angle::from_degrees(33.3));
    let b = world.create_child(a, "b").unwrap();
    world.transform_mut(b).unwrap().set_position(Vector2::new(0.7, 1.3));

    let first = world.to_global(b).unwrap();
    let second = world.to_global(b).unwrap();
    assert_eq!(first.position.x.to_bits(), second.position.x.to_bits());
    assert_eq!(first.position.y.to_bits(), second.position.y.to_bits());
    assert_eq!(
        first.rotation.raw_radian().to_bits(),
        second.rotation.raw_radian().to_bits()
    );
    assert_eq!(first.scale, second.scale);
}

#[test]
fn child_of_translated_parent_is_offset() {
    let mut world = World::new();
    let a = world.create_game_object("A").unwrap();
    world.transform_mut(a).unwrap().set_position(Vector2::new(10.0, 0.0));
    let b = world.create_child(a, "B").unwrap();
    world.transform_mut(b).unwrap().set_position(Vector2::new(2.0, 0.0));

    let global = world.to_global(b).unwrap();
    assert!(approx_eq(global.position.x, 12.0));
    assert!(approx_eq(global.position.y, 0.0));
}

#[test]
fn reparenting_keeps_world_position() {
    let mut world = World::new();
    let b = world.create_game_object("B").unwrap();
    world.transform_mut(b).unwrap().set_position(Vector2::new(2.0, 0.0));
    let c = world.create_game_object("C").unwrap();
    world.transform_mut(c).unwrap().set_position(Vector2::new(0.0, 5.0));

    world.set_parent_keep_world(b, Some(c)).unwrap();
    let local = world.transform(b).unwrap().position();
    assert!(approx_eq(local.x, 2.0));
    assert!(approx_eq(local.y, -5.0));
    assert!(world.to_global(b).unwrap().position.approx_eq(Vector2::new(2.0, 0.0), EPSILON));
    assert_eq!(world.parent(b), Some(c));
}

#[test]
fn to_local_between_cousins() {
    let mut world = World::new();
    let root = world.create_game_object("root").unwrap();
    let left = world.create_child(root, "left").unwrap();
    world.transform_mut(left).unwrap().set_position(Vector2::new(-5.0, 0.0));
    let right = world.create_child(root, "right").unwrap();
    world
        .transform_mut(right)
        .unwrap()
        .set_position(Vector2::new(5.0, 0.0))
        .set_rotation(Angle::from_degrees(90.0));
    let leaf = world.create_child(left, "leaf").unwrap();
    world.transform_mut(leaf).unwrap().set_position(Vector2::new(0.0, 1.0));

    let relative = world.to_local(leaf, Some(right)).unwrap();
    // leaf sits at (-5, 1) in root space, i.e. (-10, 1) from right,
    // which right's 90° turn maps to (1, 10)
    assert!(relative.position.approx_eq(Vector2::new(1.0, 10.0), 1e-7));
}

// =============================================================================
// Tree structure
// =============================================================================

#[test]
fn deactivating_a_parent_hides_descendants_without_touching_their_flags() {
    let mut world = World::new();
    let parent = world.create_game_object("parent").unwrap();
    let child = world.create_child(parent, "child").unwrap();
    let grandchild = world.create_child(child, "grandchild").unwrap();
    let sleeper = world.create_child(parent, "sleeper").unwrap();
    world.set_active(sleeper, false).unwrap();

    world.set_active(parent, false).unwrap();
    for id in [child, grandchild, sleeper] {
        assert!(!world.is_active(id));
    }
    assert!(world.game_object(child).unwrap().own_active());
    assert!(world.game_object(grandchild).unwrap().own_active());

    world.set_active(parent, true).unwrap();
    assert!(world.is_active(child));
    assert!(world.is_active(grandchild));
    assert!(!world.is_active(sleeper));
}

#[test]
fn single_parent_is_maintained() {
    let mut world = World::new();
    let a = world.create_game_object("a").unwrap();
    let b = world.create_game_object("b").unwrap();
    let c = world.create_child(a, "c").unwrap();

    world.add_child(b, c).unwrap();
    assert!(world.children(a).is_empty());
    assert_eq!(world.children(b), &[c]);
    assert!(!world.remove_child(a, c).unwrap());
    assert!(world.remove_child(b, c).unwrap());
    assert!(world.roots().contains(&c));
}

#[test]
fn invalid_structure_is_rejected() {
    let mut world = World::new();
    assert!(matches!(
        world.create_game_object("a/b"),
        Err(EngineError::InvalidName(_))
    ));
    let a = world.create_game_object("a").unwrap();
    let b = world.create_child(a, "b").unwrap();
    assert!(matches!(
        world.add_child(b, a),
        Err(EngineError::HierarchyCycle { .. })
    ));
    assert!(matches!(world.find("a//b"), Err(EngineError::MalformedQuery(_))));
}

#[test]
fn find_resolves_paths_breadth_first() {
    let mut world = World::new();
    let level = world.create_game_object("level").unwrap();
    let first = world.create_child(level, "enemy").unwrap();
    world.create_child(level, "enemy").unwrap();
    let gun = world.create_child(first, "gun").unwrap();

    assert_eq!(world.find("level/enemy").unwrap(), Some(first));
    assert_eq!(world.find_all("level/enemy").unwrap().len(), 2);
    assert_eq!(world.find("/level/enemy/gun").unwrap(), Some(gun));
    assert_eq!(world.find_from(level, "enemy/gun").unwrap(), Some(gun));
    assert_eq!(world.find("level/missing").unwrap(), None);
}
