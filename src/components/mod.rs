//! Components attached to game objects.
//!
//! Every component type implements [`component::Component`] and declares
//! its [`kind::ComponentKind`]. The built-in kinds cover the transform,
//! physics, rendering and audio; game logic uses the `Behaviour` kind.
//!
//! Submodules overview:
//! - [`audiolistener`] – single point audio is heard from
//! - [`boxcollider`] – axis-aligned box collider
//! - [`camera`] – renders the scene from its game object's pose
//! - [`circlecollider`] – circle collider
//! - [`collider`] – attachment logic shared by the collider kinds
//! - [`component`] – component trait, lifecycle hooks and capabilities
//! - [`kind`] – kind tags, categories and queries
//! - [`parallax`] – slowly scrolling background layer
//! - [`rigidbody`] – dynamic body with named acceleration forces
//! - [`sprite`] – 2D sprite rendering component
//! - [`tilemap`] – grid of tiles drawn as one renderable
//! - [`transform`] – local position, rotation and scale with change tracking

pub mod audiolistener;
pub mod boxcollider;
pub mod camera;
pub mod circlecollider;
pub mod collider;
pub mod component;
pub mod kind;
pub mod parallax;
pub mod rigidbody;
pub mod sprite;
pub mod tilemap;
pub mod transform;
