//! rivet2d library.
//!
//! A component-based 2D engine core: game objects arranged in a tree, each
//! carrying a Transform and any number of components that opt into
//! lifecycle phases. A [`scene::Scene`] drives the frame loop over a
//! [`world::World`], talking to physics and rendering backends through the
//! traits in [`resources`].

pub mod components;
pub mod error;
pub mod events;
pub mod game;
pub mod math;
pub mod resources;
pub mod scene;
pub mod systems;
pub mod world;
