//! Per-frame engine passes.
//!
//! Submodules overview
//! - [`destroy`] – end-of-frame destruction
//! - [`phases`] – early/update/late passes over Behaviour and other components
//! - [`physics`] – physics step, pose pull-back and collision delivery
//! - [`render`] – per-camera render pass
//! - [`time`] – update simulation time and delta
//! - [`transform`] – transform change notification

pub mod destroy;
pub mod phases;
pub mod physics;
pub mod render;
pub mod time;
pub mod transform;
