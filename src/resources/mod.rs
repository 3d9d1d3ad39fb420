//! Long-lived engine resources and collaborator seams.
//!
//! Overview
//! - `gameconfig` – INI-backed loop, physics and render settings
//! - `physics` – physics backend trait and the built-in simple backend
//! - `renderer` – renderer trait and a recording headless backend
//! - `worldtime` – simulation time and delta
pub mod gameconfig;
pub mod physics;
pub mod renderer;
pub mod worldtime;
