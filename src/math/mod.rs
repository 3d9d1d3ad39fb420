//! Value types for 2D space: vectors, angles and transformation chains.
//!
//! - [`vector2`] – mutable 2D vector with chaining mutators and pure operators
//! - [`angle`] – orientation with lazily derived radian/degree views
//! - [`transformable`] – parent-chained transformations and space conversions

pub mod angle;
pub mod transformable;
pub mod vector2;

pub use angle::Angle;
pub use transformable::{Relation, Transformation};
pub use vector2::Vector2;
