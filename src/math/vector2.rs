//! Mutable 2D vector.
//!
//! [`Vector2`] is used both for positions and for scales. The `*_mut`
//! methods modify the vector in place and return `&mut Self` so calls can be
//! chained; the operator impls and the non-`mut` methods are pure.
//!
//! Equality is exact floating-point comparison. Use [`Vector2::approx_eq`]
//! when a tolerance is wanted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use super::angle::Angle;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };
    pub const ONE: Vector2 = Vector2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle`, scaled by `length`.
    pub fn from_angle(angle: Angle, length: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos * length, sin * length)
    }

    pub fn set(&mut self, x: f64, y: f64) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn copy_from(&mut self, other: Vector2) -> &mut Self {
        self.x = other.x;
        self.y = other.y;
        self
    }

    pub fn add_mut(&mut self, other: Vector2) -> &mut Self {
        self.x += other.x;
        self.y += other.y;
        self
    }

    pub fn sub_mut(&mut self, other: Vector2) -> &mut Self {
        self.x -= other.x;
        self.y -= other.y;
        self
    }

    /// Component-wise multiplication in place.
    pub fn mul_mut(&mut self, other: Vector2) -> &mut Self {
        self.x *= other.x;
        self.y *= other.y;
        self
    }

    /// Component-wise division in place.
    pub fn div_mut(&mut self, other: Vector2) -> &mut Self {
        self.x /= other.x;
        self.y /= other.y;
        self
    }

    pub fn scale_mut(&mut self, factor: f64) -> &mut Self {
        self.x *= factor;
        self.y *= factor;
        self
    }

    pub fn negate_mut(&mut self) -> &mut Self {
        self.x = -self.x;
        self.y = -self.y;
        self
    }

    pub fn rotate_mut(&mut self, angle: Angle) -> &mut Self {
        let rotated = self.rotated(angle);
        self.copy_from(rotated)
    }

    /// Normalizes in place. A zero vector stays zero.
    pub fn normalize_mut(&mut self) -> &mut Self {
        let normalized = self.normalized();
        self.copy_from(normalized)
    }

    /// Rotate by `angle` around the origin.
    ///
    /// Screen convention (y down): a positive angle turns +x towards +y.
    pub fn rotated(self, angle: Angle) -> Vector2 {
        let (sin, cos) = angle.sin_cos();
        Vector2 {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Rotate by `angle` around `pivot`.
    pub fn rotated_around(self, pivot: Vector2, angle: Angle) -> Vector2 {
        pivot + (self - pivot).rotated(angle)
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn distance(self, other: Vector2) -> f64 {
        (other - self).length()
    }

    pub fn dot(self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(self, other: Vector2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn normalized(self) -> Vector2 {
        let len = self.length();
        if len > 0.0 { self / len } else { Vector2::ZERO }
    }

    pub fn lerp(self, other: Vector2, t: f64) -> Vector2 {
        self + (other - self) * t
    }

    /// Direction of the vector measured from +x.
    pub fn angle(self) -> Angle {
        Angle::from_radians(self.y.atan2(self.x))
    }

    pub fn approx_eq(self, other: Vector2, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Component-wise product.
impl Mul for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

/// Component-wise quotient.
impl Div for Vector2 {
    type Output = Vector2;
    fn div(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x / rhs.x, self.y / rhs.y)
    }
}

impl Div<f64> for Vector2 {
    type Output = Vector2;
    fn div(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl MulAssign<f64> for Vector2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn mutators_chain() {
        let mut v = Vector2::new(1.0, 2.0);
        v.add_mut(Vector2::new(1.0, 1.0))
            .scale_mut(2.0)
            .sub_mut(Vector2::ONE);
        assert_eq!(v, Vector2::new(3.0, 5.0));
    }

    #[test]
    fn equality_is_exact() {
        let a = Vector2::new(0.1 + 0.2, 0.0);
        let b = Vector2::new(0.3, 0.0);
        assert_ne!(a, b);
        assert!(a.approx_eq(b, EPSILON));
    }

    #[test]
    fn rotate_quarter_turn_is_screen_clockwise() {
        let v = Vector2::new(40.0, 0.0).rotated(Angle::from_degrees(90.0));
        assert!(v.approx_eq(Vector2::new(0.0, 40.0), EPSILON));
    }

    #[test]
    fn rotate_around_pivot() {
        let v = Vector2::new(2.0, 1.0).rotated_around(Vector2::new(1.0, 1.0), Angle::from_degrees(180.0));
        assert!(v.approx_eq(Vector2::new(0.0, 1.0), EPSILON));
    }

    #[test]
    fn normalize_zero_stays_zero() {
        let mut v = Vector2::ZERO;
        v.normalize_mut();
        assert_eq!(v, Vector2::ZERO);
        assert!((Vector2::new(3.0, 4.0).normalized().length() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn componentwise_ops() {
        let a = Vector2::new(2.0, 6.0);
        let b = Vector2::new(2.0, 3.0);
        assert_eq!(a * b, Vector2::new(4.0, 18.0));
        assert_eq!(a / b, Vector2::new(1.0, 2.0));
        assert_eq!(-a, Vector2::new(-2.0, -6.0));
        assert_eq!(a.cross(b), 2.0 * 3.0 - 6.0 * 2.0);
    }
}
