//! Orientation value with a dual radian/degree representation.
//!
//! An [`Angle`] remembers whichever unit it was last set in. The other unit
//! is derived on demand, and [`Angle::cache`] stores both. Setting one unit
//! drops the other. Both getters normalize into `[0, 2π)` / `[0, 360)`,
//! while arithmetic works on the raw, unnormalized value so that composing
//! rotations never loses turns.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::f64::consts::TAU;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Tolerance used by `==` on angles.
pub const DEFAULT_ANGLE_EPSILON: f64 = 1e-7;

#[derive(Debug, Clone, Copy)]
pub struct Angle {
    radian: Option<f64>,
    degree: Option<f64>,
}

fn wrap(value: f64, full_turn: f64) -> f64 {
    let wrapped = value.rem_euclid(full_turn);
    // rem_euclid of a tiny negative value rounds up to a full turn
    if wrapped >= full_turn { 0.0 } else { wrapped }
}

impl Angle {
    pub const ZERO: Angle = Angle {
        radian: Some(0.0),
        degree: Some(0.0),
    };

    pub fn from_radians(radian: f64) -> Self {
        Self {
            radian: Some(radian),
            degree: None,
        }
    }

    pub fn from_degrees(degree: f64) -> Self {
        Self {
            radian: None,
            degree: Some(degree),
        }
    }

    /// Normalized radians in `[0, 2π)`.
    pub fn radian(&self) -> f64 {
        wrap(self.raw_radian(), TAU)
    }

    /// Normalized degrees in `[0, 360)`.
    pub fn degree(&self) -> f64 {
        wrap(self.raw_degree(), 360.0)
    }

    /// Unnormalized radians, as last set or derived.
    pub fn raw_radian(&self) -> f64 {
        match (self.radian, self.degree) {
            (Some(r), _) => r,
            (None, Some(d)) => d.to_radians(),
            (None, None) => 0.0,
        }
    }

    pub fn raw_degree(&self) -> f64 {
        match (self.degree, self.radian) {
            (Some(d), _) => d,
            (None, Some(r)) => r.to_degrees(),
            (None, None) => 0.0,
        }
    }

    pub fn set_radian(&mut self, radian: f64) -> &mut Self {
        self.radian = Some(radian);
        self.degree = None;
        self
    }

    pub fn set_degree(&mut self, degree: f64) -> &mut Self {
        self.degree = Some(degree);
        self.radian = None;
        self
    }

    /// Fill in whichever representation is missing.
    pub fn cache(&mut self) -> &mut Self {
        let (radian, degree) = (self.raw_radian(), self.raw_degree());
        self.radian = Some(radian);
        self.degree = Some(degree);
        self
    }

    pub fn is_cached(&self) -> bool {
        self.radian.is_some() && self.degree.is_some()
    }

    pub fn sin_cos(&self) -> (f64, f64) {
        self.raw_radian().sin_cos()
    }

    /// Compare normalized values, treating `0` and `2π` as neighbours.
    pub fn equals(&self, other: &Angle, epsilon: f64) -> bool {
        let diff = (self.radian() - other.radian()).abs();
        diff <= epsilon || (TAU - diff) <= epsilon
    }

    fn both_degrees(a: &Angle, b: &Angle) -> bool {
        a.radian.is_none() && b.radian.is_none()
    }
}

impl Default for Angle {
    fn default() -> Self {
        Angle::ZERO
    }
}

/// Epsilon comparison with [`DEFAULT_ANGLE_EPSILON`].
impl PartialEq for Angle {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, DEFAULT_ANGLE_EPSILON)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degree())
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        if Angle::both_degrees(&self, &rhs) {
            Angle::from_degrees(self.raw_degree() + rhs.raw_degree())
        } else {
            Angle::from_radians(self.raw_radian() + rhs.raw_radian())
        }
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        if Angle::both_degrees(&self, &rhs) {
            Angle::from_degrees(self.raw_degree() - rhs.raw_degree())
        } else {
            Angle::from_radians(self.raw_radian() - rhs.raw_radian())
        }
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle {
            radian: self.radian.map(|r| -r),
            degree: self.degree.map(|d| -d),
        }
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Angle) {
        *self = *self + rhs;
    }
}

impl SubAssign for Angle {
    fn sub_assign(&mut self, rhs: Angle) {
        *self = *self - rhs;
    }
}

impl Serialize for Angle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Angle", 2)?;
        state.serialize_field("radian", &self.radian())?;
        state.serialize_field("degree", &self.degree())?;
        state.end()
    }
}
