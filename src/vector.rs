use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Immutable vector on the horizontal (x, z) plane.
///
/// Double precision to match host coordinates. Every operation is total:
/// dividing by zero or normalizing the zero vector yields `ZERO`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub z: f64,
}

impl Vector2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Unit vector pointing at `radians` (measured from +x toward +z).
    pub fn from_angle(radians: f64) -> Self {
        Self::new(radians.cos(), radians.sin())
    }

    pub fn to_glam(self) -> DVec2 {
        DVec2::new(self.x, self.z)
    }

    pub fn from_glam(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }

    pub fn add(self, other: Self) -> Self {
        Self::from_glam(self.to_glam() + other.to_glam())
    }

    pub fn subtract(self, other: Self) -> Self {
        Self::from_glam(self.to_glam() - other.to_glam())
    }

    pub fn multiply(self, scalar: f64) -> Self {
        Self::from_glam(self.to_glam() * scalar)
    }

    /// Division by zero yields `ZERO`.
    pub fn divide(self, scalar: f64) -> Self {
        if scalar == 0.0 {
            return Self::ZERO;
        }
        Self::from_glam(self.to_glam() / scalar)
    }

    pub fn length(self) -> f64 {
        self.to_glam().length()
    }

    pub fn length_squared(self) -> f64 {
        self.to_glam().length_squared()
    }

    /// Unit-length copy; the zero vector stays zero.
    pub fn normalize(self) -> Self {
        Self::from_glam(self.to_glam().normalize_or_zero())
    }

    /// Clamp length to `max_length`. No-op when already shorter.
    pub fn limit(self, max_length: f64) -> Self {
        Self::from_glam(self.to_glam().clamp_length_max(max_length.max(0.0)))
    }

    pub fn truncate(self, max_length: f64) -> Self {
        self.limit(max_length)
    }

    pub fn dot(self, other: Self) -> f64 {
        self.to_glam().dot(other.to_glam())
    }

    pub fn distance_to(self, other: Self) -> f64 {
        self.to_glam().distance(other.to_glam())
    }

    pub fn distance_squared_to(self, other: Self) -> f64 {
        self.to_glam().distance_squared(other.to_glam())
    }

    /// `atan2(z, x)` in radians.
    pub fn angle(self) -> f64 {
        self.z.atan2(self.x)
    }

    pub fn rotate(self, radians: f64) -> Self {
        Self::from_glam(DVec2::from_angle(radians).rotate(self.to_glam()))
    }

    /// 90° counter-clockwise: `(-z, x)`.
    pub fn perpendicular(self) -> Self {
        Self::from_glam(self.to_glam().perp())
    }

    pub fn negate(self) -> Self {
        Self::new(-self.x, -self.z)
    }

    /// Exact comparison, no epsilon.
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.z == 0.0
    }

    pub fn lerp(self, target: Self, t: f64) -> Self {
        Self::from_glam(self.to_glam().lerp(target.to_glam(), t))
    }
}

impl Add for Vector2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Vector2::add(self, rhs)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = Vector2::add(*self, rhs);
    }
}

impl Sub for Vector2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.subtract(rhs)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = self.subtract(rhs);
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.multiply(rhs)
    }
}

impl Div<f64> for Vector2 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        self.divide(rhs)
    }
}

impl Neg for Vector2 {
    type Output = Self;
    fn neg(self) -> Self {
        self.negate()
    }
}
