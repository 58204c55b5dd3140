/// 3D vector algebra for positions (m) and velocities (m/s).
/// Every operation returns a new vector except `add_scaled`, which mutates in place.
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Squared-distance tolerance used by `approx_eq`.
pub const EQUALITY_TOLERANCE: f64 = 1e-15;

#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const X: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    pub const Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn sum(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// `self - other`
    pub fn difference(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn scale(self, factor: f64) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// `self += v * factor`, in place.
    pub fn add_scaled(&mut self, v: Vec3, factor: f64) {
        self.x += v.x * factor;
        self.y += v.y * factor;
        self.z += v.z * factor;
    }

    /// Dot product
    pub fn scalar_product(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Right-handed cross product
    pub fn vector_product(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn squared_length(self) -> f64 {
        self.scalar_product(self)
    }

    pub fn length(self) -> f64 {
        self.squared_length().sqrt()
    }

    /// Unit vector in the same direction.
    /// Returns `None` for the zero vector or a vector with non-finite components.
    pub fn unit(self) -> Option<Vec3> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return None;
        }
        Some(self.scale(1.0 / len))
    }

    /// Equality within `EQUALITY_TOLERANCE` on the squared difference.
    pub fn approx_eq(self, other: Vec3) -> bool {
        self.difference(other).squared_length() < EQUALITY_TOLERANCE
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Shorthand constructor
pub fn vec3(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        self.sum(rhs)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        self.difference(rhs)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        self.scale(rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        self.scale(-1.0)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.add_scaled(rhs, 1.0);
    }
}
