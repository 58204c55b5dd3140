use crate::vec3::Vec3;

/// Largest scalar residue `rotate` accepts, relative to the rotated point's length.
const ROTATION_SCALAR_TOLERANCE: f64 = 1e-9;

/// Quaternion `a + b·i + c·j + d·k`; `a` is the scalar part.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Quaternion {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion::new(1.0, 0.0, 0.0, 0.0);

    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Rotation of `angle` radians around `axis`. `None` if the axis has no direction.
    pub fn from_axis_angle(angle: f64, axis: Vec3) -> Option<Quaternion> {
        let axis = axis.unit()?;
        let half = angle / 2.0;
        let s = half.sin();
        Some(Quaternion::new(
            half.cos(),
            axis.x * s,
            axis.y * s,
            axis.z * s,
        ))
    }

    /// Pure quaternion `(0, v)`.
    pub fn from_vector(v: Vec3) -> Quaternion {
        Quaternion::new(0.0, v.x, v.y, v.z)
    }

    pub fn vector(&self) -> Vec3 {
        Vec3::new(self.b, self.c, self.d)
    }

    /// Hamilton product `self · q`.
    pub fn product(&self, q: &Quaternion) -> Quaternion {
        Quaternion {
            a: self.a * q.a - self.b * q.b - self.c * q.c - self.d * q.d,
            b: self.a * q.b + self.b * q.a + self.c * q.d - self.d * q.c,
            c: self.a * q.c - self.b * q.d + self.c * q.a + self.d * q.b,
            d: self.a * q.d + self.b * q.c - self.c * q.b + self.d * q.a,
        }
    }

    pub fn conjugate(&self) -> Quaternion {
        Quaternion::new(self.a, -self.b, -self.c, -self.d)
    }

    pub fn length(&self) -> f64 {
        (self.a * self.a + self.b * self.b + self.c * self.c + self.d * self.d).sqrt()
    }

    /// Normalized copy, `None` at zero (or non-finite) length.
    pub fn unit(&self) -> Option<Quaternion> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return None;
        }
        let inv = 1.0 / len;
        Some(Quaternion::new(
            self.a * inv,
            self.b * inv,
            self.c * inv,
            self.d * inv,
        ))
    }

    /// Rotate `point` by this (unit) quaternion: `q · (0, p) · q*`.
    ///
    /// Returns `None` when the product has a non-negligible scalar part,
    /// which only happens for a non-unit or corrupted quaternion.
    pub fn rotate(&self, point: Vec3) -> Option<Vec3> {
        let rotated = self
            .product(&Quaternion::from_vector(point))
            .product(&self.conjugate());
        let tolerance = ROTATION_SCALAR_TOLERANCE * point.length().max(1.0);
        if !rotated.a.is_finite() || rotated.a.abs() > tolerance {
            tracing::warn!(
                "Rotation produced scalar residue {} (quaternion {:?})",
                rotated.a,
                self
            );
            return None;
        }
        Some(rotated.vector())
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }
}
