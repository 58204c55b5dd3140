//! Orientable coordinate frames.
//!
//! A frame's orientation quaternion maps the canonical basis
//! (forward = +X, sideways = +Y, upward = +Z) into world space.
//! Rotations are expressed about the frame's *current* world-space axes and
//! pre-composed onto the orientation, which makes them intrinsic to the body.
//!
//! A [`DependentSystem`] is mounted on a primary [`CoordinateSystem`]. It stores
//! only its delta relative to the primary and recomputes its absolute
//! orientation on read, so it rides along with every primary rotation while
//! keeping its own aim.

use crate::quaternion::Quaternion;
use crate::vec3::Vec3;

pub const FORWARD: Vec3 = Vec3::X;
pub const SIDEWAYS: Vec3 = Vec3::Y;
pub const UPWARD: Vec3 = Vec3::Z;

fn basis(orientation: &Quaternion, canonical: Vec3) -> Vec3 {
    orientation.rotate(canonical).unwrap_or(canonical)
}

/// `orientation` turned by `angle` about the world-space `axis`.
fn turned(orientation: &Quaternion, axis: Vec3, angle: f64) -> Option<Quaternion> {
    let r = Quaternion::from_axis_angle(angle, axis)?;
    r.product(orientation).unit()
}

/// Minimal rotation bringing the frame's upward axis onto `target`.
/// `None` means nothing to do (zero target, already aligned) or a degenerate rotation.
fn aligned_upward(orientation: &Quaternion, target: Vec3) -> Option<Quaternion> {
    let target = target.unit()?;
    let up = basis(orientation, UPWARD);
    let d = up.scalar_product(target);
    if d >= 1.0 {
        return None;
    }
    let mut axis = up.vector_product(target);
    if axis.squared_length() == 0.0 {
        if d > 0.0 {
            return None;
        }
        // Antiparallel: any horizontal axis works, keep heading by flipping over sideways.
        axis = basis(orientation, SIDEWAYS);
    }
    let angle = d.max(-1.0).acos();
    turned(orientation, axis, angle)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CoordinateSystem {
    orientation: Quaternion,
}

impl CoordinateSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orientation(&self) -> Quaternion {
        self.orientation
    }

    pub fn upward(&self) -> Vec3 {
        basis(&self.orientation, UPWARD)
    }

    pub fn forward(&self) -> Vec3 {
        basis(&self.orientation, FORWARD)
    }

    pub fn sideways(&self) -> Vec3 {
        basis(&self.orientation, SIDEWAYS)
    }

    /// Rotate about the current sideways axis. Positive angles dip the nose.
    pub fn pitch(&mut self, angle: f64) {
        let axis = self.sideways();
        self.apply(turned(&self.orientation, axis, angle), "pitch");
    }

    /// Rotate about the current upward axis. Positive angles turn left.
    pub fn yaw(&mut self, angle: f64) {
        let axis = self.upward();
        self.apply(turned(&self.orientation, axis, angle), "yaw");
    }

    /// Rotate about the current forward axis. Positive angles bank right.
    pub fn roll(&mut self, angle: f64) {
        let axis = self.forward();
        self.apply(turned(&self.orientation, axis, angle), "roll");
    }

    /// Rotate so the upward axis points along `target`. No-op for a zero target.
    pub fn align_upward(&mut self, target: Vec3) {
        if let Some(orientation) = aligned_upward(&self.orientation, target) {
            self.orientation = orientation;
        }
    }

    fn apply(&mut self, orientation: Option<Quaternion>, what: &str) {
        match orientation {
            Some(q) => self.orientation = q,
            None => tracing::warn!("Skipped degenerate {} on {:?}", what, self.orientation),
        }
    }
}

/// Frame mounted on a primary [`CoordinateSystem`], e.g. a turret on a hull.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DependentSystem {
    /// Orientation relative to the primary.
    delta: Quaternion,
}

impl DependentSystem {
    /// Mount with no offset: the dependent starts out aligned with its primary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute orientation given the primary's current one.
    pub fn orientation(&self, primary: &CoordinateSystem) -> Quaternion {
        primary
            .orientation
            .product(&self.delta)
            .unit()
            .unwrap_or(primary.orientation)
    }

    pub fn upward(&self, primary: &CoordinateSystem) -> Vec3 {
        basis(&self.orientation(primary), UPWARD)
    }

    pub fn forward(&self, primary: &CoordinateSystem) -> Vec3 {
        basis(&self.orientation(primary), FORWARD)
    }

    pub fn sideways(&self, primary: &CoordinateSystem) -> Vec3 {
        basis(&self.orientation(primary), SIDEWAYS)
    }

    pub fn pitch(&mut self, primary: &CoordinateSystem, angle: f64) {
        let axis = self.sideways(primary);
        self.turn(primary, axis, angle);
    }

    pub fn yaw(&mut self, primary: &CoordinateSystem, angle: f64) {
        let axis = self.upward(primary);
        self.turn(primary, axis, angle);
    }

    pub fn roll(&mut self, primary: &CoordinateSystem, angle: f64) {
        let axis = self.forward(primary);
        self.turn(primary, axis, angle);
    }

    pub fn align_upward(&mut self, primary: &CoordinateSystem, target: Vec3) {
        if let Some(absolute) = aligned_upward(&self.orientation(primary), target) {
            self.set_absolute(primary, absolute);
        }
    }

    fn turn(&mut self, primary: &CoordinateSystem, axis: Vec3, angle: f64) {
        match turned(&self.orientation(primary), axis, angle) {
            Some(absolute) => self.set_absolute(primary, absolute),
            None => tracing::warn!("Skipped degenerate turn on dependent frame {:?}", self.delta),
        }
    }

    fn set_absolute(&mut self, primary: &CoordinateSystem, absolute: Quaternion) {
        if let Some(delta) = primary.orientation.conjugate().product(&absolute).unit() {
            self.delta = delta;
        }
    }
}
