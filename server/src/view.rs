//! Subjective views: the world projected into an observer's local frame.
//!
//! Bodies hidden behind the reference body's curvature are left out. Two
//! points see each other when their distance is at most the sum of their
//! horizon distances `sqrt(h² + 2Rh)`.

use crate::body::{Body, BodyId, MassiveBody};
use arena_shared::frame::{FORWARD, SIDEWAYS, UPWARD};
use arena_shared::protocol::{round4_array, BodyKind, ViewObject};
use arena_shared::quaternion::Quaternion;
use arena_shared::vec3::{vec3, Vec3};

pub const PLANET_COLOR: u32 = 0x3b6ea5;

/// Distance to the horizon from `height` above a sphere of `planet_radius`.
/// Heights below the surface count as zero.
pub fn horizon_distance(height: f64, planet_radius: f64) -> f64 {
    let h = height.max(0.0);
    (h * h + 2.0 * planet_radius * h).sqrt()
}

pub fn height_above(reference: &MassiveBody, point: Vec3) -> f64 {
    (point - reference.position).length() - reference.radius
}

/// Horizon test between an observer point and a body.
pub fn is_visible(reference: &MassiveBody, observer: Vec3, target: &MassiveBody) -> bool {
    let observer_horizon = horizon_distance(height_above(reference, observer), reference.radius);
    // The top of the target is what pokes over the horizon.
    let target_height = height_above(reference, target.position) + target.radius;
    let target_horizon = horizon_distance(target_height, reference.radius);
    (target.position - observer).length() <= observer_horizon + target_horizon
}

/// Local frame rooted at an observer.
#[derive(Debug, Clone, Copy)]
pub struct ViewFrame {
    pub origin: Vec3,
    pub orientation: Quaternion,
    forward: Vec3,
    sideways: Vec3,
    upward: Vec3,
}

impl ViewFrame {
    pub fn new(origin: Vec3, orientation: Quaternion) -> Self {
        let axis = |canonical: Vec3| orientation.rotate(canonical).unwrap_or(canonical);
        Self {
            origin,
            orientation,
            forward: axis(FORWARD),
            sideways: axis(SIDEWAYS),
            upward: axis(UPWARD),
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Express a world direction in (forward, sideways, upward) coordinates.
    pub fn local_direction(&self, direction: Vec3) -> Vec3 {
        vec3(
            direction.scalar_product(self.forward),
            direction.scalar_product(self.sideways),
            direction.scalar_product(self.upward),
        )
    }

    /// Express a world point relative to the origin in local coordinates.
    pub fn project(&self, point: Vec3) -> Vec3 {
        self.local_direction(point - self.origin)
    }

    /// Whether a sphere at `center` overlaps the cone of `half_angle` around forward.
    pub fn in_cone(&self, center: Vec3, radius: f64, half_angle: f64) -> bool {
        let offset = center - self.origin;
        let distance = offset.length();
        if distance <= radius {
            return true;
        }
        let cos = (offset.scalar_product(self.forward) / distance).clamp(-1.0, 1.0);
        let angular_radius = (radius / distance).min(1.0).asin();
        cos.acos() - angular_radius <= half_angle
    }

    /// Unit direction of the reference body's north pole (+Z) flattened onto
    /// the local horizontal plane. Straight ahead when standing on a pole.
    pub fn compass(&self) -> Vec3 {
        let north = self.local_direction(Vec3::Z);
        vec3(north.x, north.y, 0.0).unit().unwrap_or(FORWARD)
    }

    pub fn view_object(
        &self,
        id: BodyId,
        kind: BodyKind,
        body: &MassiveBody,
        color: u32,
    ) -> ViewObject {
        ViewObject {
            id,
            kind,
            radius: body.radius,
            position: round4_array(self.project(body.position).to_array()),
            color,
        }
    }
}

pub fn planet_object(frame: &ViewFrame, reference: &MassiveBody) -> ViewObject {
    frame.view_object(reference.id, BodyKind::Planet, reference, PLANET_COLOR)
}

/// Project every active, unoccluded body; `filter` can narrow the set further.
pub fn project_bodies<'a>(
    frame: &ViewFrame,
    reference: &MassiveBody,
    bodies: impl IntoIterator<Item = &'a Body>,
    filter: impl Fn(&MassiveBody) -> bool,
) -> Vec<ViewObject> {
    bodies
        .into_iter()
        .filter(|body| body.is_active())
        .filter(|body| is_visible(reference, frame.origin, body.core()))
        .filter(|body| filter(body.core()))
        .map(|body| frame.view_object(body.id(), body.kind(), body.core(), body.color()))
        .collect()
}
