//! Massive bodies and the closed set of body variants the world simulates.

use crate::projectile::FlyingProjectile;
use crate::robot::FighterRobot;
use arena_shared::config::ArenaConfig;
use arena_shared::protocol::BodyKind;
use arena_shared::vec3::Vec3;

pub type BodyId = u32;

/// Colour used for bodies that have no owner.
pub const NEUTRAL_COLOR: u32 = 0xb0b0b0;

/// Physical state shared by every simulated object.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MassiveBody {
    pub id: BodyId,
    /// kg, always > 0
    pub mass: f64,
    /// m, always > 0
    pub radius: f64,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Remaining energy (J)
    pub life: f64,
    /// Inactive bodies are removed at the end of the tick
    pub active: bool,
    /// In contact with the reference body
    pub rolling: bool,
}

impl MassiveBody {
    pub fn new(
        id: BodyId,
        mass: f64,
        radius: f64,
        position: Vec3,
        velocity: Vec3,
        life: f64,
    ) -> Self {
        Self {
            id,
            mass,
            radius,
            position,
            velocity,
            life,
            active: true,
            rolling: false,
        }
    }

    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass
    }

    /// Surface-to-surface distance; negative when overlapping.
    pub fn separation(&self, other: &MassiveBody) -> f64 {
        (other.position - self.position).length() - self.radius - other.radius
    }

    /// Semi-implicit Euler gravity step toward `reference`.
    ///
    /// Returns true when the body touches the reference body afterwards, in
    /// which case `rolling` is set and the caller handles the contact.
    pub fn compute_attraction(
        &mut self,
        reference: &MassiveBody,
        dt: f64,
        gravity_constant: f64,
    ) -> bool {
        let offset = reference.position - self.position;
        let distance = offset.length();
        if distance == 0.0 || !distance.is_finite() {
            tracing::warn!(
                "Body {} has degenerate distance {} to reference body",
                self.id,
                distance
            );
            return false;
        }
        let factor = gravity_constant * reference.mass / (distance * distance * distance);
        self.velocity.add_scaled(offset, factor * dt);

        self.rolling = distance - self.radius - reference.radius <= 0.0;
        self.rolling
    }

    /// Integrate position, or deactivate when outside the play volume.
    pub fn move_by(&mut self, dt: f64, play_volume_radius: f64) {
        if !self.active {
            return;
        }
        if self.position.length() > play_volume_radius {
            tracing::debug!("Body {} left the play volume", self.id);
            self.active = false;
            return;
        }
        self.position.add_scaled(self.velocity, dt);
    }

    pub fn substract_damage(&mut self, energy: f64) {
        if !energy.is_finite() || energy <= 0.0 {
            if energy.is_nan() {
                tracing::warn!("Ignored NaN damage on body {}", self.id);
            }
            return;
        }
        self.life -= energy;
        if self.life <= 0.0 {
            self.active = false;
        }
    }

    /// Move `momentum` out of this body and into `other`.
    pub fn transfer_momentum(&mut self, other: &mut MassiveBody, momentum: Vec3) {
        self.velocity.add_scaled(momentum, -1.0 / self.mass);
        other.velocity.add_scaled(momentum, 1.0 / other.mass);
    }

    /// Default collision response: plain momentum transfer.
    pub fn compute_collision(&mut self, other: &mut MassiveBody, momentum: Vec3) {
        self.transfer_momentum(other, momentum);
    }

    /// Place the body on the reference body's surface along `normal`.
    pub fn rest_on(&mut self, reference: &MassiveBody, normal: Vec3) {
        self.position = reference.position + normal * (reference.radius + self.radius);
    }
}

/// Every kind of body the world can hold.
#[derive(Debug, Clone)]
pub enum Body {
    Inert(MassiveBody),
    Robot(FighterRobot),
    Projectile(FlyingProjectile),
}

impl Body {
    pub fn core(&self) -> &MassiveBody {
        match self {
            Body::Inert(body) => body,
            Body::Robot(robot) => &robot.body,
            Body::Projectile(projectile) => &projectile.body,
        }
    }

    pub fn core_mut(&mut self) -> &mut MassiveBody {
        match self {
            Body::Inert(body) => body,
            Body::Robot(robot) => &mut robot.body,
            Body::Projectile(projectile) => &mut projectile.body,
        }
    }

    pub fn id(&self) -> BodyId {
        self.core().id
    }

    pub fn is_active(&self) -> bool {
        self.core().active
    }

    pub fn kind(&self) -> BodyKind {
        match self {
            Body::Inert(_) => BodyKind::Body,
            Body::Robot(_) => BodyKind::Robot,
            Body::Projectile(_) => BodyKind::Projectile,
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            Body::Inert(_) => NEUTRAL_COLOR,
            Body::Robot(robot) => robot.color,
            Body::Projectile(projectile) => projectile.color,
        }
    }

    pub fn as_robot(&self) -> Option<&FighterRobot> {
        match self {
            Body::Robot(robot) => Some(robot),
            _ => None,
        }
    }

    pub fn as_robot_mut(&mut self) -> Option<&mut FighterRobot> {
        match self {
            Body::Robot(robot) => Some(robot),
            _ => None,
        }
    }

    /// Gravity toward the reference body plus whatever contact it causes.
    ///
    /// The reference body is anchored: contact responses act on a copy of it.
    pub fn apply_gravity(&mut self, reference: &MassiveBody, dt: f64, config: &ArenaConfig) {
        if !self.is_active() {
            return;
        }
        if !self
            .core_mut()
            .compute_attraction(reference, dt, config.gravity_constant)
        {
            return;
        }
        let mut anchor = reference.clone();
        match self {
            Body::Robot(robot) => robot.land(reference, config),
            Body::Projectile(projectile) => projectile.compute_collision(&mut anchor),
            Body::Inert(body) => {
                let momentum = body.momentum();
                body.compute_collision(&mut anchor, momentum);
            }
        }
    }

    /// React to a collision, handing over this body's share of the relative momentum.
    pub fn compute_collision(
        &mut self,
        other: &mut MassiveBody,
        momentum: Vec3,
        config: &ArenaConfig,
    ) {
        match self {
            Body::Inert(body) => body.compute_collision(other, momentum),
            Body::Robot(robot) => robot.compute_collision(other, momentum, config),
            Body::Projectile(projectile) => projectile.compute_collision(other),
        }
    }
}
