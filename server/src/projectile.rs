use crate::body::{BodyId, MassiveBody};
use crate::player::PlayerId;
use arena_shared::config::ArenaConfig;
use arena_shared::vec3::Vec3;

pub const PROJECTILE_COLOR: u32 = 0xffe066;

/// Short-lived shell fired by a robot. Destroyed on first contact.
#[derive(Debug, Clone)]
pub struct FlyingProjectile {
    pub body: MassiveBody,
    /// Player whose robot fired it
    pub owner: PlayerId,
    pub color: u32,
    /// Energy dealt to whatever it hits (J)
    pub damage: f64,
}

impl FlyingProjectile {
    pub fn new(
        id: BodyId,
        owner: PlayerId,
        position: Vec3,
        velocity: Vec3,
        config: &ArenaConfig,
    ) -> Self {
        Self {
            body: MassiveBody::new(
                id,
                config.projectile_mass,
                config.projectile_radius,
                position,
                velocity,
                0.0,
            ),
            owner,
            color: PROJECTILE_COLOR,
            damage: config.projectile_mass * config.projectile_energy_density,
        }
    }

    /// Total absorption: self-destruct and damage the struck body, no momentum back.
    pub fn compute_collision(&mut self, other: &mut MassiveBody) {
        if !self.body.active {
            return;
        }
        self.body.active = false;
        other.substract_damage(self.damage);
        tracing::debug!(
            "Projectile {} from player {} hit body {} for {} J",
            self.body.id,
            self.owner,
            other.id,
            self.damage
        );
    }
}
