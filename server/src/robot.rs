//! Fighter robots: a massive body with a steerable hull and an independently
//! aimable turret mounted on it.

use crate::body::{Body, BodyId, MassiveBody};
use crate::player::{color_from_id, PlayerId};
use crate::projectile::FlyingProjectile;
use crate::view::{planet_object, project_bodies, ViewFrame};
use arena_shared::config::ArenaConfig;
use arena_shared::frame::{CoordinateSystem, DependentSystem};
use arena_shared::protocol::{
    round4, round4_array, Arrow, BodyKind, Control, GlobalObject, GlobalUpdate, ViewUpdate,
};
use arena_shared::vec3::Vec3;

#[derive(Debug, Clone)]
pub struct FighterRobot {
    pub body: MassiveBody,
    pub player_id: PlayerId,
    pub color: u32,
    /// Hull frame: heading and thrust direction
    vehicle: CoordinateSystem,
    /// Turret frame, riding on the hull
    cannon: DependentSystem,
    ammo: u32,
    /// World time before which the cannon stays cold (s)
    next_shot_at: f64,
}

impl FighterRobot {
    /// Spawn a robot whose hull stands upright along `up`.
    pub fn new(
        id: BodyId,
        player_id: PlayerId,
        position: Vec3,
        velocity: Vec3,
        up: Vec3,
        config: &ArenaConfig,
    ) -> Self {
        let mut vehicle = CoordinateSystem::new();
        vehicle.align_upward(up);
        Self {
            body: MassiveBody::new(
                id,
                config.robot_mass,
                config.robot_radius,
                position,
                velocity,
                config.robot_life,
            ),
            player_id,
            color: color_from_id(player_id),
            vehicle,
            cannon: DependentSystem::new(),
            ammo: config.robot_ammo,
            next_shot_at: 0.0,
        }
    }

    pub fn vehicle(&self) -> &CoordinateSystem {
        &self.vehicle
    }

    pub fn cannon_forward(&self) -> Vec3 {
        self.cannon.forward(&self.vehicle)
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    // === Steering ===

    pub fn accelerate(&mut self, seconds: f64, config: &ArenaConfig) {
        let forward = self.vehicle.forward();
        self.body
            .velocity
            .add_scaled(forward, config.acceleration * seconds);
    }

    /// Slow down along the current velocity, never reversing it.
    pub fn brake(&mut self, seconds: f64, config: &ArenaConfig) {
        let speed = self.body.velocity.length();
        if let Some(direction) = self.body.velocity.unit() {
            let delta = (config.braking * seconds).min(speed);
            self.body.velocity.add_scaled(direction, -delta);
        }
    }

    pub fn turn_left(&mut self, seconds: f64, config: &ArenaConfig) {
        self.vehicle.yaw(config.turn_rate * seconds);
    }

    pub fn turn_right(&mut self, seconds: f64, config: &ArenaConfig) {
        self.vehicle.yaw(-config.turn_rate * seconds);
    }

    pub fn turn_up(&mut self, seconds: f64, config: &ArenaConfig) {
        self.vehicle.pitch(-config.turn_rate * seconds);
    }

    pub fn turn_down(&mut self, seconds: f64, config: &ArenaConfig) {
        self.vehicle.pitch(config.turn_rate * seconds);
    }

    pub fn roll_left(&mut self, seconds: f64, config: &ArenaConfig) {
        self.vehicle.roll(-config.turn_rate * seconds);
    }

    pub fn roll_right(&mut self, seconds: f64, config: &ArenaConfig) {
        self.vehicle.roll(config.turn_rate * seconds);
    }

    pub fn point_left(&mut self, seconds: f64, config: &ArenaConfig) {
        self.cannon.yaw(&self.vehicle, config.point_rate * seconds);
    }

    pub fn point_right(&mut self, seconds: f64, config: &ArenaConfig) {
        self.cannon.yaw(&self.vehicle, -config.point_rate * seconds);
    }

    pub fn point_up(&mut self, seconds: f64, config: &ArenaConfig) {
        self.cannon.pitch(&self.vehicle, -config.point_rate * seconds);
    }

    pub fn point_down(&mut self, seconds: f64, config: &ArenaConfig) {
        self.cannon.pitch(&self.vehicle, config.point_rate * seconds);
    }

    /// Turn the hull so it stands upright along `up`.
    pub fn point_at(&mut self, up: Vec3) {
        self.vehicle.align_upward(up);
    }

    /// Apply a timed steering command. `Shoot` is handled by [`FighterRobot::shoot`].
    pub fn steer(&mut self, control: Control, seconds: f64, config: &ArenaConfig) {
        match control {
            Control::Accelerate => self.accelerate(seconds, config),
            Control::Brake => self.brake(seconds, config),
            Control::TurnLeft => self.turn_left(seconds, config),
            Control::TurnRight => self.turn_right(seconds, config),
            Control::TurnUp => self.turn_up(seconds, config),
            Control::TurnDown => self.turn_down(seconds, config),
            Control::RollLeft => self.roll_left(seconds, config),
            Control::RollRight => self.roll_right(seconds, config),
            Control::PointLeft => self.point_left(seconds, config),
            Control::PointRight => self.point_right(seconds, config),
            Control::PointUp => self.point_up(seconds, config),
            Control::PointDown => self.point_down(seconds, config),
            Control::Shoot => {}
        }
    }

    // === Weapon ===

    /// Fire one projectile at world time `now`, if ammo and cooldown allow.
    ///
    /// The projectile's mass leaves the robot and its momentum is balanced by
    /// recoil, so total momentum is unchanged.
    pub fn shoot(
        &mut self,
        id: BodyId,
        now: f64,
        config: &ArenaConfig,
    ) -> Option<FlyingProjectile> {
        if self.ammo == 0 || now < self.next_shot_at {
            return None;
        }
        if self.body.mass - config.projectile_mass <= 0.0 {
            return None;
        }

        let direction = self.cannon_forward();
        let muzzle = self.body.radius + config.projectile_radius + 2.0 * config.collision_margin;
        let tip = self.body.position + direction * muzzle;
        let mut projectile =
            FlyingProjectile::new(id, self.player_id, tip, self.body.velocity, config);

        self.body.mass -= config.projectile_mass;
        let momentum = direction * (config.projectile_mass * config.projectile_speed);
        self.body.transfer_momentum(&mut projectile.body, momentum);

        self.ammo -= 1;
        self.next_shot_at = now + config.shoot_cooldown;
        tracing::debug!(
            "Robot {} fired projectile {} ({} left)",
            self.body.id,
            id,
            self.ammo
        );
        Some(projectile)
    }

    // === Contact ===

    /// Body-to-body impact. `momentum` is this robot's share of the pair's
    /// relative momentum; hard impacts cost life before the share moves on.
    pub fn compute_collision(
        &mut self,
        other: &mut MassiveBody,
        momentum: Vec3,
        config: &ArenaConfig,
    ) {
        let impact_speed = momentum.length() / self.body.mass;
        if impact_speed > config.harm_speed {
            let energy = 0.5 * self.body.mass * impact_speed * impact_speed;
            self.body.substract_damage(energy);
            tracing::debug!(
                "Robot {} rammed body {} at {} m/s",
                self.body.id,
                other.id,
                impact_speed
            );
        }
        self.body.transfer_momentum(other, momentum);
    }

    /// Contact with the reference body: rest, or bounce with damage and friction.
    pub fn land(&mut self, reference: &MassiveBody, config: &ArenaConfig) {
        let Some(normal) = (self.body.position - reference.position).unit() else {
            tracing::warn!("Robot {} is at the reference body's centre", self.body.id);
            return;
        };
        let velocity = self.body.velocity;
        let normal_speed = velocity.scalar_product(normal);
        let normal_velocity = normal * normal_speed;
        let mut tangential = velocity - normal_velocity;
        let closing = -normal_speed;
        if !closing.is_finite() {
            tracing::warn!("Robot {} has non-finite closing speed", self.body.id);
            return;
        }

        self.body.rest_on(reference, normal);

        if closing < config.rest_speed {
            if normal_speed < 0.0 {
                self.body.velocity = tangential;
            }
            return;
        }

        if closing > config.harm_speed {
            let energy = 0.5 * self.body.mass * normal_speed * normal_speed;
            self.body.substract_damage(energy);
            tracing::debug!("Robot {} hit the ground at {} m/s", self.body.id, closing);
        }

        let rebound = normal_velocity - normal_velocity * config.rebound_damping;
        let tangential_speed = tangential.length();
        if let Some(direction) = tangential.unit() {
            let loss = (config.surface_friction * closing).min(tangential_speed);
            tangential = direction * (tangential_speed - loss);
        }
        self.body.velocity = tangential + rebound;
        self.point_at(normal);
    }

    // === Views ===

    fn eye(&self) -> Vec3 {
        self.body.position + self.vehicle.upward() * self.body.radius
    }

    fn header(
        &self,
        frame: &ViewFrame,
        reference: &MassiveBody,
        config: &ArenaConfig,
    ) -> ViewUpdate {
        let aim = frame.origin + self.cannon_forward() * config.aim_distance;
        ViewUpdate {
            camera: round4_array(frame.orientation.to_array()),
            origin: round4_array(frame.origin.to_array()),
            speed: round4(self.body.velocity.length()),
            height: round4(self.body.separation(reference)),
            target: round4_array(frame.project(aim).to_array()),
            compass: round4_array(frame.compass().to_array()),
            objects: Vec::new(),
        }
    }

    /// Everything visible from the hull's eye, in hull coordinates.
    pub fn compute_view_update<'a>(
        &self,
        others: impl IntoIterator<Item = &'a Body>,
        reference: &MassiveBody,
        config: &ArenaConfig,
    ) -> ViewUpdate {
        let frame = ViewFrame::new(self.eye(), self.vehicle.orientation());
        let mut update = self.header(&frame, reference, config);
        update.objects.push(planet_object(&frame, reference));
        update
            .objects
            .extend(project_bodies(&frame, reference, others, |_| true));
        update
    }

    /// Bodies in the turret's line of sight, in turret coordinates.
    pub fn compute_cannon_update<'a>(
        &self,
        others: impl IntoIterator<Item = &'a Body>,
        reference: &MassiveBody,
        config: &ArenaConfig,
    ) -> ViewUpdate {
        let orientation = self.cannon.orientation(&self.vehicle);
        let origin = self.body.position + self.cannon_forward() * self.body.radius;
        let frame = ViewFrame::new(origin, orientation);
        let half_angle = config.cannon_view_half_angle;
        let mut update = self.header(&frame, reference, config);
        if frame.in_cone(reference.position, reference.radius, half_angle) {
            update.objects.push(planet_object(&frame, reference));
        }
        update.objects.extend(project_bodies(&frame, reference, others, |body| {
            frame.in_cone(body.position, body.radius, half_angle)
        }));
        update
    }

    /// Absolute positions of all bodies plus this robot's heading arrow.
    pub fn compute_global_update<'a>(
        &self,
        bodies: impl IntoIterator<Item = &'a Body>,
        reference: &MassiveBody,
        seconds: f64,
    ) -> GlobalUpdate {
        let mut update = global_update(bodies, reference, seconds);
        update.arrow = Some(Arrow {
            position: round4_array(self.body.position.to_array()),
            direction: round4_array(self.vehicle.forward().to_array()),
        });
        update
    }
}

/// Unprojected snapshot of every active body, without a heading marker.
pub fn global_update<'a>(
    bodies: impl IntoIterator<Item = &'a Body>,
    reference: &MassiveBody,
    seconds: f64,
) -> GlobalUpdate {
    let planet = GlobalObject {
        id: reference.id,
        kind: BodyKind::Planet,
        radius: reference.radius,
        position: round4_array(reference.position.to_array()),
        color: crate::view::PLANET_COLOR,
    };
    let objects = std::iter::once(planet)
        .chain(
            bodies
                .into_iter()
                .filter(|body| body.is_active())
                .map(|body| GlobalObject {
                    id: body.id(),
                    kind: body.kind(),
                    radius: body.core().radius,
                    position: round4_array(body.core().position.to_array()),
                    color: body.color(),
                }),
        )
        .collect();
    GlobalUpdate {
        seconds: round4(seconds),
        objects,
        arrow: None,
    }
}
