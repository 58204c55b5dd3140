//! One arena: the reference body, every body orbiting it, and the fixed-step tick.
//!
//! Bodies live in a `Vec` kept in ascending id order (ids are never reused),
//! so iteration is deterministic and pairs can be borrowed with `split_at_mut`.
//! Bodies deactivated during a tick stay in place until the tick's final
//! pruning pass.

use crate::body::{Body, BodyId, MassiveBody};
use crate::player::{Player, PlayerId};
use crate::robot::{global_update, FighterRobot};
use arena_shared::config::ArenaConfig;
use arena_shared::protocol::{Control, GlobalUpdate, ViewUpdate};
use arena_shared::vec3::Vec3;
use std::collections::BTreeMap;

pub const REFERENCE_BODY_ID: BodyId = 0;

/// Longest elapsed time a single control call may cover (s).
pub const MAX_CONTROL_SECONDS: f64 = 1.0;

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub collisions: usize,
    pub removed: Vec<BodyId>,
    /// Players whose robot was destroyed or left the play volume
    pub eliminated: Vec<PlayerId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldStats {
    pub tick: u64,
    pub seconds: f64,
    pub robots: usize,
    pub projectiles: usize,
    pub bodies: usize,
}

/// Swept sphere-sphere test over the interval `[0, dt]`.
///
/// Only converging pairs collide: either already within the margin of each
/// other, or passing closer than the sum of their radii during the interval.
pub fn predict_collision(a: &MassiveBody, b: &MassiveBody, dt: f64, margin: f64) -> bool {
    let offset = b.position - a.position;
    let relative_velocity = b.velocity - a.velocity;
    let radii = a.radius + b.radius;

    let reach = radii + margin + relative_velocity.length() * dt;
    if offset.squared_length() > reach * reach {
        return false;
    }

    let approach = offset.scalar_product(relative_velocity);
    if approach >= 0.0 {
        return false;
    }

    let touching = radii + margin;
    if offset.squared_length() <= touching * touching {
        return true;
    }

    let speed_squared = relative_velocity.squared_length();
    let t = (-approach / speed_squared).clamp(0.0, dt);
    let closest = offset + relative_velocity * t;
    closest.squared_length() < radii * radii
}

/// Split the pair's relative momentum in the centre-of-momentum frame and let
/// each body react to its own share. Returns false if the split is degenerate.
pub fn resolve_collision(a: &mut Body, b: &mut Body, config: &ArenaConfig) -> bool {
    let (m1, v1) = (a.core().mass, a.core().velocity);
    let (m2, v2) = (b.core().mass, b.core().velocity);
    let u0 = (v1 * m1 + v2 * m2) * (1.0 / (m1 + m2));
    if !u0.is_finite() {
        tracing::warn!(
            "Skipped collision between {} and {}: non-finite centre-of-momentum velocity",
            a.id(),
            b.id()
        );
        return false;
    }
    let share_a = (v1 - u0) * m1;
    let share_b = (v2 - u0) * m2;
    tracing::debug!("Collision between {} and {}", a.id(), b.id());
    a.compute_collision(b.core_mut(), share_a, config);
    b.compute_collision(a.core_mut(), share_b, config);
    true
}

fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert!(i < j);
    let (left, right) = bodies.split_at_mut(j);
    (&mut left[i], &mut right[0])
}

pub struct World {
    config: ArenaConfig,
    reference: MassiveBody,
    bodies: Vec<Body>,
    players: BTreeMap<PlayerId, Player>,
    max_players: usize,
    seconds: f64,
    tick: u64,
    next_body_id: BodyId,
}

impl World {
    pub fn new(config: ArenaConfig, max_players: usize) -> Self {
        let reference = MassiveBody::new(
            REFERENCE_BODY_ID,
            config.planet_mass,
            config.planet_radius,
            Vec3::ZERO,
            Vec3::ZERO,
            f64::INFINITY,
        );
        Self {
            config,
            reference,
            bodies: Vec::new(),
            players: BTreeMap::new(),
            max_players,
            seconds: 0.0,
            tick: 0,
            next_body_id: REFERENCE_BODY_ID + 1,
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn reference(&self) -> &MassiveBody {
        &self.reference
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, |b| b.id()).ok()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    pub fn robot(&self, player_id: PlayerId) -> Option<&FighterRobot> {
        let player = self.players.get(&player_id)?;
        self.body(player.robot)?.as_robot()
    }

    fn robot_mut(&mut self, player_id: PlayerId) -> Option<&mut FighterRobot> {
        let player = self.players.get(&player_id)?;
        let index = self.index_of(player.robot)?;
        self.bodies[index].as_robot_mut()
    }

    /// Every registered body other than `id`.
    pub fn bodies_except(&self, id: BodyId) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(move |b| b.id() != id)
    }

    /// Register a pre-built body under a fresh id, which is returned.
    pub fn add_object(&mut self, mut body: Body) -> BodyId {
        let id = self.next_body_id;
        self.next_body_id += 1;
        body.core_mut().id = id;
        self.bodies.push(body);
        id
    }

    /// Spawn a robot for `player_id` at one of two opposite start points,
    /// alternating with the parity of the current body count.
    pub fn add_robot(&mut self, player_id: PlayerId) -> Result<BodyId, String> {
        if self.players.contains_key(&player_id) {
            return Err(format!("player {} already has a robot", player_id));
        }
        if self.players.len() >= self.max_players {
            return Err(format!("arena is full ({} players)", self.max_players));
        }

        let side = if self.bodies.len() % 2 == 0 { 1.0 } else { -1.0 };
        let altitude =
            self.config.planet_radius + self.config.spawn_altitude + self.config.robot_radius;
        let up = Vec3::Z * side;
        let position = self.reference.position + up * altitude;
        let velocity = Vec3::X * (self.config.spawn_speed * side);

        let robot = FighterRobot::new(0, player_id, position, velocity, up, &self.config);
        let color = robot.color;
        let id = self.add_object(Body::Robot(robot));
        self.players.insert(
            player_id,
            Player {
                id: player_id,
                robot: id,
                color,
                joined_at: self.seconds,
            },
        );
        tracing::info!("Player {} joined with robot {}", player_id, id);
        Ok(id)
    }

    /// Remove a player and its robot. Returns false for unknown players.
    pub fn remove_player(&mut self, player_id: PlayerId) -> bool {
        let Some(player) = self.players.remove(&player_id) else {
            return false;
        };
        if let Some(index) = self.index_of(player.robot) {
            self.bodies.remove(index);
        }
        tracing::info!("Player {} left, robot {} removed", player_id, player.robot);
        true
    }

    /// Apply one control call. Returns the id of a fired projectile, if any.
    pub fn control(
        &mut self,
        player_id: PlayerId,
        control: Control,
        seconds: f64,
    ) -> Result<Option<BodyId>, String> {
        let in_range = seconds.is_finite() && (0.0..=MAX_CONTROL_SECONDS).contains(&seconds);
        if control.is_timed() && !in_range {
            return Err(format!(
                "{} needs an elapsed time in [0, {}] s, got {}",
                control, MAX_CONTROL_SECONDS, seconds
            ));
        }

        let config = self.config;
        let now = self.seconds;
        let projectile_id = self.next_body_id;
        let robot = self
            .robot_mut(player_id)
            .ok_or_else(|| format!("no robot for player {}", player_id))?;

        if control != Control::Shoot {
            robot.steer(control, seconds, &config);
            return Ok(None);
        }
        match robot.shoot(projectile_id, now, &config) {
            Some(projectile) => Ok(Some(self.add_object(Body::Projectile(projectile)))),
            None => Ok(None),
        }
    }

    /// Advance the simulation by `dt` seconds.
    pub fn short_loop(&mut self, dt: f64) -> TickReport {
        let mut report = TickReport::default();
        if !dt.is_finite() || dt <= 0.0 {
            tracing::warn!("Ignored tick with invalid dt {}", dt);
            return report;
        }
        self.seconds += dt;
        self.tick += 1;

        let count = self.bodies.len();
        let config = &self.config;

        for body in self.bodies.iter_mut() {
            body.apply_gravity(&self.reference, dt, config);
        }

        for i in 0..count {
            for j in (i + 1)..count {
                let (a, b) = pair_mut(&mut self.bodies, i, j);
                if !a.is_active() || !b.is_active() {
                    continue;
                }
                if predict_collision(a.core(), b.core(), dt, config.collision_margin)
                    && resolve_collision(a, b, config)
                {
                    report.collisions += 1;
                }
            }
        }

        for body in self.bodies.iter_mut() {
            body.core_mut().move_by(dt, config.play_volume_radius);
        }

        self.prune(&mut report);
        report
    }

    fn prune(&mut self, report: &mut TickReport) {
        report.removed = self
            .bodies
            .iter()
            .filter(|b| !b.is_active())
            .map(|b| b.id())
            .collect();
        if report.removed.is_empty() {
            return;
        }
        self.bodies.retain(|b| b.is_active());

        let bodies = &self.bodies;
        let eliminated: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| bodies.binary_search_by_key(&p.robot, |b| b.id()).is_err())
            .map(|p| p.id)
            .collect();
        for player_id in &eliminated {
            self.players.remove(player_id);
            tracing::info!("Player {} was eliminated", player_id);
        }
        report.eliminated = eliminated;
    }

    // === Snapshots ===

    pub fn view_update(&self, player_id: PlayerId) -> ViewUpdate {
        match self.robot(player_id) {
            Some(robot) => robot.compute_view_update(
                self.bodies_except(robot.body.id),
                &self.reference,
                &self.config,
            ),
            None => ViewUpdate::default(),
        }
    }

    pub fn cannon_update(&self, player_id: PlayerId) -> ViewUpdate {
        match self.robot(player_id) {
            Some(robot) => robot.compute_cannon_update(
                self.bodies_except(robot.body.id),
                &self.reference,
                &self.config,
            ),
            None => ViewUpdate::default(),
        }
    }

    /// Global snapshot as seen by `player_id`. Empty for unknown players.
    pub fn global_update(&self, player_id: PlayerId) -> GlobalUpdate {
        match self.robot(player_id) {
            Some(robot) => robot.compute_global_update(&self.bodies, &self.reference, self.seconds),
            None => GlobalUpdate::default(),
        }
    }

    /// Global snapshot without a heading marker, for spectators and broadcasts.
    pub fn spectator_update(&self) -> GlobalUpdate {
        global_update(&self.bodies, &self.reference, self.seconds)
    }

    pub fn stats(&self) -> WorldStats {
        let robots = self
            .bodies
            .iter()
            .filter(|b| matches!(b, Body::Robot(_)))
            .count();
        let projectiles = self
            .bodies
            .iter()
            .filter(|b| matches!(b, Body::Projectile(_)))
            .count();
        WorldStats {
            tick: self.tick,
            seconds: self.seconds,
            robots,
            projectiles,
            bodies: self.bodies.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projectile::FlyingProjectile;
    use arena_shared::vec3::vec3;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const DT: f64 = 1.0 / 30.0;

    fn assert_vec3_close(actual: Vec3, expected: Vec3, tolerance: f64) {
        assert!(
            (actual - expected).length() < tolerance,
            "Expected {:?} to be close to {:?}",
            actual,
            expected
        );
    }

    fn test_world() -> World {
        World::new(ArenaConfig::default(), 8)
    }

    fn robot_body(player_id: PlayerId, position: Vec3, velocity: Vec3) -> Body {
        let config = ArenaConfig::default();
        Body::Robot(FighterRobot::new(0, player_id, position, velocity, Vec3::Z, &config))
    }

    fn inert(position: Vec3, velocity: Vec3, mass: f64, radius: f64) -> Body {
        Body::Inert(MassiveBody::new(0, mass, radius, position, velocity, 1.0e6))
    }

    // --- collision prediction ---

    #[test]
    fn converging_bodies_are_predicted_to_collide() {
        let a = MassiveBody::new(1, 1.0, 1.0, vec3(0.0, 0.0, 0.0), vec3(10.0, 0.0, 0.0), 1.0);
        let b = MassiveBody::new(2, 1.0, 1.0, vec3(5.0, 0.0, 0.0), vec3(-10.0, 0.0, 0.0), 1.0);
        // Closing at 20 m/s, 3 m of free space: contact within 0.2 s.
        assert!(predict_collision(&a, &b, 0.2, 0.1));
        assert!(!predict_collision(&a, &b, 0.1, 0.1));
    }

    #[test]
    fn diverging_bodies_are_not_predicted_to_collide() {
        let a = MassiveBody::new(1, 1.0, 1.0, vec3(0.0, 0.0, 0.0), vec3(-10.0, 0.0, 0.0), 1.0);
        let b = MassiveBody::new(2, 1.0, 1.0, vec3(1.5, 0.0, 0.0), vec3(10.0, 0.0, 0.0), 1.0);
        assert!(!predict_collision(&a, &b, 1.0, 0.1));
    }

    #[test]
    fn fast_bodies_are_caught_between_ticks() {
        // Would tunnel through each other with a discrete overlap test.
        let a = MassiveBody::new(1, 1.0, 0.5, vec3(0.0, 0.0, 0.0), vec3(500.0, 0.0, 0.0), 1.0);
        let b = MassiveBody::new(2, 1.0, 0.5, vec3(10.0, 0.3, 0.0), Vec3::ZERO, 1.0);
        assert!(predict_collision(&a, &b, DT, 0.0));
    }

    #[test]
    fn near_miss_is_not_a_collision() {
        let a = MassiveBody::new(1, 1.0, 0.5, vec3(0.0, 0.0, 0.0), vec3(500.0, 0.0, 0.0), 1.0);
        let b = MassiveBody::new(2, 1.0, 0.5, vec3(10.0, 1.5, 0.0), Vec3::ZERO, 1.0);
        assert!(!predict_collision(&a, &b, DT, 0.0));
    }

    #[test]
    fn overlapping_converging_bodies_collide() {
        let a = MassiveBody::new(1, 1.0, 1.0, Vec3::ZERO, vec3(0.01, 0.0, 0.0), 1.0);
        let b = MassiveBody::new(2, 1.0, 1.0, vec3(2.05, 0.0, 0.0), Vec3::ZERO, 1.0);
        assert!(predict_collision(&a, &b, DT, 0.1));
    }

    // --- collision resolution ---

    #[test]
    fn collision_conserves_momentum() {
        let mut a = inert(Vec3::ZERO, vec3(4.0, 1.0, -2.0), 3.0, 1.0);
        let mut b = inert(vec3(1.0, 0.0, 0.0), vec3(-1.0, 0.5, 0.0), 5.0, 1.0);
        let before = a.core().momentum() + b.core().momentum();
        assert!(resolve_collision(&mut a, &mut b, &ArenaConfig::default()));
        let after = a.core().momentum() + b.core().momentum();
        assert_vec3_close(after, before, 1e-9);
    }

    #[test]
    fn collision_conserves_momentum_for_random_pairs() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..100 {
            let mut random_vec = || {
                vec3(
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                )
            };
            let (v1, v2) = (random_vec(), random_vec());
            let mut a = inert(Vec3::ZERO, v1, rng.gen_range(0.5..2000.0), 1.0);
            let mut b = inert(Vec3::X, v2, rng.gen_range(0.5..2000.0), 1.0);
            let before = a.core().momentum() + b.core().momentum();
            resolve_collision(&mut a, &mut b, &ArenaConfig::default());
            let after = a.core().momentum() + b.core().momentum();
            assert_vec3_close(after, before, 1e-6 * before.length().max(1.0));
        }
    }

    #[test]
    fn robot_collisions_conserve_momentum() {
        let config = ArenaConfig::default();
        let mut a = robot_body(1, Vec3::ZERO, vec3(5.0, 0.0, 0.0));
        let mut b = robot_body(2, vec3(9.0, 0.0, 0.0), vec3(-5.0, 1.0, 0.0));
        let before = a.core().momentum() + b.core().momentum();
        resolve_collision(&mut a, &mut b, &config);
        assert_vec3_close(a.core().momentum() + b.core().momentum(), before, 1e-6);
    }

    #[test]
    fn equal_masses_exchange_velocities_head_on() {
        let mut a = inert(Vec3::ZERO, vec3(3.0, 0.0, 0.0), 2.0, 1.0);
        let mut b = inert(vec3(2.0, 0.0, 0.0), vec3(-1.0, 0.0, 0.0), 2.0, 1.0);
        resolve_collision(&mut a, &mut b, &ArenaConfig::default());
        assert_vec3_close(a.core().velocity, vec3(-1.0, 0.0, 0.0), 1e-9);
        assert_vec3_close(b.core().velocity, vec3(3.0, 0.0, 0.0), 1e-9);
    }

    #[test]
    fn projectile_hit_damages_and_self_destructs() {
        let config = ArenaConfig::default();
        let mut robot =
            Body::Robot(FighterRobot::new(1, 1, Vec3::ZERO, Vec3::ZERO, Vec3::Z, &config));
        let mut shell = Body::Projectile(FlyingProjectile::new(
            2,
            9,
            vec3(6.0, 0.0, 0.0),
            vec3(-300.0, 0.0, 0.0),
            &config,
        ));
        resolve_collision(&mut shell, &mut robot, &ArenaConfig::default());
        assert!(!shell.is_active());
        let damage = config.projectile_mass * config.projectile_energy_density;
        let expected = config.robot_life - damage;
        assert_eq!(robot.core().life, expected);
        assert!(robot.is_active());
    }

    #[test]
    fn ramming_robots_both_take_damage() {
        let mut config = ArenaConfig::default();
        config.gravity_constant = 1e-30;
        let mut world = World::new(config, 8);
        let a = world.add_object(robot_body(1, vec3(0.0, 0.0, 2000.0), vec3(30.0, 0.0, 0.0)));
        let b = world.add_object(robot_body(2, vec3(11.0, 0.0, 2000.0), vec3(-30.0, 0.0, 0.0)));
        let report = world.short_loop(DT);
        assert_eq!(report.collisions, 1);

        // Each robot's share of the relative momentum is 30 m/s of its own mass.
        let expected = config.robot_life - 0.5 * config.robot_mass * 30.0 * 30.0;
        for id in [a, b] {
            let robot = world.body(id).unwrap().core();
            assert!((robot.life - expected).abs() < 1e-6, "life {}", robot.life);
            assert!(robot.active);
        }
        assert!(world.body(a).unwrap().core().velocity.x < 0.0);
    }

    #[test]
    fn gentle_robot_contact_is_harmless() {
        let config = ArenaConfig::default();
        let mut a = robot_body(1, Vec3::ZERO, vec3(2.0, 0.0, 0.0));
        let mut b = robot_body(2, vec3(10.0, 0.0, 0.0), Vec3::ZERO);
        resolve_collision(&mut a, &mut b, &config);
        assert_eq!(a.core().life, config.robot_life);
        assert_eq!(b.core().life, config.robot_life);
    }

    #[test]
    fn reference_body_stays_anchored_after_contact() {
        let mut world = test_world();
        world.add_object(inert(vec3(0.0, 0.0, 1000.5), vec3(0.0, 0.0, -3.0), 10.0, 1.0));
        world.add_object(inert(vec3(1000.5, 0.0, 0.0), vec3(-50.0, 0.0, 0.0), 10.0, 1.0));
        world.short_loop(DT);
        assert_eq!(world.reference().velocity, Vec3::ZERO);
        assert_eq!(world.reference().position, Vec3::ZERO);
    }

    #[test]
    fn degenerate_masses_are_skipped() {
        let mut a = inert(Vec3::ZERO, vec3(1.0, 0.0, 0.0), 0.0, 1.0);
        let mut b = inert(Vec3::X, vec3(-1.0, 0.0, 0.0), 0.0, 1.0);
        assert!(!resolve_collision(&mut a, &mut b, &ArenaConfig::default()));
        assert_eq!(a.core().velocity, vec3(1.0, 0.0, 0.0));
    }

    // --- world lifecycle ---

    #[test]
    fn add_robot_alternates_start_points() {
        let mut world = test_world();
        let a = world.add_robot(1).unwrap();
        let b = world.add_robot(2).unwrap();
        let pa = world.body(a).unwrap().core().position;
        let pb = world.body(b).unwrap().core().position;
        assert!(pa.z > 0.0);
        assert!(pb.z < 0.0);
        assert_vec3_close(pa, -pb, 1e-9);
        let va = world.body(a).unwrap().core().velocity;
        let vb = world.body(b).unwrap().core().velocity;
        assert_vec3_close(va, -vb, 1e-9);
        let forward = world.robot(2).unwrap().vehicle().forward();
        assert!(forward.scalar_product(vb) > 0.0);
    }

    #[test]
    fn add_robot_rejects_duplicates_and_full_arena() {
        let mut world = World::new(ArenaConfig::default(), 2);
        world.add_robot(1).unwrap();
        assert!(world.add_robot(1).is_err());
        world.add_robot(2).unwrap();
        let err = world.add_robot(3).unwrap_err();
        assert!(err.contains("full"));
    }

    #[test]
    fn ids_are_unique_and_ordered() {
        let mut world = test_world();
        let a = world.add_robot(1).unwrap();
        let b = world.add_object(inert(vec3(0.0, 2000.0, 0.0), Vec3::ZERO, 1.0, 1.0));
        let c = world.add_robot(2).unwrap();
        assert!(REFERENCE_BODY_ID < a && a < b && b < c);
        let ids: Vec<BodyId> = world.bodies_except(b).map(|body| body.id()).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn short_loop_advances_clock_and_applies_gravity() {
        let mut world = test_world();
        let id = world.add_object(inert(vec3(0.0, 0.0, 2000.0), Vec3::ZERO, 1.0, 1.0));
        world.short_loop(DT);
        assert!((world.seconds() - DT).abs() < 1e-12);
        assert_eq!(world.tick_count(), 1);
        let body = world.body(id).unwrap().core();
        assert!(body.velocity.z < 0.0);
        assert!(body.position.z < 2000.0);
    }

    #[test]
    fn out_of_bounds_body_is_pruned() {
        let mut world = test_world();
        let bound = world.config().play_volume_radius;
        let id = world.add_object(inert(vec3(bound + 1.0, 0.0, 0.0), Vec3::ZERO, 1.0, 1.0));
        let keep = world.add_object(inert(vec3(0.0, 0.0, 2000.0), Vec3::ZERO, 1.0, 1.0));
        let report = world.short_loop(DT);
        assert_eq!(report.removed, vec![id]);
        assert!(world.body(id).is_none());
        assert!(world.body(keep).is_some());
    }

    #[test]
    fn dead_robot_eliminates_its_player() {
        let mut world = test_world();
        world.add_robot(1).unwrap();
        let bound = world.config().play_volume_radius;
        let index = world.index_of(world.players.get(&1).unwrap().robot).unwrap();
        world.bodies[index].core_mut().position = vec3(0.0, bound * 2.0, 0.0);
        let report = world.short_loop(DT);
        assert_eq!(report.eliminated, vec![1]);
        assert!(world.robot(1).is_none());
        assert!(world.view_update(1).is_empty());
    }

    #[test]
    fn robots_fall_and_settle_on_the_planet() {
        let mut world = test_world();
        world.add_robot(1).unwrap();
        for _ in 0..(30 * 60) {
            world.short_loop(DT);
        }
        let robot = world.robot(1).expect("robot survives landing");
        // Hard first impact, then resting on the surface.
        assert!(robot.body.life < world.config().robot_life);
        assert!(robot.body.separation(world.reference()).abs() < 0.1);
        let radial = robot.body.position.unit().unwrap();
        assert!(robot.body.velocity.scalar_product(radial).abs() < world.config().rest_speed);
    }

    #[test]
    fn world_collision_conserves_momentum_far_from_gravity_effects() {
        let mut config = ArenaConfig::default();
        config.gravity_constant = 1e-30;
        let mut world = World::new(config, 8);
        let a = world.add_object(inert(vec3(0.0, 0.0, 2000.0), vec3(30.0, 0.0, 0.0), 4.0, 1.0));
        let b = world.add_object(inert(vec3(2.5, 0.0, 2000.0), vec3(-10.0, 0.0, 0.0), 6.0, 1.0));
        let momentum = |w: &World| {
            w.body(a).unwrap().core().momentum() + w.body(b).unwrap().core().momentum()
        };
        let before = momentum(&world);
        let report = world.short_loop(DT);
        assert_eq!(report.collisions, 1);
        assert_vec3_close(momentum(&world), before, 1e-9);
        assert!(world.body(a).unwrap().core().velocity.x < 0.0);
    }

    // --- controls ---

    #[test]
    fn shooting_twice_within_cooldown_fires_once() {
        let mut world = test_world();
        world.add_robot(1).unwrap();
        let first = world.control(1, Control::Shoot, 0.0).unwrap();
        let second = world.control(1, Control::Shoot, 0.0).unwrap();
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(world.stats().projectiles, 1);
        assert_eq!(world.robot(1).unwrap().ammo(), world.config().robot_ammo - 1);
    }

    #[test]
    fn shooting_resumes_after_cooldown() {
        let mut world = test_world();
        world.add_robot(1).unwrap();
        assert!(world.control(1, Control::Shoot, 0.0).unwrap().is_some());
        let ticks = (world.config().shoot_cooldown / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            world.short_loop(DT);
        }
        assert!(world.control(1, Control::Shoot, 0.0).unwrap().is_some());
    }

    #[test]
    fn empty_ammo_fires_nothing() {
        let mut config = ArenaConfig::default();
        config.robot_ammo = 0;
        let mut world = World::new(config, 8);
        world.add_robot(1).unwrap();
        assert_eq!(world.control(1, Control::Shoot, 0.0), Ok(None));
        assert_eq!(world.stats().projectiles, 0);
    }

    #[test]
    fn invalid_controls_are_rejected_without_side_effects() {
        let mut world = test_world();
        world.add_robot(1).unwrap();
        let velocity = world.robot(1).unwrap().body.velocity;
        assert!(world.control(1, Control::Accelerate, f64::NAN).is_err());
        assert!(world.control(1, Control::Accelerate, -1.0).is_err());
        assert!(world.control(1, Control::Accelerate, 5.0).is_err());
        assert!(world.control(42, Control::Accelerate, 0.1).is_err());
        assert_eq!(world.robot(1).unwrap().body.velocity, velocity);
    }

    #[test]
    fn accelerate_control_changes_velocity() {
        let mut world = test_world();
        world.add_robot(1).unwrap();
        let before = world.robot(1).unwrap().body.velocity;
        world.control(1, Control::Accelerate, 0.5).unwrap();
        let after = world.robot(1).unwrap().body.velocity;
        assert!((after - before).length() > 0.0);
    }

    // --- snapshots ---

    #[test]
    fn unknown_player_gets_empty_updates() {
        let world = test_world();
        assert!(world.view_update(99).is_empty());
        assert!(world.cannon_update(99).is_empty());
        assert!(world.global_update(99).is_empty());
    }

    #[test]
    fn view_excludes_self_and_hidden_robots() {
        let mut world = test_world();
        let own = world.add_robot(1).unwrap();
        let other = world.add_robot(2).unwrap();
        let update = world.view_update(1);
        let ids: Vec<BodyId> = update.objects.iter().map(|o| o.id).collect();
        assert!(!ids.contains(&own));
        // The two start points are on opposite sides of the planet.
        assert!(!ids.contains(&other));
        assert!(ids.contains(&REFERENCE_BODY_ID));

        let global = world.global_update(1);
        let ids: Vec<BodyId> = global.objects.iter().map(|o| o.id).collect();
        assert!(ids.contains(&own) && ids.contains(&other));
        assert!(global.arrow.is_some());
    }

    #[test]
    fn remove_player_drops_robot() {
        let mut world = test_world();
        let id = world.add_robot(1).unwrap();
        assert!(world.remove_player(1));
        assert!(!world.remove_player(1));
        assert!(world.body(id).is_none());
        assert_eq!(world.stats().robots, 0);
    }
}
