/// Physical constants of one arena.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(rename_all = "camelCase")]
pub struct ArenaConfig {
    /// Gravitational constant (m³ kg⁻¹ s⁻²)
    pub gravity_constant: f64,
    /// Mass of the reference (planetary) body (kg)
    pub planet_mass: f64,
    /// Radius of the reference body (m)
    pub planet_radius: f64,
    /// Bodies farther than this from the origin leave the play volume (m)
    pub play_volume_radius: f64,
    /// Extra distance added to radii when testing for overlap (m)
    pub collision_margin: f64,

    pub robot_mass: f64,
    pub robot_radius: f64,
    /// Starting life of a robot (J)
    pub robot_life: f64,
    pub robot_ammo: u32,
    /// Altitude of the spawn points above the surface (m)
    pub spawn_altitude: f64,
    /// Tangential speed given to freshly spawned robots (m/s)
    pub spawn_speed: f64,

    /// Thrust acceleration (m/s²)
    pub acceleration: f64,
    /// Braking deceleration (m/s²)
    pub braking: f64,
    /// Hull turn rate (rad/s)
    pub turn_rate: f64,
    /// Turret turn rate (rad/s)
    pub point_rate: f64,

    /// Closing speed below which surface contact is resting, not an impact (m/s)
    pub rest_speed: f64,
    /// Closing speed above which surface impacts deal damage (m/s)
    pub harm_speed: f64,
    /// Normal velocity rebound factor, in (0, 2). 2 would be a perfectly elastic bounce.
    pub rebound_damping: f64,
    /// Tangential speed lost per unit of normal impact speed
    pub surface_friction: f64,

    pub projectile_mass: f64,
    pub projectile_radius: f64,
    /// Muzzle speed relative to the firing robot (m/s)
    pub projectile_speed: f64,
    /// Damage per kilogram of projectile (J/kg)
    pub projectile_energy_density: f64,
    /// Seconds between two shots of the same robot
    pub shoot_cooldown: f64,

    /// Half-angle of the turret's line-of-sight cone (rad)
    pub cannon_view_half_angle: f64,
    /// Distance of the aim marker in front of the turret (m)
    pub aim_distance: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            gravity_constant: 6.674e-11,
            planet_mass: 1.47e17,         // ~9.8 m/s² at the surface
            planet_radius: 1000.0,
            play_volume_radius: 5000.0,
            collision_margin: 0.1,
            robot_mass: 1000.0,
            robot_radius: 5.0,
            robot_life: 1.0e6,
            robot_ammo: 100,
            spawn_altitude: 50.0,
            spawn_speed: 20.0,
            acceleration: 20.0,
            braking: 20.0,
            turn_rate: 1.0,
            point_rate: 1.0,
            rest_speed: 1.0,
            harm_speed: 10.0,
            rebound_damping: 1.5,
            surface_friction: 0.3,
            projectile_mass: 1.0,
            projectile_radius: 0.5,
            projectile_speed: 300.0,
            projectile_energy_density: 1.0e5,
            shoot_cooldown: 0.25,
            cannon_view_half_angle: 0.35, // ~20 degrees
            aim_distance: 500.0,
        }
    }
}

fn positive(value: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("{} must be finite and > 0", name));
    }
    Ok(())
}

fn non_negative(value: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} must be finite and >= 0", name));
    }
    Ok(())
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<(), String> {
        positive(self.gravity_constant, "gravity_constant")?;
        positive(self.planet_mass, "planet_mass")?;
        positive(self.planet_radius, "planet_radius")?;
        positive(self.robot_mass, "robot_mass")?;
        positive(self.robot_radius, "robot_radius")?;
        positive(self.robot_life, "robot_life")?;
        positive(self.projectile_mass, "projectile_mass")?;
        positive(self.projectile_radius, "projectile_radius")?;
        non_negative(self.collision_margin, "collision_margin")?;
        non_negative(self.spawn_altitude, "spawn_altitude")?;
        non_negative(self.spawn_speed, "spawn_speed")?;
        non_negative(self.acceleration, "acceleration")?;
        non_negative(self.braking, "braking")?;
        non_negative(self.turn_rate, "turn_rate")?;
        non_negative(self.point_rate, "point_rate")?;
        non_negative(self.rest_speed, "rest_speed")?;
        non_negative(self.harm_speed, "harm_speed")?;
        non_negative(self.surface_friction, "surface_friction")?;
        non_negative(self.projectile_speed, "projectile_speed")?;
        non_negative(self.projectile_energy_density, "projectile_energy_density")?;
        non_negative(self.shoot_cooldown, "shoot_cooldown")?;
        non_negative(self.aim_distance, "aim_distance")?;
        if !self.rebound_damping.is_finite()
            || self.rebound_damping <= 0.0
            || self.rebound_damping >= 2.0
        {
            return Err("rebound_damping must be in (0, 2)".to_string());
        }
        if !self.cannon_view_half_angle.is_finite()
            || self.cannon_view_half_angle <= 0.0
            || self.cannon_view_half_angle > std::f64::consts::PI
        {
            return Err("cannon_view_half_angle must be in (0, PI]".to_string());
        }
        let spawn_radius = self.planet_radius + self.spawn_altitude + self.robot_radius;
        if !self.play_volume_radius.is_finite() || self.play_volume_radius <= spawn_radius {
            return Err("play_volume_radius must enclose the spawn points".to_string());
        }
        if self.projectile_mass >= self.robot_mass {
            return Err("projectile_mass must be smaller than robot_mass".to_string());
        }
        Ok(())
    }

    /// Gravitational acceleration at the reference body's surface (m/s²).
    pub fn surface_gravity(&self) -> f64 {
        self.gravity_constant * self.planet_mass / (self.planet_radius * self.planet_radius)
    }
}
