use arena_shared::config::ArenaConfig;

/// Server configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub tick_rate_hz: u32,
    /// How often a global snapshot is broadcast
    pub broadcast_rate_hz: u32,
    pub max_players: usize,
    pub arena: ArenaConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 30,
            broadcast_rate_hz: 10,
            max_players: 16,
            arena: ArenaConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate_hz == 0 {
            return Err("tick_rate_hz must be > 0".to_string());
        }
        if self.broadcast_rate_hz == 0 || self.broadcast_rate_hz > self.tick_rate_hz {
            return Err(format!(
                "broadcast_rate_hz must be in 1..={}, got {}",
                self.tick_rate_hz, self.broadcast_rate_hz
            ));
        }
        if self.max_players == 0 {
            return Err("max_players must be > 0".to_string());
        }
        self.arena.validate()
    }

    /// Fixed simulation step (s)
    pub fn tick_seconds(&self) -> f64 {
        1.0 / self.tick_rate_hz as f64
    }

    pub fn broadcast_every_n_ticks(&self) -> u64 {
        (self.tick_rate_hz / self.broadcast_rate_hz).max(1) as u64
    }
}
