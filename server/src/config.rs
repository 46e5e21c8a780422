use arena_shared::config::WorldConfig;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Nominal simulation tick period in milliseconds
    pub tick_interval_ms: f64,
    pub rng_seed: u64,
    /// Page served for every plain HTTP GET
    pub index_path: PathBuf,
    pub world: WorldConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            tick_interval_ms: 16.6,
            rng_seed: 42,
            index_path: PathBuf::from("index.html"),
            world: WorldConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults, overridden by `ARENA_LISTEN_ADDR`, `ARENA_INDEX_PATH` and
    /// `ARENA_RNG_SEED` when set.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("ARENA_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Ok(path) = std::env::var("ARENA_INDEX_PATH") {
            config.index_path = PathBuf::from(path);
        }
        if let Ok(seed) = std::env::var("ARENA_RNG_SEED") {
            config.rng_seed = seed
                .parse()
                .map_err(|e| format!("ARENA_RNG_SEED is not a u64: {}", e))?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.is_empty() {
            return Err("listen_addr must not be empty".to_string());
        }
        if !self.tick_interval_ms.is_finite() || self.tick_interval_ms <= 0.0 {
            return Err("tick_interval_ms must be finite and > 0".to_string());
        }
        self.world.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_tick_interval_invalid() {
        let config = ServerConfig {
            tick_interval_ms: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_world_is_reported() {
        let mut config = ServerConfig::default();
        config.world.snapshot_every_ticks = 0;
        assert!(config.validate().is_err());
    }
}
