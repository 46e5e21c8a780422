/// Collision radius of every player ship
pub const PLAYER_RADIUS: f64 = 11.0;
/// Minimum gap between two shots of one player (ms)
pub const WEAPON_DELAY_MS: u64 = 400;
/// Time a dead player waits before respawning (ms)
pub const DEATH_TIME_MS: u64 = 4000;
/// Spawn square, inclusive on both ends
pub const SPAWN_MIN: i32 = 350;
pub const SPAWN_MAX: i32 = 850;

/// Axis-aligned static obstacle
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../client/generated/")]
pub struct Obstacle {
    pub x: f64,
    pub y: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Obstacle {
    pub const fn new(x: f64, y: f64, right: f64, bottom: f64) -> Self {
        Self {
            x,
            y,
            right,
            bottom,
        }
    }
}

/// Obstacles laid out to match the client level design.
pub const DEFAULT_OBSTACLES: [Obstacle; 4] = [
    Obstacle::new(200.0, 500.0, 300.0, 700.0),
    Obstacle::new(500.0, 200.0, 700.0, 300.0),
    Obstacle::new(900.0, 500.0, 1000.0, 700.0),
    Obstacle::new(500.0, 900.0, 700.0, 1000.0),
];

/// World constants every client must agree with.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../client/generated/")]
#[serde(rename_all = "camelCase")]
pub struct WorldConfig {
    pub world_width: f64,
    pub world_height: f64,
    /// Ticks between two snapshot broadcasts
    pub snapshot_every_ticks: u32,
    pub idle_check_secs: u64,
    /// Players idle for longer than this are disconnected
    pub idle_limit_secs: u64,
    pub obstacles: Vec<Obstacle>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_width: 1200.0,
            world_height: 1200.0,
            snapshot_every_ticks: 6,
            idle_check_secs: 10,
            idle_limit_secs: 120,
            obstacles: DEFAULT_OBSTACLES.to_vec(),
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.world_width.is_finite() || self.world_width <= 0.0 {
            return Err("world_width must be finite and > 0".to_string());
        }
        if !self.world_height.is_finite() || self.world_height <= 0.0 {
            return Err("world_height must be finite and > 0".to_string());
        }
        if self.snapshot_every_ticks == 0 {
            return Err("snapshot_every_ticks must be >= 1".to_string());
        }
        if self.idle_check_secs == 0 {
            return Err("idle_check_secs must be >= 1".to_string());
        }
        for (i, o) in self.obstacles.iter().enumerate() {
            if o.right < o.x || o.bottom < o.y {
                return Err(format!("obstacle {} has negative extent", i));
            }
        }
        Ok(())
    }

    /// Whether a position lies inside the world bounds (edges included).
    pub fn in_bounds(&self, x: f64, y: f64) -> bool {
        (0.0..=self.world_width).contains(&x) && (0.0..=self.world_height).contains(&y)
    }
}
