use arena_shared::config::{DEATH_TIME_MS, SPAWN_MAX, SPAWN_MIN, WEAPON_DELAY_MS};
use arena_shared::random::random_int;
use arena_shared::vec2::{vec2, Vec2, MAX_RAD};
use rand::Rng;

use crate::laser::Laser;

/// Velocity added per thrust input
pub const THRUST_SPEED: f64 = 0.03;
pub const MAX_PLAYER_VELOCITY: f64 = 1.5;
/// Angle turned per rotate input (3 degrees)
pub const ROTATION_SPEED: f64 = MAX_RAD / 120.0;
/// Muzzle speed of a fresh laser, clamped on its first move
pub const LASER_SPEED: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    Left,
    Right,
}

/// A ship in the arena, keyed by its connection id.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub color: String,
    pub pos: Vec2,
    pub velocity: Vec2,
    /// Heading in radians, kept inside `(-MAX_RAD, MAX_RAD]`
    pub rotation: f64,
    pub score: u32,
    pub alive: bool,
    /// Absolute time (ms) after which a dead player may respawn
    pub respawn_deadline: Option<u64>,
    pub last_fired: Option<u64>,
    /// Seconds without input, advanced by the idle sweep
    pub idle_secs: u64,
    pub thrusting: bool,
}

impl Player {
    pub fn new(id: u32, name: String, pos: Vec2) -> Self {
        Self {
            id,
            name,
            color: color_hex(color_from_id(id)),
            pos,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            score: 0,
            alive: true,
            respawn_deadline: None,
            last_fired: None,
            idle_secs: 0,
            thrusting: false,
        }
    }

    /// Random point in the spawn square
    pub fn spawn_point(rng: &mut impl Rng) -> Vec2 {
        vec2(
            random_int(rng, SPAWN_MIN, SPAWN_MAX) as f64,
            random_int(rng, SPAWN_MIN, SPAWN_MAX) as f64,
        )
    }

    /// Accelerate along the current heading, capped at [`MAX_PLAYER_VELOCITY`].
    pub fn thrust(&mut self) {
        let mut push = vec2(THRUST_SPEED, 0.0);
        push.rotate(self.rotation);
        self.velocity.add(push).clamp_length(MAX_PLAYER_VELOCITY);
        self.thrusting = true;
    }

    /// Halt and take the client's reported position as-is. An axis the
    /// client left out keeps its current value.
    pub fn stop_thrust(&mut self, x: Option<f64>, y: Option<f64>) {
        self.thrusting = false;
        self.velocity = Vec2::ZERO;
        self.pos = vec2(x.unwrap_or(self.pos.x), y.unwrap_or(self.pos.y));
    }

    pub fn update_position(&mut self) {
        if self.velocity.length() > 0.0 {
            self.pos.add(self.velocity);
        }
    }

    pub fn rotate(&mut self, direction: RotateDirection) {
        match direction {
            RotateDirection::Left => self.rotation -= ROTATION_SPEED,
            RotateDirection::Right => self.rotation += ROTATION_SPEED,
        }
        self.normalize_rotation();
    }

    // One step can overshoot by at most ROTATION_SPEED, so a single wrap is enough.
    fn normalize_rotation(&mut self) {
        if self.rotation > MAX_RAD {
            self.rotation -= MAX_RAD;
        } else if self.rotation < -MAX_RAD {
            self.rotation += MAX_RAD;
        } else if self.rotation == MAX_RAD || self.rotation == -MAX_RAD {
            self.rotation = 0.0;
        }
    }

    /// Fire a laser if the weapon has cooled down. The laser id is assigned
    /// by the world when it is registered.
    pub fn fire(&mut self, now: u64) -> Option<Laser> {
        if let Some(last) = self.last_fired {
            if now.saturating_sub(last) <= WEAPON_DELAY_MS {
                return None;
            }
        }
        let mut velocity = vec2(LASER_SPEED, 0.0);
        velocity.rotate(self.rotation);
        self.last_fired = Some(now);
        Some(Laser::new(self.id, self.rotation, self.pos, velocity))
    }

    pub fn kill(&mut self, now: u64) {
        self.thrusting = false;
        self.alive = false;
        self.velocity = Vec2::ZERO;
        self.respawn_deadline = Some(now + DEATH_TIME_MS);
    }

    /// Bring a dead player back once the deadline has passed.
    /// Returns true on the transition to alive.
    pub fn check_respawn(&mut self, now: u64, rng: &mut impl Rng) -> bool {
        if self.alive {
            return false;
        }
        if let Some(deadline) = self.respawn_deadline {
            if now < deadline {
                return false;
            }
        }
        self.alive = true;
        self.velocity = Vec2::ZERO;
        self.pos = Self::spawn_point(rng);
        self.respawn_deadline = None;
        true
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Any client input counts as activity.
    pub fn mark_active(&mut self) {
        self.idle_secs = 0;
    }
}

/// Generate a color from player ID using golden angle hue distribution.
pub fn color_from_id(id: u32) -> u32 {
    let hue = id.wrapping_mul(137) % 360;
    hsv_to_rgb(hue as f64, 0.55, 0.95)
}

/// Format a packed RGB value as a CSS hex color.
pub fn color_hex(rgb: u32) -> String {
    format!("#{:06x}", rgb & 0xFF_FFFF)
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> u32 {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    let ri = ((r + m) * 255.0).round() as u32;
    let gi = ((g + m) * 255.0).round() as u32;
    let bi = ((b + m) * 255.0).round() as u32;

    (ri << 16) | (gi << 8) | bi
}
