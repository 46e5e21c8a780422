use arena_shared::vec2::Vec2;

pub const MAX_LASER_VELOCITY: f64 = 5.0;
/// Distance a laser travels before it fizzles out
pub const LASER_RANGE: f64 = 300.0;

/// Projectile fired by a player.
#[derive(Debug, Clone)]
pub struct Laser {
    /// Assigned by the world on registration
    pub id: u32,
    pub owner_id: u32,
    /// Heading of the owner at fire time
    pub rotation: f64,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub remaining: f64,
    pub alive: bool,
}

impl Laser {
    pub fn new(owner_id: u32, rotation: f64, pos: Vec2, velocity: Vec2) -> Self {
        Self {
            id: 0,
            owner_id,
            rotation,
            pos,
            velocity,
            remaining: LASER_RANGE,
            alive: true,
        }
    }

    /// Advance one tick. A laser whose range is already spent dies here
    /// instead of moving, so removal lags exhaustion by one tick.
    pub fn step(&mut self) {
        if self.remaining > 0.0 {
            self.velocity.clamp_length(MAX_LASER_VELOCITY);
            self.pos.add(self.velocity);
            self.remaining -= self.velocity.length();
        } else {
            self.alive = false;
        }
    }
}
