/// 2D vector utilities for the arena plane.
/// Operations mutate in place and return `&mut Self` so calls can be chained.

/// Full turn in radians. Rotations are normalized against this value.
pub const MAX_RAD: f64 = std::f64::consts::PI * 2.0;

#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

/// Shorthand constructor
pub fn vec2(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Normalize to unit length. A zero vector stays zero.
    pub fn normalize(&mut self) -> &mut Self {
        let len = self.length();
        if len == 0.0 {
            self.x = 0.0;
            self.y = 0.0;
        } else {
            self.x /= len;
            self.y /= len;
        }
        self
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add(&mut self, other: Vec2) -> &mut Self {
        self.x += other.x;
        self.y += other.y;
        self
    }

    #[allow(clippy::should_implement_trait)]
    pub fn sub(&mut self, other: Vec2) -> &mut Self {
        self.x -= other.x;
        self.y -= other.y;
        self
    }

    pub fn dot(&self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Uniform scale
    pub fn scale(&mut self, s: f64) -> &mut Self {
        self.x *= s;
        self.y *= s;
        self
    }

    /// Component-wise scale
    pub fn scale_xy(&mut self, factors: Vec2) -> &mut Self {
        self.x *= factors.x;
        self.y *= factors.y;
        self
    }

    pub fn invert(&mut self) -> &mut Self {
        self.x = -self.x;
        self.y = -self.y;
        self
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Heading angle of the vector, `atan2(y, x)`.
    pub fn theta(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Unsigned angle between two vectors: arccos of the dot product of both
    /// normalized copies. Always in `[0, PI]`.
    pub fn theta_to(&self, other: Vec2) -> f64 {
        let mut v = *self;
        let mut w = other;
        v.normalize();
        w.normalize();
        v.dot(w).clamp(-1.0, 1.0).acos()
    }

    /// Signed heading difference `other.theta() - self.theta()`. Not wrapped,
    /// so the result lies in `(-2*PI, 2*PI)`.
    pub fn theta_to_heading(&self, other: Vec2) -> f64 {
        other.theta() - self.theta()
    }

    /// Rotate in place by `angle` radians (counter-clockwise in a y-up frame).
    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        let (sa, ca) = angle.sin_cos();
        let rx = self.x * ca - self.y * sa;
        let ry = self.x * sa + self.y * ca;
        self.x = rx;
        self.y = ry;
        self
    }

    /// Scale down uniformly so the length does not exceed `max`.
    /// Direction is preserved.
    pub fn clamp_length(&mut self, max: f64) -> &mut Self {
        let len = self.length();
        if len > max {
            self.scale(max / len);
        }
        self
    }
}
