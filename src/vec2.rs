use serde::{Deserialize, Serialize};

/// Mutable 2D vector. The mutating operations return `&mut Self` so they chain:
/// `dir.sub(me).normalize().scale(RADAR_RADIUS)`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: Vec2) -> f64 {
        let mut d = *self;
        d.sub(other).length()
    }

    pub fn set(&mut self, x: f64, y: f64) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn copy_from(&mut self, other: Vec2) -> &mut Self {
        self.set(other.x, other.y)
    }

    pub fn add(&mut self, other: Vec2) -> &mut Self {
        self.x += other.x;
        self.y += other.y;
        self
    }

    pub fn sub(&mut self, other: Vec2) -> &mut Self {
        self.x -= other.x;
        self.y -= other.y;
        self
    }

    pub fn scale(&mut self, factor: f64) -> &mut Self {
        self.x *= factor;
        self.y *= factor;
        self
    }

    /// Scales to unit length. The zero vector becomes (1, 0).
    pub fn normalize(&mut self) -> &mut Self {
        let len = self.length();
        if len == 0.0 {
            self.set(1.0, 0.0)
        } else {
            self.scale(1.0 / len)
        }
    }

    pub fn rotate(&mut self, radians: f64) -> &mut Self {
        let (sin, cos) = radians.sin_cos();
        let (x, y) = (self.x, self.y);
        self.x = x * cos - y * sin;
        self.y = y * cos + x * sin;
        self
    }
}
