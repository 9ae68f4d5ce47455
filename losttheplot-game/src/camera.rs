//! World-to-screen offset plus the transient shake applied while digging.
//! Smooth follow is left to the host; it moves the camera with
//! [`Camera::set_position`].
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Camera {
    x: f64,
    y: f64,
    shake_x: f64,
    shake_y: f64,
}

impl Camera {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            shake_x: 0.0,
            shake_y: 0.0,
        }
    }

    pub const fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Add a random offset of at most `amplitude / 2` on each axis.
    pub fn nudge<R: Rng + ?Sized>(&mut self, amplitude: f64, rng: &mut R) {
        self.shake_x += (rng.r#gen::<f64>() - 0.5) * amplitude;
        self.shake_y += (rng.r#gen::<f64>() - 0.5) * amplitude;
    }

    pub const fn settle(&mut self) {
        self.shake_x = 0.0;
        self.shake_y = 0.0;
    }

    #[must_use]
    pub fn is_shaking(&self) -> bool {
        self.shake_x != 0.0 || self.shake_y != 0.0
    }

    /// Current offset in whole pixels, shake included.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn offset(&self) -> Point {
        Point::new((self.x + self.shake_x) as i32, (self.y + self.shake_y) as i32)
    }

    /// Screen point to world point.
    #[must_use]
    pub fn to_world(&self, screen: Point) -> Point {
        screen + self.offset()
    }

    /// World point to screen point.
    #[must_use]
    pub fn to_screen(&self, world: Point) -> Point {
        world - self.offset()
    }
}
