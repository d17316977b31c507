//! The support flyer's body

use super::{Bounds, Heading, SCREEN_HEIGHT};
use crate::actions::FlyerAction;

#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub bounds: Bounds,
    pub heading: Heading,
}

impl Bird {
    pub const SIZE: f64 = 24.0;
    pub const SPEED: f64 = 2.0;
    pub const SPAWN: (f64, f64) = (400.0, SCREEN_HEIGHT - 100.0);

    pub fn spawn() -> Self {
        Self {
            bounds: Bounds::from_center(Self::SPAWN.0, Self::SPAWN.1, Self::SIZE, Self::SIZE),
            heading: Heading::Right,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::spawn();
    }

    /// Fly one step; the bird never leaves the screen.
    pub fn apply(&mut self, action: FlyerAction) {
        let (ux, uy) = action.direction();
        if ux > 0.0 {
            self.heading = Heading::Right;
        } else if ux < 0.0 {
            self.heading = Heading::Left;
        }
        self.bounds.x += ux * Self::SPEED;
        self.bounds.y += uy * Self::SPEED;
        self.bounds.clamp_to_screen();
    }
}
