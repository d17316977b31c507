//! Headless arena simulation
//!
//! The learning engine treats the arena as an external collaborator: it reads
//! positions, health, facing and attack readiness, issues one discrete action
//! per agent per tick, and lets the arena advance its physics. This module is
//! a deterministic stand-in for that collaborator. It keeps only the state
//! the engine consumes; sprites are replaced by fixed hit boxes.

pub mod archer;
pub mod bird;
pub mod protagonist;

use std::{fmt, str::FromStr};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

pub use archer::{Archer, ArcherAction, Arrow};
pub use bird::Bird;
pub use protagonist::Protagonist;

use crate::Error;

pub const SCREEN_WIDTH: f64 = 800.0;
pub const SCREEN_HEIGHT: f64 = 400.0;
/// Walking surface for the protagonist (bottom edge of its hit box).
pub const FLOOR_Y: f64 = SCREEN_HEIGHT - 50.0;
pub const GRAVITY: f64 = 0.8;

/// Axis-aligned hit box in screen coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box whose bottom edge is centred on `(x, bottom)`.
    pub fn from_midbottom(x: f64, bottom: f64, width: f64, height: f64) -> Self {
        Self::new(x - width / 2.0, bottom - height, width, height)
    }

    pub fn from_center(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn set_bottom(&mut self, bottom: f64) {
        self.y = bottom - self.height;
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Keep the whole box on screen.
    pub fn clamp_to_screen(&mut self) {
        self.x = self.x.clamp(0.0, SCREEN_WIDTH - self.width);
        self.y = self.y.clamp(0.0, SCREEN_HEIGHT - self.height);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heading {
    Left,
    Right,
}

impl Heading {
    pub fn sign(self) -> f64 {
        match self {
            Heading::Left => -1.0,
            Heading::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
        }
    }
}

/// Scripted behaviour of the protagonist the agents train against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtagonistKind {
    /// Walks back and forth across the arena, never attacks.
    #[default]
    Patrol,
    /// Chases the archer and attacks it in melee range.
    Hunter,
    /// Stands still.
    Stationary,
}

impl ProtagonistKind {
    const NAMES: &'static str = "patrol, hunter, stationary";
}

impl fmt::Display for ProtagonistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProtagonistKind::Patrol => "patrol",
            ProtagonistKind::Hunter => "hunter",
            ProtagonistKind::Stationary => "stationary",
        };
        f.write_str(name)
    }
}

impl FromStr for ProtagonistKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patrol" => Ok(ProtagonistKind::Patrol),
            "hunter" => Ok(ProtagonistKind::Hunter),
            "stationary" => Ok(ProtagonistKind::Stationary),
            other => Err(Error::ParseProtagonist {
                input: other.to_string(),
                expected: Self::NAMES.to_string(),
            }),
        }
    }
}

/// Combat events produced by one call to [`EnvironmentState::advance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// An arrow struck the protagonist.
    pub arrow_hit: bool,
    /// The strike left the protagonist at zero health.
    pub arrow_kill: bool,
}

/// The complete mutable arena, owned by whoever drives training.
#[derive(Debug, Clone)]
pub struct EnvironmentState {
    pub protagonist: Protagonist,
    pub archer: Archer,
    pub bird: Bird,
    kind: ProtagonistKind,
    events: TickEvents,
    tick: u64,
    rng: StdRng,
}

impl EnvironmentState {
    pub fn new(kind: ProtagonistKind, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            protagonist: Protagonist::spawn(kind),
            archer: Archer::spawn(),
            bird: Bird::spawn(),
            kind,
            events: TickEvents::default(),
            tick: 0,
            rng,
        }
    }

    pub fn protagonist_kind(&self) -> ProtagonistKind {
        self.kind
    }

    /// Restore every body to its starting state for a new episode.
    pub fn reset(&mut self) {
        self.protagonist = Protagonist::spawn(self.kind);
        self.archer.reset();
        self.bird.reset();
        self.events = TickEvents::default();
        self.tick = 0;
    }

    /// Events from the most recent [`advance`](Self::advance).
    pub fn events(&self) -> TickEvents {
        self.events
    }

    /// Ticks advanced since the last reset.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance physics, scripted behaviour and collisions by one tick.
    ///
    /// Agent commands for this tick must already have been applied.
    pub fn advance(&mut self) -> TickEvents {
        self.protagonist
            .update(&mut self.archer, &mut self.rng);
        self.archer.advance();

        let mut events = TickEvents::default();
        if let Some(index) = self
            .archer
            .arrows
            .iter()
            .position(|arrow| self.protagonist.alive && arrow.strikes(&self.protagonist.bounds))
        {
            let arrow = self.archer.arrows.remove(index);
            self.protagonist.take_damage(Arrow::DAMAGE, arrow.heading);
            events.arrow_hit = true;
            events.arrow_kill = !self.protagonist.alive;
        }

        self.events = events;
        self.tick += 1;
        events
    }
}
