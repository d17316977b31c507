//! The ranged agent's body and its arrows

use super::{Bounds, FLOOR_Y, GRAVITY, Heading, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::{actions::RangedAction, labels::labels};

labels! {
    /// Current discrete action of the archer, as seen by the encoder.
    pub enum ArcherAction {
        Idle => "idle",
        Run => "run",
        Death => "death",
        Attack => "attack",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub bounds: Bounds,
    pub heading: Heading,
    vel_y: f64,
    stopped: bool,
}

impl Arrow {
    pub const DAMAGE: i32 = 5;
    const SPEED: f64 = 6.0;
    const WIDTH: f64 = 24.0;
    const HEIGHT: f64 = 6.0;
    /// Arrows come to rest slightly above the floor line.
    const GROUND: f64 = SCREEN_HEIGHT - 60.0;

    pub fn new(cx: f64, cy: f64, heading: Heading) -> Self {
        Self {
            bounds: Bounds::from_center(cx, cy, Self::WIDTH, Self::HEIGHT),
            heading,
            vel_y: 0.0,
            stopped: false,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn update(&mut self) {
        if self.stopped {
            return;
        }
        self.vel_y += GRAVITY * 0.05;
        self.bounds.x += Self::SPEED * self.heading.sign();
        self.bounds.y += self.vel_y;
        if self.bounds.bottom() >= Self::GROUND {
            self.bounds.set_bottom(Self::GROUND);
            self.stopped = true;
        }
    }

    fn off_screen(&self) -> bool {
        self.bounds.right() < 0.0 || self.bounds.x > SCREEN_WIDTH
    }

    /// In-flight arrows damage whatever they overlap.
    pub(crate) fn strikes(&self, target: &Bounds) -> bool {
        !self.stopped && self.bounds.intersects(target)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Archer {
    pub bounds: Bounds,
    pub health: i32,
    pub alive: bool,
    pub heading: Heading,
    pub action: ArcherAction,
    pub attack_cooldown: u32,
    /// Set for exactly the tick in which an attack begins.
    pub attack_started: bool,
    pub arrows: Vec<Arrow>,
    attacking: bool,
    attack_frame: u32,
    invulnerable_timer: u32,
}

impl Archer {
    pub const MAX_HEALTH: i32 = 50;
    pub const WIDTH: f64 = 48.0;
    pub const HEIGHT: f64 = 64.0;
    pub const SPAWN_X: f64 = 500.0;
    /// The archer's feet sit below the protagonist's floor line.
    const VERTICAL_OFFSET: f64 = 24.0;
    const SPEED: f64 = 5.0;
    pub const ATTACK_COOLDOWN: u32 = 180;
    /// Ticks between drawing the bow and releasing the arrow.
    pub const ATTACK_FRAMES: u32 = 8;
    const INVULNERABLE_TICKS: u32 = 60;

    pub fn spawn() -> Self {
        let mut bounds = Bounds::new(Self::SPAWN_X, 0.0, Self::WIDTH, Self::HEIGHT);
        bounds.set_bottom(FLOOR_Y + Self::VERTICAL_OFFSET);
        Self {
            bounds,
            health: Self::MAX_HEALTH,
            alive: true,
            heading: Heading::Right,
            action: ArcherAction::Idle,
            attack_cooldown: 0,
            attack_started: false,
            arrows: Vec::new(),
            attacking: false,
            attack_frame: 0,
            invulnerable_timer: 0,
        }
    }

    /// Respawn at the start position; the heading is kept.
    pub fn reset(&mut self) {
        let heading = self.heading;
        *self = Self::spawn();
        self.heading = heading;
    }

    /// Execute one agent command.
    pub fn apply(&mut self, action: RangedAction) {
        self.attack_started = false;
        match action {
            RangedAction::MoveLeft => {
                self.heading = Heading::Left;
                self.walk();
            }
            RangedAction::MoveRight => {
                self.heading = Heading::Right;
                self.walk();
            }
            RangedAction::Shoot => {
                self.attack();
            }
            RangedAction::Idle => {}
        }
    }

    fn walk(&mut self) {
        if !self.alive || self.attacking {
            return;
        }
        let next_x = self.bounds.x + self.heading.sign() * Self::SPEED;
        if next_x > 0.0 && next_x < SCREEN_WIDTH - self.bounds.width {
            self.bounds.x = next_x;
        } else {
            self.heading = self.heading.flipped();
        }
        self.action = ArcherAction::Run;
    }

    fn attack(&mut self) -> bool {
        if self.attack_cooldown == 0 && self.alive && !self.attacking {
            self.attacking = true;
            self.attack_frame = 0;
            self.attack_cooldown = Self::ATTACK_COOLDOWN;
            self.action = ArcherAction::Attack;
            self.attack_started = true;
            true
        } else {
            false
        }
    }

    /// Timers, bow animation and arrow flight for one tick.
    pub(crate) fn advance(&mut self) {
        if self.attack_cooldown > 0 {
            self.attack_cooldown -= 1;
        }
        if self.invulnerable_timer > 0 {
            self.invulnerable_timer -= 1;
        }
        if self.attacking {
            self.attack_frame += 1;
            if self.attack_frame >= Self::ATTACK_FRAMES {
                self.attacking = false;
                self.attack_frame = 0;
                if self.alive {
                    self.action = ArcherAction::Idle;
                }
                self.release_arrow();
            }
        }
        for arrow in &mut self.arrows {
            arrow.update();
        }
        // Grounded arrows can no longer hit anything.
        self.arrows
            .retain(|arrow| !arrow.off_screen() && !arrow.is_stopped());
    }

    fn release_arrow(&mut self) {
        let sign = self.heading.sign();
        self.arrows.push(Arrow::new(
            self.bounds.center_x() + 50.0 * sign,
            self.bounds.center_y() - 10.0,
            self.heading,
        ));
    }

    pub(crate) fn take_damage(&mut self, amount: i32) {
        if !self.alive || self.invulnerable_timer > 0 {
            return;
        }
        self.health -= amount;
        self.action = ArcherAction::Idle;
        self.invulnerable_timer = Self::INVULNERABLE_TICKS;
        if self.health <= 0 {
            self.health = 0;
            self.alive = false;
            self.action = ArcherAction::Death;
        }
    }
}
