//! The scripted protagonist the agents train against

use rand::{Rng, rngs::StdRng};

use super::{Archer, Bounds, FLOOR_Y, GRAVITY, Heading, ProtagonistKind, SCREEN_WIDTH};

#[derive(Debug, Clone, PartialEq)]
pub struct Protagonist {
    pub bounds: Bounds,
    pub health: i32,
    pub alive: bool,
    pub heading: Heading,
    kind: ProtagonistKind,
    vel_y: f64,
    attacking: bool,
    attack_timer: u32,
    attack_cooldown: u32,
    hit_timer: u32,
    knockback_speed: f64,
    patrol_heading: Heading,
    decision_cooldown: u32,
    attack_idle_time: u32,
    has_hit: bool,
}

impl Protagonist {
    pub const MAX_HEALTH: i32 = 100;
    pub const WIDTH: f64 = 40.0;
    pub const HEIGHT: f64 = 74.0;
    pub const SPAWN_X: f64 = 250.0;
    const PATROL_SPEED: f64 = 3.0;
    const HUNT_SPEED: f64 = 5.0;
    const ATTACK_TICKS: u32 = 24;
    const ATTACK_COOLDOWN: u32 = 20;
    const ATTACK_IDLE: u32 = 30;
    const DECISION_COOLDOWN: u32 = 3;
    const ENGAGE_DISTANCE: f64 = 50.0;
    const ATTACK_CHANCE: f64 = 0.8;
    const MELEE_REACH: f64 = 50.0;
    const MELEE_DAMAGE: i32 = 5;
    const HIT_STUN: u32 = 30;
    const KNOCKBACK: f64 = 5.0;

    pub fn spawn(kind: ProtagonistKind) -> Self {
        Self {
            bounds: Bounds::from_midbottom(Self::SPAWN_X, FLOOR_Y, Self::WIDTH, Self::HEIGHT),
            health: Self::MAX_HEALTH,
            alive: true,
            heading: Heading::Right,
            kind,
            vel_y: 0.0,
            attacking: false,
            attack_timer: 0,
            attack_cooldown: 0,
            hit_timer: 0,
            knockback_speed: 0.0,
            patrol_heading: Heading::Right,
            decision_cooldown: 0,
            attack_idle_time: 0,
            has_hit: false,
        }
    }

    pub(crate) fn update(&mut self, archer: &mut Archer, rng: &mut StdRng) {
        if !self.alive {
            return;
        }

        self.vel_y += GRAVITY;
        self.bounds.y += self.vel_y;
        if self.bounds.bottom() > FLOOR_Y {
            self.bounds.set_bottom(FLOOR_Y);
            self.vel_y = 0.0;
        }

        if self.attack_cooldown > 0 {
            self.attack_cooldown -= 1;
        }
        if self.attacking {
            self.attack_timer += 1;
            if self.attack_timer >= Self::ATTACK_TICKS {
                self.attacking = false;
                self.attack_timer = 0;
            }
        }
        if self.hit_timer > 0 {
            self.hit_timer -= 1;
            self.bounds.x += self.knockback_speed;
            self.knockback_speed *= 0.9;
        }

        match self.kind {
            ProtagonistKind::Patrol => self.patrol(),
            ProtagonistKind::Hunter => self.hunt(archer, rng),
            ProtagonistKind::Stationary => {}
        }
    }

    fn can_act(&self) -> bool {
        self.alive && !self.attacking && self.hit_timer == 0
    }

    fn walk(&mut self, dx: f64) {
        if !self.can_act() {
            return;
        }
        self.bounds.x += dx;
        if dx != 0.0 {
            self.heading = if dx > 0.0 { Heading::Right } else { Heading::Left };
        }
    }

    fn patrol(&mut self) {
        self.walk(self.patrol_heading.sign() * Self::PATROL_SPEED);
        if self.bounds.x <= 0.0 {
            self.patrol_heading = Heading::Right;
        } else if self.bounds.right() >= SCREEN_WIDTH {
            self.patrol_heading = Heading::Left;
        }
    }

    fn hunt(&mut self, archer: &mut Archer, rng: &mut StdRng) {
        if self.attack_idle_time > 0 {
            self.attack_idle_time -= 1;
        } else if self.decision_cooldown > 0 {
            self.decision_cooldown -= 1;
        } else {
            let dx = archer.bounds.center_x() - self.bounds.center_x();
            let toward = if dx > 0.0 { 1.0 } else { -1.0 };
            if dx.abs() > Self::ENGAGE_DISTANCE {
                self.walk_clamped(toward * Self::HUNT_SPEED);
            } else if rng.random::<f64>() < Self::ATTACK_CHANCE {
                self.try_attack();
            } else {
                self.walk_clamped(-toward * Self::HUNT_SPEED);
            }
            self.decision_cooldown = Self::DECISION_COOLDOWN;
        }

        if self.attacking && !self.has_hit {
            let dx = (self.bounds.center_x() - archer.bounds.center_x()).abs();
            let dy = (self.bounds.center_y() - archer.bounds.center_y()).abs();
            let (close_x, close_y) = (dx < Self::MELEE_REACH, dy < Self::MELEE_REACH);
            if close_x && close_y {
                archer.take_damage(Self::MELEE_DAMAGE);
                self.has_hit = true;
            }
        }
        if !self.attacking {
            self.has_hit = false;
        }
    }

    fn walk_clamped(&mut self, dx: f64) {
        self.walk(dx);
        self.bounds.x = self.bounds.x.clamp(0.0, SCREEN_WIDTH - self.bounds.width);
    }

    fn try_attack(&mut self) -> bool {
        if self.can_act() && self.attack_cooldown == 0 {
            self.attacking = true;
            self.attack_timer = 0;
            self.attack_cooldown = Self::ATTACK_COOLDOWN;
            self.attack_idle_time = Self::ATTACK_IDLE;
            self.has_hit = false;
            true
        } else {
            false
        }
    }

    pub(crate) fn take_damage(&mut self, amount: i32, from: Heading) {
        if !self.alive {
            return;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.health = 0;
            self.alive = false;
        } else {
            self.hit_timer = Self::HIT_STUN;
            self.knockback_speed = from.sign() * Self::KNOCKBACK;
            self.attacking = false;
            self.attack_cooldown = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_patrol_turns_at_border() {
        let mut archer = Archer::spawn();
        let mut rng = StdRng::seed_from_u64(0);
        let mut protagonist = Protagonist::spawn(ProtagonistKind::Patrol);
        let mut turned = false;
        for _ in 0..400 {
            protagonist.update(&mut archer, &mut rng);
            turned |= protagonist.heading == Heading::Left;
        }
        assert!(turned);
        assert!(protagonist.bounds.right() <= SCREEN_WIDTH + Protagonist::PATROL_SPEED);
    }

    #[test]
    fn test_stationary_does_not_move() {
        let mut archer = Archer::spawn();
        let mut rng = StdRng::seed_from_u64(0);
        let mut protagonist = Protagonist::spawn(ProtagonistKind::Stationary);
        let start = protagonist.bounds;
        for _ in 0..30 {
            protagonist.update(&mut archer, &mut rng);
        }
        assert_eq!(protagonist.bounds, start);
    }

    #[test]
    fn test_hunter_damages_archer() {
        let mut archer = Archer::spawn();
        let mut rng = StdRng::seed_from_u64(9);
        let mut protagonist = Protagonist::spawn(ProtagonistKind::Hunter);
        for _ in 0..600 {
            protagonist.update(&mut archer, &mut rng);
            archer.advance();
        }
        assert!(archer.health < Archer::MAX_HEALTH);
    }

    #[test]
    fn test_lethal_damage_clamps_to_zero() {
        let mut protagonist = Protagonist::spawn(ProtagonistKind::Stationary);
        protagonist.take_damage(250, Heading::Left);
        assert_eq!(protagonist.health, 0);
        assert!(!protagonist.alive);
    }
}
