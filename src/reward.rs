//! Per-role reward shaping
//!
//! Reward models only read observations. Whatever memory they need between
//! ticks (previous health, the one-shot death latch) lives in the model and
//! is cleared by [`RewardModel::reset`] at episode start.

use serde::{Deserialize, Serialize};

use crate::{
    encoding::{FlyerObservation, RangedObservation, flyer::CLOSE_WINDOW},
    env::Archer,
};

/// Scalar reward for one tick.
pub trait RewardModel: Send {
    type Observation;

    fn reward(&mut self, observation: &Self::Observation) -> f64;

    /// Forget per-episode memory.
    fn reset(&mut self);
}

/// Reward magnitudes for the ranged role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangedRewardValues {
    pub damage_taken: f64,
    pub hit: f64,
    pub kill: f64,
    pub attack_started: f64,
    pub death: f64,
}

impl Default for RangedRewardValues {
    fn default() -> Self {
        Self {
            damage_taken: -20.0,
            hit: 30.0,
            kill: 100.0,
            attack_started: 2.0,
            death: -50.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RangedReward {
    values: RangedRewardValues,
    previous_health: i32,
    death_penalty_applied: bool,
}

impl RangedReward {
    pub fn new(values: RangedRewardValues) -> Self {
        Self {
            values,
            previous_health: Archer::MAX_HEALTH,
            death_penalty_applied: false,
        }
    }
}

impl Default for RangedReward {
    fn default() -> Self {
        Self::new(RangedRewardValues::default())
    }
}

impl RewardModel for RangedReward {
    type Observation = RangedObservation;

    fn reward(&mut self, obs: &RangedObservation) -> f64 {
        let mut reward = 0.0;
        if obs.health < self.previous_health {
            reward += self.values.damage_taken;
        }
        if obs.hit_landed {
            reward += self.values.hit;
        }
        if obs.killed {
            reward += self.values.kill;
        }
        if obs.attack_started {
            reward += self.values.attack_started;
        }
        if obs.health <= 0 && !self.death_penalty_applied {
            reward += self.values.death;
            self.death_penalty_applied = true;
        }
        self.previous_health = obs.health;
        reward
    }

    fn reset(&mut self) {
        self.previous_health = Archer::MAX_HEALTH;
        self.death_penalty_applied = false;
    }
}

/// +1 for every tick spent inside the close window around the protagonist.
#[derive(Debug, Clone, Copy)]
pub struct FlyerReward {
    pub window: f64,
    pub bonus: f64,
}

impl Default for FlyerReward {
    fn default() -> Self {
        Self {
            window: CLOSE_WINDOW,
            bonus: 1.0,
        }
    }
}

impl RewardModel for FlyerReward {
    type Observation = FlyerObservation;

    fn reward(&mut self, obs: &FlyerObservation) -> f64 {
        if obs.dx.abs() <= self.window && obs.dy.abs() <= self.window {
            self.bonus
        } else {
            0.0
        }
    }

    fn reset(&mut self) {}
}
