//! SARSA learner
//!
//! Owns one role's Q-table, its action policy and the ε/α schedule. The
//! schedule is process-local: it is never written into snapshots, so every
//! run restarts from the configured initial values.

use serde::{Deserialize, Serialize};

use super::{
    QTable,
    policy::{self, ActionPolicy},
};
use crate::{Error, Result, encoding::StateKey, labels::Label};

/// Exploration and learning-rate schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningSchedule {
    /// Initial exploration rate ε
    pub epsilon: f64,
    /// Multiplicative ε decay applied after every update
    pub epsilon_decay: f64,
    pub epsilon_min: f64,
    /// Initial learning rate α
    pub alpha: f64,
    pub alpha_decay: f64,
    pub alpha_min: f64,
    /// α stays constant unless this is set.
    pub alpha_decay_enabled: bool,
    /// Discount factor γ
    pub gamma: f64,
}

impl Default for LearningSchedule {
    fn default() -> Self {
        Self {
            epsilon: 0.90,
            epsilon_decay: 0.999_999_95,
            epsilon_min: 0.01,
            alpha: 0.1,
            alpha_decay: 0.999_999_99,
            alpha_min: 0.01,
            alpha_decay_enabled: false,
            gamma: 0.9,
        }
    }
}

impl LearningSchedule {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_epsilon_decay(mut self, decay: f64) -> Self {
        self.epsilon_decay = decay;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_alpha_decay(mut self, enabled: bool) -> Self {
        self.alpha_decay_enabled = enabled;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Check every rate lies in its valid range.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::InvalidConfiguration {
                    message: format!("{name} must be within [0, 1], got {value}"),
                })
            }
        };
        unit("epsilon", self.epsilon)?;
        unit("epsilon_decay", self.epsilon_decay)?;
        unit("epsilon_min", self.epsilon_min)?;
        unit("alpha", self.alpha)?;
        unit("alpha_decay", self.alpha_decay)?;
        unit("alpha_min", self.alpha_min)?;
        unit("gamma", self.gamma)?;
        if self.epsilon_min > self.epsilon {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "epsilon_min ({}) exceeds epsilon ({})",
                    self.epsilon_min, self.epsilon
                ),
            });
        }
        Ok(())
    }
}

/// On-policy TD learner for a single role.
pub struct SarsaLearner<K, A: 'static> {
    table: QTable<K, A>,
    policy: Box<dyn ActionPolicy<A>>,
    schedule: LearningSchedule,
    epsilon: f64,
    alpha: f64,
    episode_count: u64,
    updates: u64,
}

impl<K: StateKey, A: Label> SarsaLearner<K, A> {
    pub fn new(
        table: QTable<K, A>,
        schedule: LearningSchedule,
        policy: Box<dyn ActionPolicy<A>>,
    ) -> Self {
        Self {
            table,
            policy,
            epsilon: schedule.epsilon,
            alpha: schedule.alpha,
            schedule,
            episode_count: 0,
            updates: 0,
        }
    }

    /// Continue counting episodes after a restored snapshot.
    pub fn starting_at(mut self, episode: u64) -> Self {
        self.episode_count = episode;
        self
    }

    /// Choose an action for `state` under the current ε.
    pub fn select(&mut self, state: &K) -> A {
        policy::select(self.policy.as_mut(), state, &mut self.table, self.epsilon)
    }

    /// Apply one SARSA backup, then decay the schedule.
    ///
    /// Returns the new Q(s, a).
    pub fn update(
        &mut self,
        state: &K,
        action: A,
        reward: f64,
        next_state: &K,
        next_action: A,
    ) -> f64 {
        let value = self.table.sarsa_update(
            state,
            action,
            reward,
            next_state,
            next_action,
            self.alpha,
            self.schedule.gamma,
        );
        self.updates += 1;
        self.decay();
        value
    }

    fn decay(&mut self) {
        self.epsilon = (self.epsilon * self.schedule.epsilon_decay).max(self.schedule.epsilon_min);
        if self.schedule.alpha_decay_enabled {
            self.alpha = (self.alpha * self.schedule.alpha_decay).max(self.schedule.alpha_min);
        }
    }

    pub fn end_episode(&mut self) {
        self.episode_count += 1;
    }

    pub fn reseed(&mut self, seed: u64) {
        self.policy.reseed(seed);
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn episode_count(&self) -> u64 {
        self.episode_count
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn schedule(&self) -> &LearningSchedule {
        &self.schedule
    }

    pub fn table(&self) -> &QTable<K, A> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut QTable<K, A> {
        &mut self.table
    }
}
