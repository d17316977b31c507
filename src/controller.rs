//! Per-role agent controller
//!
//! A controller drives one learnable character through the SARSA loop. Every
//! tick is split in two so that several controllers can share one
//! environment:
//!
//! 1. [`Controller::decide`] encodes the current observation, selects an
//!    action and applies it to the environment.
//! 2. The caller advances the environment once.
//! 3. [`Controller::learn`] scores the post-tick observation, anticipates the
//!    next action and backs up the previous state-action pair.
//!
//! The backup on tick `t` updates the pair chosen on tick `t - 1` with the
//! reward observed on tick `t`, bootstrapping from the pair chosen on tick
//! `t`. The first tick of an episode therefore never updates.

use crate::{
    encoding::StateEncoder,
    env::EnvironmentState,
    ports::{Role, RoleEpisode, RoleKind},
    q_learning::{SarsaLearner, SnapshotTable},
    reward::RewardModel,
};

/// State key type produced by a role's encoder.
pub type KeyOf<R> = <<R as Role>::Encoder as StateEncoder>::Key;

/// Learner type for a role.
pub type LearnerOf<R> = SarsaLearner<KeyOf<R>, <R as Role>::Action>;

/// Learner-level figures for one controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerStats {
    pub role: RoleKind,
    pub episode: u64,
    pub updates: u64,
    pub epsilon: f64,
    pub alpha: f64,
    pub table_size: usize,
}

/// Object-safe view of an [`AgentController`], used by the orchestrator to
/// drive controllers of different roles side by side.
pub trait Controller: Send {
    fn kind(&self) -> RoleKind;

    /// Clear per-episode state. Q-values are kept.
    fn reset_episode(&mut self);

    /// Observe, select and apply an action.
    ///
    /// Returns `false`, doing nothing, while the governed character is dead.
    fn decide(&mut self, env: &mut EnvironmentState) -> bool;

    /// Score the advanced environment and apply the SARSA backup.
    ///
    /// Returns the tick's reward, or `None` when [`decide`](Self::decide)
    /// did not act this tick.
    fn learn(&mut self, env: &EnvironmentState) -> Option<f64>;

    /// Whether this role considers the episode over.
    fn is_terminal(&self, env: &EnvironmentState) -> bool;

    /// Close the episode: bump the episode counter and record its reward.
    fn end_episode(&mut self) -> RoleEpisode;

    fn stats(&self) -> ControllerStats;

    /// Cumulative reward of every episode closed by this controller.
    fn history(&self) -> &[f64];

    /// Persisted form of the Q-table.
    fn snapshot(&self) -> SnapshotTable;

    /// Restart the policy's randomness.
    fn reseed(&mut self, seed: u64);
}

/// Controller for one role.
pub struct AgentController<R: Role> {
    role: R,
    encoder: R::Encoder,
    reward: R::Reward,
    learner: LearnerOf<R>,
    /// Pair decided on the current tick, waiting for `learn`.
    pending: Option<(KeyOf<R>, R::Action)>,
    /// Pair decided on the previous tick, waiting for its backup.
    previous: Option<(KeyOf<R>, R::Action)>,
    steps: u64,
    episode_reward: f64,
    history: Vec<f64>,
}

impl<R: Role> AgentController<R> {
    pub fn new(role: R, encoder: R::Encoder, reward: R::Reward, learner: LearnerOf<R>) -> Self {
        Self {
            role,
            encoder,
            reward,
            learner,
            pending: None,
            previous: None,
            steps: 0,
            episode_reward: 0.0,
            history: Vec::new(),
        }
    }

    pub fn learner(&self) -> &LearnerOf<R> {
        &self.learner
    }

    pub fn learner_mut(&mut self) -> &mut LearnerOf<R> {
        &mut self.learner
    }

    /// Ticks acted in the current episode.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn episode_reward(&self) -> f64 {
        self.episode_reward
    }
}

impl<R: Role> Controller for AgentController<R> {
    fn kind(&self) -> RoleKind {
        self.role.kind()
    }

    fn reset_episode(&mut self) {
        self.reward.reset();
        self.pending = None;
        self.previous = None;
        self.steps = 0;
        self.episode_reward = 0.0;
    }

    fn decide(&mut self, env: &mut EnvironmentState) -> bool {
        self.pending = None;
        if !self.role.is_alive(env) {
            return false;
        }
        let observation = self.role.observe(env);
        let state = self.encoder.encode(&observation);
        let action = self.learner.select(&state);
        self.role.apply_action(env, action);
        self.pending = Some((state, action));
        true
    }

    fn learn(&mut self, env: &EnvironmentState) -> Option<f64> {
        let (state, action) = self.pending.take()?;

        let observation = self.role.observe(env);
        let reward = self.reward.reward(&observation);

        // Anticipatory selection: only materializes the next state's row.
        let next_state = self.encoder.encode(&observation);
        let _next_action = self.learner.select(&next_state);

        if let Some((previous_state, previous_action)) = self.previous.take() {
            self.learner
                .update(&previous_state, previous_action, reward, &state, action);
        }
        self.previous = Some((state, action));

        self.steps += 1;
        self.episode_reward += reward;
        Some(reward)
    }

    fn is_terminal(&self, env: &EnvironmentState) -> bool {
        self.role.is_terminal(env)
    }

    fn end_episode(&mut self) -> RoleEpisode {
        self.learner.end_episode();
        self.history.push(self.episode_reward);
        RoleEpisode {
            role: self.role.kind(),
            episode: self.learner.episode_count(),
            total_reward: self.episode_reward,
            steps: self.steps,
            epsilon: self.learner.epsilon(),
            alpha: self.learner.alpha(),
            table_size: self.learner.table().len(),
        }
    }

    fn stats(&self) -> ControllerStats {
        ControllerStats {
            role: self.role.kind(),
            episode: self.learner.episode_count(),
            updates: self.learner.updates(),
            epsilon: self.learner.epsilon(),
            alpha: self.learner.alpha(),
            table_size: self.learner.table().len(),
        }
    }

    fn history(&self) -> &[f64] {
        &self.history
    }

    fn snapshot(&self) -> SnapshotTable {
        self.learner.table().to_snapshot()
    }

    fn reseed(&mut self, seed: u64) {
        self.learner.reseed(seed);
    }
}
