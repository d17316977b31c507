//! Training orchestration for arena agents

use std::{path::Path, sync::Arc, time::Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Error, Result,
    controller::Controller,
    env::{EnvironmentState, ProtagonistKind},
    ports::{EpisodeReport, Observer, RoleKind, SnapshotRepository},
};

/// Window used for the mean reward reported in a [`RoleResult`].
pub const RESULT_WINDOW: usize = 1000;

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of episodes to run
    pub num_episodes: usize,

    /// Tick cap per episode (1800 ticks is 30 s at 60 FPS)
    pub max_ticks: u64,

    /// Log a trailing-average report every this many episodes (0 disables)
    pub report_interval: usize,

    /// Persist a snapshot whenever a learner's episode count is a multiple
    /// of this (0 disables periodic checkpoints)
    pub checkpoint_interval: u64,

    /// Random seed
    pub seed: Option<u64>,

    /// Scripted behaviour of the protagonist
    pub protagonist: ProtagonistKind,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_episodes: 1000,
            max_ticks: 1800,
            report_interval: 100,
            checkpoint_interval: 1000,
            seed: None,
            protagonist: ProtagonistKind::default(),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_ticks == 0 {
            return Err(Error::InvalidConfiguration {
                message: "max_ticks must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Outcome of a training run for one controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleResult {
    pub role: RoleKind,

    /// Episodes run in this session
    pub episodes_run: usize,

    /// Episode number of the first episode run (0 when none ran)
    pub first_episode: u64,

    /// Episode count after the last episode
    pub last_episode: u64,

    /// SARSA updates applied in this session
    pub total_updates: u64,

    pub final_epsilon: f64,
    pub final_alpha: f64,

    /// Mean cumulative reward over the final [`RESULT_WINDOW`] episodes
    pub mean_reward: f64,

    /// States in the Q-table
    pub table_size: usize,
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes played
    pub episodes: usize,

    /// Ticks simulated across all episodes
    pub total_ticks: u64,

    /// Episodes that ended with the protagonist defeated
    pub protagonist_defeats: usize,

    /// Wall-clock duration of the run
    pub elapsed_seconds: f64,

    pub roles: Vec<RoleResult>,
}

impl TrainingResult {
    pub fn role(&self, role: RoleKind) -> Option<&RoleResult> {
        self.roles.iter().find(|r| r.role == role)
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Mean of the last `window` values, 0 for an empty slice.
pub fn trailing_mean(values: &[f64], window: usize) -> f64 {
    let tail = &values[values.len().saturating_sub(window)..];
    if tail.is_empty() {
        0.0
    } else {
        tail.iter().sum::<f64>() / tail.len() as f64
    }
}

/// Runs episodes for a set of controllers sharing one environment.
///
/// Each tick every live controller decides, the environment advances once,
/// then every controller that decided learns. Episodes end at the tick cap
/// or as soon as a controller reports the episode terminal.
pub struct TrainingOrchestrator {
    config: TrainingConfig,
    repository: Arc<dyn SnapshotRepository>,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingOrchestrator {
    pub fn new(config: TrainingConfig, repository: Arc<dyn SnapshotRepository>) -> Self {
        Self {
            config,
            repository,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the orchestrator
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train `controllers` for the configured number of episodes.
    ///
    /// A snapshot is written for every controller on its checkpoint cadence
    /// and once more at the end of the run. Any snapshot write failure aborts
    /// training with that error.
    pub fn run(
        &mut self,
        env: &mut EnvironmentState,
        controllers: &mut [Box<dyn Controller>],
    ) -> Result<TrainingResult> {
        self.config.validate()?;
        self.seed_controllers(controllers);

        let started = Instant::now();
        let start_stats: Vec<_> = controllers.iter().map(|c| c.stats()).collect();
        let history_offsets: Vec<_> = controllers.iter().map(|c| c.history().len()).collect();
        let mut saved_at: Vec<Option<u64>> = vec![None; controllers.len()];
        let mut total_ticks = 0;
        let mut protagonist_defeats = 0;

        info!(
            episodes = self.config.num_episodes,
            max_ticks = self.config.max_ticks,
            protagonist = %env.protagonist_kind(),
            controllers = controllers.len(),
            "starting training"
        );

        for observer in &mut self.observers {
            observer.on_training_start(self.config.num_episodes)?;
        }

        for index in 0..self.config.num_episodes {
            for observer in &mut self.observers {
                observer.on_episode_start(index)?;
            }

            let report = self.run_episode(index, env, controllers);
            total_ticks += report.ticks;
            if report.protagonist_defeated {
                protagonist_defeats += 1;
            }

            for summary in &report.roles {
                info!(
                    role = %summary.role,
                    episode = summary.episode,
                    reward = summary.total_reward,
                    epsilon = summary.epsilon,
                    ticks = report.ticks,
                    "episode finished"
                );
            }
            if (index + 1).is_multiple_of(self.config.report_interval) {
                self.report(controllers, started);
            }

            for observer in &mut self.observers {
                observer.on_episode_end(&report)?;
            }

            let interval = self.config.checkpoint_interval;
            for (slot, controller) in controllers.iter().enumerate() {
                let episode = controller.stats().episode;
                if episode.is_multiple_of(interval) {
                    self.checkpoint(controller.as_ref())?;
                    saved_at[slot] = Some(episode);
                }
            }
        }

        if self.config.num_episodes > 0 {
            for (slot, controller) in controllers.iter().enumerate() {
                if saved_at[slot] != Some(controller.stats().episode) {
                    self.checkpoint(controller.as_ref())?;
                }
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let elapsed_seconds = started.elapsed().as_secs_f64();
        let roles = controllers
            .iter()
            .zip(start_stats)
            .zip(history_offsets)
            .map(|((controller, before), offset)| {
                let after = controller.stats();
                let episodes_run = self.config.num_episodes;
                RoleResult {
                    role: after.role,
                    episodes_run,
                    first_episode: if episodes_run > 0 { before.episode + 1 } else { 0 },
                    last_episode: after.episode,
                    total_updates: after.updates - before.updates,
                    final_epsilon: after.epsilon,
                    final_alpha: after.alpha,
                    mean_reward: trailing_mean(&controller.history()[offset..], RESULT_WINDOW),
                    table_size: after.table_size,
                }
            })
            .collect();

        info!(
            episodes = self.config.num_episodes,
            total_ticks,
            elapsed_seconds,
            "training finished"
        );

        Ok(TrainingResult {
            episodes: self.config.num_episodes,
            total_ticks,
            protagonist_defeats,
            elapsed_seconds,
            roles,
        })
    }

    fn run_episode(
        &self,
        index: usize,
        env: &mut EnvironmentState,
        controllers: &mut [Box<dyn Controller>],
    ) -> EpisodeReport {
        env.reset();
        for controller in controllers.iter_mut() {
            controller.reset_episode();
        }

        let mut ticks = 0;
        while ticks < self.config.max_ticks && !Self::episode_over(env, controllers) {
            for controller in controllers.iter_mut() {
                controller.decide(env);
            }
            env.advance();
            for controller in controllers.iter_mut() {
                controller.learn(env);
            }
            ticks += 1;
        }

        EpisodeReport {
            index,
            ticks,
            protagonist_defeated: !env.protagonist.alive,
            roles: controllers.iter_mut().map(|c| c.end_episode()).collect(),
        }
    }

    fn episode_over(env: &EnvironmentState, controllers: &[Box<dyn Controller>]) -> bool {
        !env.protagonist.alive || controllers.iter().any(|c| c.is_terminal(env))
    }

    fn report(&self, controllers: &[Box<dyn Controller>], started: Instant) {
        for controller in controllers {
            let stats = controller.stats();
            info!(
                role = %stats.role,
                episode = stats.episode,
                avg_reward = trailing_mean(controller.history(), self.config.report_interval),
                epsilon = stats.epsilon,
                alpha = stats.alpha,
                states = stats.table_size,
                elapsed_seconds = started.elapsed().as_secs_f64(),
                "training progress"
            );
        }
    }

    fn checkpoint(&mut self, controller: &dyn Controller) -> Result<()> {
        let stats = controller.stats();
        let location = self
            .repository
            .save(stats.role, stats.episode, &controller.snapshot())?;
        for observer in &mut self.observers {
            observer.on_checkpoint(stats.role, stats.episode, &location)?;
        }
        Ok(())
    }

    fn seed_controllers(&self, controllers: &mut [Box<dyn Controller>]) {
        if let Some(seed) = self.config.seed {
            for (offset, controller) in controllers.iter_mut().enumerate() {
                controller.reseed(seed.wrapping_add(offset as u64 + 1));
            }
        }
    }
}
