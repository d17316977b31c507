//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling the training loop
//! to specific output formats or metrics.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, ports::RoleKind};

/// One controller's figures for a finished episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleEpisode {
    pub role: RoleKind,
    /// The learner's episode number (continues across runs).
    pub episode: u64,
    pub total_reward: f64,
    /// Ticks in which this controller acted.
    pub steps: u64,
    pub epsilon: f64,
    pub alpha: f64,
    pub table_size: usize,
}

/// Summary of one finished episode across all controllers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    /// 0-based index of the episode within this run.
    pub index: usize,
    pub ticks: u64,
    pub protagonist_defeated: bool,
    pub roles: Vec<RoleEpisode>,
}

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during
/// training. Examples include:
/// - Progress bars for user feedback
/// - JSONL export for analysis
/// - Reward history for plotting
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(index)`
///    - `on_episode_end(report)`
///    - `on_checkpoint(...)` - For each snapshot written after the episode
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use sarsa_arena::ports::{EpisodeReport, Observer};
///
/// struct Counter {
///     episodes: usize,
/// }
///
/// impl Observer for Counter {
///     fn on_episode_end(&mut self, _report: &EpisodeReport) -> sarsa_arena::Result<()> {
///         self.episodes += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to initialize observation state.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called before the first tick of an episode.
    fn on_episode_start(&mut self, _index: usize) -> Result<()> {
        Ok(())
    }

    /// Called once every controller has closed the episode.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to record episode outcomes.
    fn on_episode_end(&mut self, _report: &EpisodeReport) -> Result<()> {
        Ok(())
    }

    /// Called after a snapshot has been written.
    fn on_checkpoint(&mut self, _role: RoleKind, _episode: u64, _location: &Path) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    ///
    /// Use this to finalize outputs, close files, or display summaries.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
