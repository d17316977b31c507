//! Observer adapters for training runs
//!
//! Observers allow composable data collection during training without
//! coupling the training loop to specific output formats.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    pipeline::training::trailing_mean,
    ports::{EpisodeReport, Observer, RoleKind},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    defeats: usize,
    checkpoints: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            defeats: 0,
            checkpoints: 0,
        }
    }

    fn message(&self) -> String {
        format!("defeats:{} saved:{}", self.defeats, self.checkpoints)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        if report.protagonist_defeated {
            self.defeats += 1;
        }
        if let Some(pb) = &self.progress_bar {
            pb.set_position(report.index as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_checkpoint(&mut self, _role: RoleKind, _episode: u64, _location: &Path) -> Result<()> {
        self.checkpoints += 1;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Summary of one role's rewards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMetrics {
    pub episodes: usize,
    pub mean_reward: f64,
    pub best_reward: f64,
    pub worst_reward: f64,
    /// Mean over the last 100 episodes
    pub recent_mean_reward: f64,
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub protagonist_defeats: usize,
    pub avg_episode_length: f64,
    pub roles: BTreeMap<RoleKind, RoleMetrics>,
}

/// Metrics observer - Tracks training metrics
#[derive(Debug, Default)]
pub struct MetricsObserver {
    episode_lengths: Vec<u64>,
    protagonist_defeats: usize,
    rewards: BTreeMap<RoleKind, Vec<f64>>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative reward per episode for `role`
    pub fn rewards(&self, role: RoleKind) -> &[f64] {
        self.rewards.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get average episode length in ticks
    pub fn avg_episode_length(&self) -> f64 {
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            self.episode_lengths.iter().sum::<u64>() as f64 / self.episode_lengths.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        let roles = self
            .rewards
            .iter()
            .map(|(role, rewards)| {
                let metrics = RoleMetrics {
                    episodes: rewards.len(),
                    mean_reward: trailing_mean(rewards, rewards.len()),
                    best_reward: rewards.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    worst_reward: rewards.iter().copied().fold(f64::INFINITY, f64::min),
                    recent_mean_reward: trailing_mean(rewards, 100),
                };
                (*role, metrics)
            })
            .collect();
        MetricsSummary {
            total_episodes: self.episode_lengths.len(),
            protagonist_defeats: self.protagonist_defeats,
            avg_episode_length: self.avg_episode_length(),
            roles,
        }
    }
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.episode_lengths.push(report.ticks);
        if report.protagonist_defeated {
            self.protagonist_defeats += 1;
        }
        for role in &report.roles {
            self.rewards
                .entry(role.role)
                .or_default()
                .push(role.total_reward);
        }
        Ok(())
    }
}

/// JSONL observer - Writes one episode report per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        serde_json::to_writer(&mut self.writer, report)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One row of the reward history export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub index: usize,
    pub role: RoleKind,
    pub episode: u64,
    pub total_reward: f64,
    pub epsilon: f64,
    pub alpha: f64,
    pub table_size: usize,
    pub ticks: u64,
}

/// CSV observer - Exports per-episode rewards for plotting
pub struct RewardHistoryObserver {
    writer: csv::Writer<File>,
}

impl RewardHistoryObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            writer: csv::Writer::from_path(path)?,
        })
    }
}

impl Observer for RewardHistoryObserver {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        for role in &report.roles {
            self.writer.serialize(HistoryRecord {
                index: report.index,
                role: role.role,
                episode: role.episode,
                total_reward: role.total_reward,
                epsilon: role.epsilon,
                alpha: role.alpha,
                table_size: role.table_size,
                ticks: report.ticks,
            })?;
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::ports::RoleEpisode;

    fn report(index: usize, reward: f64) -> EpisodeReport {
        EpisodeReport {
            index,
            ticks: 100,
            protagonist_defeated: index % 2 == 1,
            roles: vec![RoleEpisode {
                role: RoleKind::Ranged,
                episode: index as u64 + 1,
                total_reward: reward,
                steps: 100,
                epsilon: 0.5,
                alpha: 0.1,
                table_size: 3,
            }],
        }
    }

    #[test]
    fn test_metrics_summary() {
        let mut metrics = MetricsObserver::new();
        metrics.on_episode_end(&report(0, 2.0)).unwrap();
        metrics.on_episode_end(&report(1, -4.0)).unwrap();

        let summary = metrics.summary();
        assert_eq!(summary.total_episodes, 2);
        assert_eq!(summary.protagonist_defeats, 1);
        assert_eq!(summary.avg_episode_length, 100.0);
        let ranged = &summary.roles[&RoleKind::Ranged];
        assert_eq!(ranged.mean_reward, -1.0);
        assert_eq!(ranged.best_reward, 2.0);
        assert_eq!(ranged.worst_reward, -4.0);
        assert!(metrics.rewards(RoleKind::Flyer).is_empty());
    }

    #[test]
    fn test_jsonl_writes_one_line_per_episode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("episodes.jsonl");
        let mut observer = JsonlObserver::new(&path).unwrap();
        observer.on_episode_end(&report(0, 1.0)).unwrap();
        observer.on_episode_end(&report(1, 3.0)).unwrap();
        observer.on_training_end().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: EpisodeReport = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, report(1, 3.0));
    }

    #[test]
    fn test_history_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let mut observer = RewardHistoryObserver::new(&path).unwrap();
        observer.on_episode_end(&report(0, 2.0)).unwrap();
        observer.on_training_end().unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let records: Vec<HistoryRecord> = reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].role, RoleKind::Ranged);
        assert_eq!(records[0].total_reward, 2.0);
    }
}
