//! Configuration types for arena training.
//!
//! Every section has defaults, so a configuration file only needs the fields
//! it changes:
//!
//! ```json
//! {
//!   "training": { "num_episodes": 5000, "protagonist": "hunter" },
//!   "learning": { "alpha_decay_enabled": true }
//! }
//! ```

use std::{fs::File, io::BufReader, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    pipeline::TrainingConfig,
    ports::RoleKind,
    q_learning::LearningSchedule,
    reward::RangedRewardValues,
};

/// Where snapshots are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory holding one snapshot directory per role
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// Complete configuration of a training run.
///
/// # Examples
///
/// ```
/// use sarsa_arena::{app::ArenaConfig, ports::RoleKind};
///
/// let config = ArenaConfig::default()
///     .with_roles(vec![RoleKind::Flyer])
///     .with_seed(42)
///     .with_storage_root("runs/flyer");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Roles to train, in tick order
    pub roles: Vec<RoleKind>,
    pub learning: LearningSchedule,
    pub training: TrainingConfig,
    pub storage: StorageConfig,
    pub rewards: RangedRewardValues,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            roles: RoleKind::ALL.to_vec(),
            learning: LearningSchedule::default(),
            training: TrainingConfig::default(),
            storage: StorageConfig::default(),
            rewards: RangedRewardValues::default(),
        }
    }
}

impl ArenaConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config file {path:?}"),
            source,
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the roles to train.
    pub fn with_roles(mut self, roles: Vec<RoleKind>) -> Self {
        self.roles = roles;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.training.seed = Some(seed);
        self
    }

    pub fn with_storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage.root = root.into();
        self
    }

    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    pub fn with_learning(mut self, learning: LearningSchedule) -> Self {
        self.learning = learning;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.roles.is_empty() {
            return Err(Error::InvalidConfiguration {
                message: "at least one role must be trained".to_string(),
            });
        }
        for (i, role) in self.roles.iter().enumerate() {
            if self.roles[..i].contains(role) {
                return Err(Error::InvalidConfiguration {
                    message: format!("role '{role}' listed more than once"),
                });
            }
        }
        self.learning.validate()?;
        self.training.validate()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::env::ProtagonistKind;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"training": {{"num_episodes": 7, "protagonist": "hunter"}}, "learning": {{"alpha_decay_enabled": true}}}}"#
        )
        .unwrap();

        let config = ArenaConfig::from_file(file.path()).unwrap();
        assert_eq!(config.training.num_episodes, 7);
        assert_eq!(config.training.protagonist, ProtagonistKind::Hunter);
        assert_eq!(config.training.max_ticks, 1800);
        assert!(config.learning.alpha_decay_enabled);
        assert_eq!(config.learning.epsilon, 0.90);
        assert_eq!(config.roles, RoleKind::ALL.to_vec());
    }

    #[test]
    fn test_duplicate_roles_rejected() {
        let config = ArenaConfig::default().with_roles(vec![RoleKind::Ranged, RoleKind::Ranged]);
        assert!(matches!(config.validate(), Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ArenaConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
