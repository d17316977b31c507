//! Dependency injection container for the arena application.
//!
//! The container owns the snapshot repository and builds controllers that
//! resume from whatever the repository last stored for their role.

use std::{path::PathBuf, sync::Arc};

use serde::Serialize;
use tracing::info;

use super::config::ArenaConfig;
use crate::{
    Result,
    actions::{ActionSpace, FlyerAction, RangedAction},
    adapters::JsonDirectoryRepository,
    controller::{AgentController, Controller},
    encoding::{FlyerEncoder, FlyerStateKey, RangedEncoder, RangedStateKey, StateKey},
    env::EnvironmentState,
    labels::Label,
    pipeline::{TrainingConfig, TrainingOrchestrator},
    ports::{RoleKind, SnapshotRepository},
    q_learning::{EpsilonGreedy, LearningSchedule, QTable, SarsaLearner},
    reward::{FlyerReward, RangedReward, RangedRewardValues},
    roles::{FlyerRole, RangedRole},
};

/// One highly valued state of a stored table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSummary {
    pub state: String,
    pub action: String,
    pub value: f64,
}

/// What `inspect` reports about a role's latest snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub role: RoleKind,
    pub episode: u64,
    pub states: usize,
    pub source: PathBuf,
    pub top: Vec<StateSummary>,
}

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```no_run
/// use sarsa_arena::app::{App, ArenaConfig};
///
/// let config = ArenaConfig::default().with_storage_root("training_data");
/// let app = App::from_config(&config);
/// let controllers = app.create_controllers(&config)?;
/// # Ok::<(), sarsa_arena::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use sarsa_arena::app::App;
/// use sarsa_arena::adapters::InMemoryRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Repository for snapshot persistence
    repository: Arc<dyn SnapshotRepository>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app storing snapshots under the current directory.
    pub fn new() -> Self {
        Self {
            repository: Arc::new(JsonDirectoryRepository::new(".")),
            default_seed: None,
        }
    }

    /// Create an app storing snapshots under the configured root.
    pub fn from_config(config: &ArenaConfig) -> Self {
        Self {
            repository: Arc::new(JsonDirectoryRepository::new(&config.storage.root)),
            default_seed: config.training.seed,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Get the snapshot repository.
    pub fn repository(&self) -> Arc<dyn SnapshotRepository> {
        Arc::clone(&self.repository)
    }

    fn seed(&self, config: Option<u64>) -> Option<u64> {
        config.or(self.default_seed)
    }

    /// Restore `role`'s table from its latest snapshot, or start empty.
    ///
    /// Returns the table and the episode count to resume at, one past the
    /// snapshot's episode.
    fn restore<K: StateKey, A: Label>(&self, role: RoleKind) -> Result<(QTable<K, A>, u64)> {
        let space = ActionSpace::<A>::new(role.name())?;
        match self.repository.latest(role)? {
            Some(snapshot) => {
                let table = QTable::from_snapshot(&snapshot.table, space, &snapshot.source)?;
                info!(
                    role = %role,
                    episode = snapshot.episode,
                    states = table.len(),
                    "resuming from snapshot"
                );
                Ok((table, snapshot.episode + 1))
            }
            None => {
                info!(role = %role, "no snapshot found, starting with an empty table");
                Ok((QTable::new(space), 0))
            }
        }
    }

    fn learner<K: StateKey, A: Label>(
        &self,
        role: RoleKind,
        schedule: LearningSchedule,
        seed: Option<u64>,
    ) -> Result<SarsaLearner<K, A>> {
        schedule.validate()?;
        let (table, episode) = self.restore(role)?;
        let policy = EpsilonGreedy::new(seed);
        Ok(SarsaLearner::new(table, schedule, Box::new(policy)).starting_at(episode))
    }

    /// Create the archer's controller, resumed from the latest snapshot.
    pub fn create_ranged(
        &self,
        schedule: LearningSchedule,
        rewards: RangedRewardValues,
        seed: Option<u64>,
    ) -> Result<AgentController<RangedRole>> {
        let learner = self.learner(RoleKind::Ranged, schedule, self.seed(seed))?;
        Ok(AgentController::new(
            RangedRole,
            RangedEncoder::default(),
            RangedReward::new(rewards),
            learner,
        ))
    }

    /// Create the bird's controller, resumed from the latest snapshot.
    pub fn create_flyer(
        &self,
        schedule: LearningSchedule,
        seed: Option<u64>,
    ) -> Result<AgentController<FlyerRole>> {
        let learner = self.learner(RoleKind::Flyer, schedule, self.seed(seed))?;
        Ok(AgentController::new(
            FlyerRole,
            FlyerEncoder,
            FlyerReward::default(),
            learner,
        ))
    }

    /// Create one controller per configured role, in configuration order.
    ///
    /// Each controller gets its own seed derived from the run seed.
    pub fn create_controllers(&self, config: &ArenaConfig) -> Result<Vec<Box<dyn Controller>>> {
        config.validate()?;
        let seed = self.seed(config.training.seed);
        config
            .roles
            .iter()
            .enumerate()
            .map(|(offset, role)| -> Result<Box<dyn Controller>> {
                let seed = seed.map(|s| s.wrapping_add(offset as u64 + 1));
                let controller: Box<dyn Controller> = match role {
                    RoleKind::Ranged => {
                        Box::new(self.create_ranged(config.learning, config.rewards, seed)?)
                    }
                    RoleKind::Flyer => Box::new(self.create_flyer(config.learning, seed)?),
                };
                Ok(controller)
            })
            .collect()
    }

    /// Create the shared environment for a run.
    pub fn create_environment(&self, training: &TrainingConfig) -> EnvironmentState {
        EnvironmentState::new(training.protagonist, self.seed(training.seed))
    }

    /// Create an orchestrator writing checkpoints to this app's repository.
    pub fn create_orchestrator(&self, training: TrainingConfig) -> TrainingOrchestrator {
        let training = TrainingConfig {
            seed: self.seed(training.seed),
            ..training
        };
        TrainingOrchestrator::new(training, self.repository())
    }

    /// Summarize `role`'s latest snapshot, or `None` when none is stored.
    ///
    /// The snapshot is fully validated, exactly as it would be on resume.
    pub fn inspect(&self, role: RoleKind, top: usize) -> Result<Option<SnapshotSummary>> {
        let Some(snapshot) = self.repository.latest(role)? else {
            return Ok(None);
        };
        let top = match role {
            RoleKind::Ranged => summarize(
                QTable::<RangedStateKey, RangedAction>::from_snapshot(
                    &snapshot.table,
                    ActionSpace::new(role.name())?,
                    &snapshot.source,
                )?,
                top,
            ),
            RoleKind::Flyer => summarize(
                QTable::<FlyerStateKey, FlyerAction>::from_snapshot(
                    &snapshot.table,
                    ActionSpace::new(role.name())?,
                    &snapshot.source,
                )?,
                top,
            ),
        };
        Ok(Some(SnapshotSummary {
            role,
            episode: snapshot.episode,
            states: snapshot.table.len(),
            source: snapshot.source,
            top,
        }))
    }
}

fn summarize<K: StateKey, A: Label>(table: QTable<K, A>, top: usize) -> Vec<StateSummary> {
    table
        .top_states(top)
        .into_iter()
        .map(|(key, action, value)| StateSummary {
            state: key.to_string(),
            action: action.label().to_string(),
            value,
        })
        .collect()
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject in-memory repositories and control
/// randomness.
pub struct AppBuilder {
    repository: Option<Arc<dyn SnapshotRepository>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    fn new() -> Self {
        Self {
            repository: None,
            default_seed: None,
        }
    }

    /// Set a custom snapshot repository.
    pub fn with_repository<R: SnapshotRepository + 'static>(mut self, repository: R) -> Self {
        self.repository = Some(Arc::new(repository));
        self
    }

    /// Set a default random seed for all created controllers.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app with configured dependencies.
    ///
    /// Uses the directory repository rooted at the current directory when
    /// none was given.
    pub fn build(self) -> App {
        App {
            repository: self
                .repository
                .unwrap_or_else(|| Arc::new(JsonDirectoryRepository::new("."))),
            default_seed: self.default_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Error,
        adapters::InMemoryRepository,
        q_learning::{SnapshotRow, SnapshotTable},
    };

    fn app(repo: &InMemoryRepository) -> App {
        App::for_testing()
            .with_repository(repo.clone())
            .with_default_seed(3)
            .build()
    }

    #[test]
    fn test_cold_start() {
        let repo = InMemoryRepository::new();
        let controllers = app(&repo).create_controllers(&ArenaConfig::default()).unwrap();
        assert_eq!(controllers.len(), 2);
        for controller in &controllers {
            let stats = controller.stats();
            assert_eq!(stats.episode, 0);
            assert_eq!(stats.table_size, 0);
            assert_eq!(stats.epsilon, 0.90);
        }
    }

    #[test]
    fn test_resume_from_latest_snapshot() {
        let repo = InMemoryRepository::new();
        let mut table = SnapshotTable::new();
        table.insert(
            "close_left_below".to_string(),
            SnapshotRow(
                FlyerAction::ALL
                    .iter()
                    .map(|a| (a.label().to_string(), 1.0))
                    .collect(),
            ),
        );
        for episode in [5, 12, 7] {
            repo.save(RoleKind::Flyer, episode, &table).unwrap();
        }

        let flyer = app(&repo).create_flyer(LearningSchedule::default(), None).unwrap();
        assert_eq!(flyer.learner().episode_count(), 13);
        assert_eq!(flyer.learner().table().len(), 1);
        // ε restarts from the configured value.
        assert_eq!(flyer.learner().epsilon(), 0.90);
    }

    #[test]
    fn test_malformed_snapshot_fails_fast() {
        let repo = InMemoryRepository::new();
        let mut table = SnapshotTable::new();
        table.insert("nowhere_near".to_string(), SnapshotRow::default());
        repo.save(RoleKind::Ranged, 3, &table).unwrap();

        let err = app(&repo)
            .create_ranged(LearningSchedule::default(), RangedRewardValues::default(), None)
            .err()
            .unwrap();
        assert!(matches!(err, Error::MalformedSnapshot { .. }));
    }

    #[test]
    fn test_inspect_reports_top_states() {
        let repo = InMemoryRepository::new();
        let app = app(&repo);
        assert!(app.inspect(RoleKind::Flyer, 5).unwrap().is_none());

        let mut flyer = app.create_flyer(LearningSchedule::default(), None).unwrap();
        let key = "far_right_above".parse().unwrap();
        flyer
            .learner_mut()
            .table_mut()
            .set(&key, FlyerAction::MoveUp, 3.5);
        repo.save(RoleKind::Flyer, 40, &flyer.snapshot()).unwrap();

        let summary = app.inspect(RoleKind::Flyer, 5).unwrap().unwrap();
        assert_eq!(summary.episode, 40);
        assert_eq!(summary.states, 1);
        assert_eq!(
            summary.top,
            vec![StateSummary {
                state: "far_right_above".to_string(),
                action: "move_up".to_string(),
                value: 3.5,
            }]
        );
    }
}
