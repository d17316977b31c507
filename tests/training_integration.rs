//! End-to-end training through the orchestrator with on-disk snapshots.

use std::sync::Arc;

use sarsa_arena::{
    AgentController, Controller, LearningSchedule, QTable, RoleKind, SarsaLearner,
    actions::{ActionSpace, RangedAction},
    adapters::JsonDirectoryRepository,
    encoding::{RangedEncoder, RangedStateKey},
    env::{EnvironmentState, ProtagonistKind},
    pipeline::{MetricsObserver, TrainingConfig, TrainingOrchestrator},
    ports::SnapshotRepository,
    q_learning::ActionPolicy,
    reward::RangedReward,
    roles::RangedRole,
};
use tempfile::tempdir;

/// Always picks the same action, whatever the values say.
struct Always(RangedAction);

impl ActionPolicy<RangedAction> for Always {
    fn choose(
        &mut self,
        _values: &[f64],
        _space: &ActionSpace<RangedAction>,
        _epsilon: f64,
    ) -> RangedAction {
        self.0
    }
}

fn shooting_archer() -> Box<dyn Controller> {
    let learner = SarsaLearner::new(
        QTable::new(ActionSpace::new("ranged").unwrap()),
        LearningSchedule::default(),
        Box::new(Always(RangedAction::Shoot)),
    );
    Box::new(AgentController::new(
        RangedRole,
        RangedEncoder::default(),
        RangedReward::default(),
        learner,
    ))
}

fn config(episodes: usize, max_ticks: u64) -> TrainingConfig {
    TrainingConfig {
        num_episodes: episodes,
        max_ticks,
        protagonist: ProtagonistKind::Stationary,
        seed: Some(1),
        ..TrainingConfig::default()
    }
}

#[test]
fn test_single_episode_against_stationary_protagonist() {
    let tmp = tempdir().unwrap();
    let repo = Arc::new(JsonDirectoryRepository::new(tmp.path()));
    let mut env = EnvironmentState::new(ProtagonistKind::Stationary, Some(1));
    let mut controllers = vec![shooting_archer()];

    let mut orchestrator = TrainingOrchestrator::new(config(1, 10), repo.clone());
    let result = orchestrator.run(&mut env, &mut controllers).unwrap();

    assert_eq!(result.episodes, 1);
    assert_eq!(result.total_ticks, 10);
    assert_eq!(result.protagonist_defeats, 0);

    let ranged = result.role(RoleKind::Ranged).unwrap();
    assert_eq!(ranged.episodes_run, 1);
    assert_eq!(ranged.first_episode, 1);
    assert_eq!(ranged.last_episode, 1);
    // Only the first shot starts an attack: the cooldown outlasts the episode.
    assert_eq!(ranged.mean_reward, 2.0);
    // The first tick of an episode has no previous pair to back up.
    assert_eq!(ranged.total_updates, 9);
    assert!(ranged.final_epsilon < 0.90);
    assert_eq!(controllers[0].history(), &[2.0]);

    let saved = tmp.path().join("q_tables").join("q_table_episode_1.json");
    assert!(saved.exists(), "expected snapshot at {}", saved.display());
    assert_eq!(repo.episodes(RoleKind::Ranged).unwrap(), vec![1]);
    assert!(repo.episodes(RoleKind::Flyer).unwrap().is_empty());
}

#[test]
fn test_snapshot_matches_learned_table() {
    let tmp = tempdir().unwrap();
    let repo = Arc::new(JsonDirectoryRepository::new(tmp.path()));
    let mut env = EnvironmentState::new(ProtagonistKind::Stationary, Some(1));
    let mut controllers = vec![shooting_archer()];

    TrainingOrchestrator::new(config(2, 10), repo.clone())
        .run(&mut env, &mut controllers)
        .unwrap();

    let snapshot = repo.latest(RoleKind::Ranged).unwrap().unwrap();
    assert_eq!(snapshot.episode, 2);

    let learned = controllers[0].snapshot();
    assert_eq!(
        snapshot.table.keys().collect::<Vec<_>>(),
        learned.keys().collect::<Vec<_>>()
    );
    for (key, row) in &learned {
        for ((name, value), (stored_name, stored)) in row.0.iter().zip(&snapshot.table[key].0) {
            assert_eq!(name, stored_name);
            assert!((value - stored).abs() < 1e-12, "{key}/{name}: {value} vs {stored}");
        }
    }

    let space = ActionSpace::new("ranged").unwrap();
    let restored: QTable<RangedStateKey, RangedAction> =
        QTable::from_snapshot(&snapshot.table, space, &snapshot.source).unwrap();
    assert_eq!(restored.len(), controllers[0].stats().table_size);
}

#[test]
fn test_checkpoints_follow_episode_cadence() {
    let tmp = tempdir().unwrap();
    let repo = Arc::new(JsonDirectoryRepository::new(tmp.path()));
    let mut env = EnvironmentState::new(ProtagonistKind::Stationary, Some(1));
    let mut controllers = vec![shooting_archer()];

    let training = TrainingConfig {
        checkpoint_interval: 2,
        ..config(5, 5)
    };
    let result = TrainingOrchestrator::new(training, repo.clone())
        .with_observer(Box::new(MetricsObserver::new()))
        .run(&mut env, &mut controllers)
        .unwrap();

    assert_eq!(result.total_ticks, 25);
    assert_eq!(controllers[0].history().len(), 5);
    assert_eq!(repo.episodes(RoleKind::Ranged).unwrap(), vec![2, 4, 5]);
}
