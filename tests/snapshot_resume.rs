//! Resuming training from snapshots stored on disk.

use std::fs;

use sarsa_arena::{
    Error, RoleKind,
    actions::FlyerAction,
    adapters::JsonDirectoryRepository,
    app::{App, ArenaConfig},
    labels::Label,
    pipeline::TrainingConfig,
    ports::SnapshotRepository,
    q_learning::{SnapshotRow, SnapshotTable},
};
use tempfile::tempdir;

fn flyer_table(value: f64) -> SnapshotTable {
    let row = FlyerAction::ALL
        .iter()
        .map(|action| (action.label().to_string(), value))
        .collect();
    let mut table = SnapshotTable::new();
    table.insert("close_left_below".to_string(), SnapshotRow(row));
    table
}

fn config(root: &std::path::Path, roles: Vec<RoleKind>) -> ArenaConfig {
    ArenaConfig::default()
        .with_roles(roles)
        .with_storage_root(root)
        .with_seed(21)
        .with_training(TrainingConfig {
            num_episodes: 1,
            max_ticks: 5,
            seed: Some(21),
            ..TrainingConfig::default()
        })
}

#[test]
fn test_cold_start_without_snapshot_directories() {
    let tmp = tempdir().unwrap();
    let config = config(tmp.path(), vec![RoleKind::Ranged, RoleKind::Flyer]);
    let app = App::from_config(&config);

    let controllers = app.create_controllers(&config).unwrap();
    assert_eq!(controllers.len(), 2);
    for controller in &controllers {
        assert_eq!(controller.stats().episode, 0);
        assert_eq!(controller.stats().table_size, 0);
    }
    assert!(!tmp.path().join("q_tables").exists());
}

#[test]
fn test_resume_continues_episode_numbering() {
    let tmp = tempdir().unwrap();
    let repo = JsonDirectoryRepository::new(tmp.path());
    for episode in [5, 12, 7] {
        repo.save(RoleKind::Flyer, episode, &flyer_table(episode as f64))
            .unwrap();
    }

    let config = config(tmp.path(), vec![RoleKind::Flyer]);
    let app = App::from_config(&config);
    let mut controllers = app.create_controllers(&config).unwrap();
    assert_eq!(controllers[0].stats().episode, 13);
    assert_eq!(controllers[0].stats().table_size, 1);

    let mut env = app.create_environment(&config.training);
    let result = app
        .create_orchestrator(config.training.clone())
        .run(&mut env, &mut controllers)
        .unwrap();

    let flyer = result.role(RoleKind::Flyer).unwrap();
    assert_eq!(flyer.first_episode, 14);
    assert_eq!(flyer.last_episode, 14);
    assert!(
        tmp.path()
            .join("bird_q_tables")
            .join("q_table_episode_14.json")
            .exists()
    );
    assert_eq!(repo.episodes(RoleKind::Flyer).unwrap(), vec![5, 7, 12, 14]);
}

#[test]
fn test_resumed_values_come_from_latest_snapshot() {
    let tmp = tempdir().unwrap();
    let repo = JsonDirectoryRepository::new(tmp.path());
    repo.save(RoleKind::Flyer, 3, &flyer_table(1.0)).unwrap();
    repo.save(RoleKind::Flyer, 30, &flyer_table(9.0)).unwrap();

    let app = App::from_config(&config(tmp.path(), vec![RoleKind::Flyer]));
    let summary = app.inspect(RoleKind::Flyer, 1).unwrap().unwrap();
    assert_eq!(summary.episode, 30);
    assert_eq!(summary.top[0].state, "close_left_below");
    assert_eq!(summary.top[0].value, 9.0);
}

#[test]
fn test_foreign_files_are_ignored() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("q_tables");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("notes.txt"), "not a snapshot").unwrap();
    fs::write(dir.join("q_table_episode_latest.json"), "{}").unwrap();

    let config = config(tmp.path(), vec![RoleKind::Ranged]);
    let controllers = App::from_config(&config).create_controllers(&config).unwrap();
    assert_eq!(controllers[0].stats().episode, 0);
}

#[test]
fn test_malformed_snapshot_is_rejected() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("q_tables");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("q_table_episode_4.json"), "{ not json").unwrap();

    let config = config(tmp.path(), vec![RoleKind::Ranged]);
    let err = App::from_config(&config)
        .create_controllers(&config)
        .err()
        .unwrap();
    match err {
        Error::MalformedSnapshot { path, .. } => {
            assert_eq!(path, dir.join("q_table_episode_4.json"));
        }
        other => panic!("expected a malformed snapshot error, got {other}"),
    }
}
