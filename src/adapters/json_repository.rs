//! JSON directory implementation of the snapshot repository.
//!
//! Each role keeps its snapshots in its own directory under a storage root,
//! one pretty-printed JSON file per checkpoint:
//!
//! ```text
//! <root>/q_tables/q_table_episode_1000.json
//! <root>/bird_q_tables/q_table_episode_1000.json
//! ```

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::SystemTime,
};

use tracing::{debug, info, warn};

use crate::{
    Result,
    error::Error,
    ports::{RoleKind, Snapshot, SnapshotRepository, parse_snapshot_file_name, snapshot_file_name},
    q_learning::{
        SnapshotTable,
        serialization::{read_table, write_table},
    },
};

/// A snapshot file found on disk.
#[derive(Debug, Clone)]
struct Entry {
    episode: u64,
    path: PathBuf,
    created: Option<SystemTime>,
}

/// Directory-backed repository writing one JSON file per snapshot.
///
/// # Examples
///
/// ```no_run
/// use sarsa_arena::{
///     adapters::JsonDirectoryRepository,
///     ports::{RoleKind, SnapshotRepository},
///     q_learning::SnapshotTable,
/// };
///
/// let repo = JsonDirectoryRepository::new("training_data");
/// let path = repo.save(RoleKind::Flyer, 1000, &SnapshotTable::new())?;
/// assert!(path.ends_with("bird_q_tables/q_table_episode_1000.json"));
/// # Ok::<(), sarsa_arena::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct JsonDirectoryRepository {
    root: PathBuf,
}

impl JsonDirectoryRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding `role`'s snapshots.
    pub fn role_dir(&self, role: RoleKind) -> PathBuf {
        self.root.join(role.snapshot_dir())
    }

    /// List snapshot files for `role`. A missing directory lists nothing.
    fn scan(&self, role: RoleKind) -> Result<Vec<Entry>> {
        let dir = self.role_dir(role);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                debug!(role = %role, dir = %dir.display(), "no snapshot directory");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(Error::Io {
                    operation: format!("read directory {dir:?}"),
                    source,
                });
            }
        };

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::Io {
                operation: format!("read directory {dir:?}"),
                source,
            })?;
            let path = entry.path();
            let episode = entry
                .file_name()
                .to_str()
                .and_then(parse_snapshot_file_name);
            let Some(episode) = episode else {
                warn!(path = %path.display(), "ignoring file that is not a snapshot");
                continue;
            };
            let metadata = entry.metadata().ok();
            if metadata.as_ref().is_some_and(|m| !m.is_file()) {
                warn!(path = %path.display(), "ignoring non-file snapshot entry");
                continue;
            }
            let created = metadata.and_then(|m| m.created().or_else(|_| m.modified()).ok());
            found.push(Entry {
                episode,
                path,
                created,
            });
        }
        Ok(found)
    }
}

impl SnapshotRepository for JsonDirectoryRepository {
    fn save(&self, role: RoleKind, episode: u64, table: &SnapshotTable) -> Result<PathBuf> {
        let dir = self.role_dir(role);
        fs::create_dir_all(&dir).map_err(|source| Error::Io {
            operation: format!("create directory {dir:?}"),
            source,
        })?;

        let path = dir.join(snapshot_file_name(episode));
        write_table(table, &path)?;
        info!(
            role = %role,
            episode,
            states = table.len(),
            path = %path.display(),
            "saved snapshot"
        );
        Ok(path)
    }

    fn latest(&self, role: RoleKind) -> Result<Option<Snapshot>> {
        // Highest episode wins; creation time only separates equal numbers
        // such as `q_table_episode_7.json` and `q_table_episode_007.json`.
        let Some(entry) = self
            .scan(role)?
            .into_iter()
            .max_by(|a, b| (a.episode, a.created).cmp(&(b.episode, b.created)))
        else {
            return Ok(None);
        };

        let table = read_table(&entry.path)?;
        info!(
            role = %role,
            episode = entry.episode,
            states = table.len(),
            path = %entry.path.display(),
            "loaded snapshot"
        );
        Ok(Some(Snapshot {
            episode: entry.episode,
            table,
            source: entry.path,
        }))
    }

    fn episodes(&self, role: RoleKind) -> Result<Vec<u64>> {
        let mut episodes: Vec<u64> = self.scan(role)?.into_iter().map(|e| e.episode).collect();
        episodes.sort_unstable();
        Ok(episodes)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::q_learning::SnapshotRow;

    fn table(value: f64) -> SnapshotTable {
        let mut table = SnapshotTable::new();
        table.insert(
            "close_right_above".to_string(),
            SnapshotRow(vec![("stay".to_string(), value)]),
        );
        table
    }

    #[test]
    fn test_missing_directory_is_cold_start() {
        let dir = TempDir::new().unwrap();
        let repo = JsonDirectoryRepository::new(dir.path().join("nowhere"));
        assert!(repo.latest(RoleKind::Ranged).unwrap().is_none());
        assert!(repo.episodes(RoleKind::Flyer).unwrap().is_empty());
    }

    #[test]
    fn test_latest_is_highest_episode() {
        let dir = TempDir::new().unwrap();
        let repo = JsonDirectoryRepository::new(dir.path());
        repo.save(RoleKind::Ranged, 5, &table(5.0)).unwrap();
        repo.save(RoleKind::Ranged, 12, &table(12.0)).unwrap();
        repo.save(RoleKind::Ranged, 7, &table(7.0)).unwrap();

        let latest = repo.latest(RoleKind::Ranged).unwrap().unwrap();
        assert_eq!(latest.episode, 12);
        assert_eq!(latest.table, table(12.0));
        assert_eq!(repo.episodes(RoleKind::Ranged).unwrap(), vec![5, 7, 12]);
    }

    #[test]
    fn test_roles_are_separate() {
        let dir = TempDir::new().unwrap();
        let repo = JsonDirectoryRepository::new(dir.path());
        repo.save(RoleKind::Flyer, 3, &table(1.0)).unwrap();
        assert!(dir.path().join("bird_q_tables/q_table_episode_3.json").is_file());
        assert!(repo.latest(RoleKind::Ranged).unwrap().is_none());
    }

    #[test]
    fn test_foreign_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        let repo = JsonDirectoryRepository::new(dir.path());
        repo.save(RoleKind::Ranged, 2, &table(2.0)).unwrap();
        let role_dir = repo.role_dir(RoleKind::Ranged);
        fs::write(role_dir.join("notes.txt"), "hello").unwrap();
        fs::write(role_dir.join("q_table_episode_99.json.tmp"), "{").unwrap();

        let latest = repo.latest(RoleKind::Ranged).unwrap().unwrap();
        assert_eq!(latest.episode, 2);
    }

    #[test]
    fn test_malformed_latest_names_the_file() {
        let dir = TempDir::new().unwrap();
        let repo = JsonDirectoryRepository::new(dir.path());
        repo.save(RoleKind::Ranged, 1, &table(1.0)).unwrap();
        let bad = repo.role_dir(RoleKind::Ranged).join("q_table_episode_4.json");
        fs::write(&bad, "{ not json").unwrap();

        let err = repo.latest(RoleKind::Ranged).unwrap_err();
        match err {
            Error::MalformedSnapshot { path, .. } => assert_eq!(path, bad),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_saved_file_is_pretty_printed() {
        let dir = TempDir::new().unwrap();
        let repo = JsonDirectoryRepository::new(dir.path());
        let path = repo.save(RoleKind::Flyer, 1, &table(0.5)).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.starts_with("{\n  \"close_right_above\": {\n    \"stay\": 0.5"));
    }
}
