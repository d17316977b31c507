//! Repository port for Q-table snapshot persistence.
//!
//! This module defines the trait boundary between the learning engine and
//! the storage that keeps versioned Q-table snapshots between runs.

use std::path::PathBuf;

use crate::{Result, ports::RoleKind, q_learning::SnapshotTable};

/// Prefix of every snapshot file name.
pub const SNAPSHOT_PREFIX: &str = "q_table_episode_";
/// Extension of every snapshot file name.
pub const SNAPSHOT_EXTENSION: &str = "json";

/// File name of the snapshot taken at `episode`.
pub fn snapshot_file_name(episode: u64) -> String {
    format!("{SNAPSHOT_PREFIX}{episode}.{SNAPSHOT_EXTENSION}")
}

/// Episode number encoded in a snapshot file name, if the name matches
/// `q_table_episode_<N>.json`.
pub fn parse_snapshot_file_name(name: &str) -> Option<u64> {
    let digits = name
        .strip_prefix(SNAPSHOT_PREFIX)?
        .strip_suffix(SNAPSHOT_EXTENSION)?
        .strip_suffix('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// A stored snapshot and the episode count it was taken at.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub episode: u64,
    pub table: SnapshotTable,
    /// Where the snapshot came from, used to label load errors.
    pub source: PathBuf,
}

/// Port for persisting and loading role Q-table snapshots.
///
/// Snapshots are immutable once written. Each save creates a new version
/// named after the episode count; loading picks the most recent one.
///
/// # Examples
///
/// ```no_run
/// use sarsa_arena::{
///     adapters::JsonDirectoryRepository,
///     ports::{RoleKind, SnapshotRepository},
/// };
///
/// let repo = JsonDirectoryRepository::new("training_data");
/// match repo.latest(RoleKind::Ranged)? {
///     Some(snapshot) => println!("resuming at episode {}", snapshot.episode + 1),
///     None => println!("cold start"),
/// }
/// # Ok::<(), sarsa_arena::Error>(())
/// ```
pub trait SnapshotRepository: Send + Sync {
    /// Persist `table` as the snapshot for `role` at `episode`.
    ///
    /// Returns the location written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The role directory cannot be created
    /// - The file cannot be written or flushed
    /// - Serialization fails
    fn save(&self, role: RoleKind, episode: u64, table: &SnapshotTable) -> Result<PathBuf>;

    /// Load the most recent snapshot for `role`.
    ///
    /// The most recent snapshot is the one with the highest episode number.
    /// Returns `Ok(None)` when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The latest snapshot cannot be read
    /// - Its content is not a valid snapshot
    fn latest(&self, role: RoleKind) -> Result<Option<Snapshot>>;

    /// Episode numbers of every stored snapshot for `role`, ascending.
    fn episodes(&self, role: RoleKind) -> Result<Vec<u64>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_roundtrip() {
        assert_eq!(snapshot_file_name(12), "q_table_episode_12.json");
        assert_eq!(parse_snapshot_file_name("q_table_episode_12.json"), Some(12));
    }

    #[test]
    fn test_non_matching_names_are_ignored() {
        for name in [
            "q_table_episode_.json",
            "q_table_episode_12.json.bak",
            "q_table_episode_-3.json",
            "q_table_episode_1a.json",
            "q_table_episode_7json",
            "notes.txt",
        ] {
            assert_eq!(parse_snapshot_file_name(name), None, "{name}");
        }
    }
}
