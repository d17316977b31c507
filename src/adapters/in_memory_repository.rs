//! In-memory snapshot repository for testing.
//!
//! This adapter provides a pure in-memory implementation of
//! SnapshotRepository, enabling fast tests without any file system I/O.

use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    Result,
    ports::{RoleKind, Snapshot, SnapshotRepository, snapshot_file_name},
    q_learning::{SnapshotTable, serialization::parse_table},
};

type Storage = BTreeMap<(RoleKind, u64), Vec<u8>>;

/// In-memory repository for testing.
///
/// Snapshots are stored as the same JSON bytes the directory repository
/// writes, so malformed content is detected the same way.
///
/// # Examples
///
/// ```
/// use sarsa_arena::{
///     adapters::InMemoryRepository,
///     ports::{RoleKind, SnapshotRepository},
///     q_learning::SnapshotTable,
/// };
///
/// let repo = InMemoryRepository::new();
/// repo.save(RoleKind::Ranged, 10, &SnapshotTable::new())?;
/// assert_eq!(repo.latest(RoleKind::Ranged)?.map(|s| s.episode), Some(10));
/// # Ok::<(), sarsa_arena::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<Storage>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, Storage> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of snapshots stored across all roles.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Clear all stored snapshots.
    pub fn clear(&self) {
        self.storage().clear();
    }

    pub fn contains(&self, role: RoleKind, episode: u64) -> bool {
        self.storage().contains_key(&(role, episode))
    }

    /// Store raw bytes as a snapshot, bypassing serialization.
    ///
    /// Useful for testing how corrupted snapshots are reported.
    pub fn insert_raw(&self, role: RoleKind, episode: u64, bytes: impl Into<Vec<u8>>) {
        self.storage().insert((role, episode), bytes.into());
    }

    fn location(role: RoleKind, episode: u64) -> PathBuf {
        PathBuf::from("memory")
            .join(role.snapshot_dir())
            .join(snapshot_file_name(episode))
    }
}

impl SnapshotRepository for InMemoryRepository {
    fn save(&self, role: RoleKind, episode: u64, table: &SnapshotTable) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(table)?;
        self.storage().insert((role, episode), bytes);
        Ok(Self::location(role, episode))
    }

    fn latest(&self, role: RoleKind) -> Result<Option<Snapshot>> {
        let storage = self.storage();
        let newest = storage.range((role, 0)..=(role, u64::MAX)).next_back();
        let Some(((_, episode), bytes)) = newest else {
            return Ok(None);
        };
        let source = Self::location(role, *episode);
        let table = parse_table(bytes.as_slice(), &source)?;
        Ok(Some(Snapshot {
            episode: *episode,
            table,
            source,
        }))
    }

    fn episodes(&self, role: RoleKind) -> Result<Vec<u64>> {
        Ok(self
            .storage()
            .range((role, 0)..=(role, u64::MAX))
            .map(|((_, episode), _)| *episode)
            .collect())
    }
}
