//! Ports (trait boundaries) for external dependencies.
//!
//! This module defines the interfaces between the learning engine and the
//! things around it: the characters it controls, the storage that keeps its
//! Q-tables, and whoever watches training. Adapters implement them.

pub mod observer;
pub mod repository;
pub mod role;

pub use observer::{EpisodeReport, Observer, RoleEpisode};
pub use repository::{Snapshot, SnapshotRepository, parse_snapshot_file_name, snapshot_file_name};
pub use role::{Role, RoleKind};
