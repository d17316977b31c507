//! SARSA temporal difference learning
//!
//! Tabular, on-policy TD control. Each role owns a sparse Q-table keyed by
//! its structured state key; after every tick the previous state-action pair
//! is backed up toward the value of the pair that follows it:
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α [r + γ Q(s',a') − Q(s,a)]
//! ```
//!
//! Exploration is ε-greedy with multiplicative decay after every update.
//! Greedy ties resolve to the earliest action of the role's action space.

pub mod learner;
pub mod policy;
pub mod q_table;
pub mod serialization;

pub use learner::{LearningSchedule, SarsaLearner};
pub use policy::{ActionPolicy, EpsilonGreedy, first_max};
pub use q_table::QTable;
pub use serialization::{SnapshotRow, SnapshotTable};
