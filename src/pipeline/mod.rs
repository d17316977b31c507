//! Training pipeline
//!
//! This module provides:
//! - The episode loop driving every controller against one environment
//! - Checkpointing through the snapshot repository
//! - Observers recording progress, metrics and reward history

pub mod observers;
pub mod training;

pub use observers::{
    HistoryRecord, JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver,
    RewardHistoryObserver, RoleMetrics,
};
pub use training::{RoleResult, TrainingConfig, TrainingOrchestrator, TrainingResult};

pub use crate::ports::Observer;
