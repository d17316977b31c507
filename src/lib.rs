//! Tabular SARSA agents for a 2D arena
//!
//! This crate provides:
//! - A deterministic arena simulation with a scripted protagonist
//! - Discrete state encoders and reward models for the ranged archer and the flyer bird
//! - Sparse Q-tables trained with on-policy SARSA and ε-greedy exploration
//! - JSON snapshots that let training resume across runs
//! - A training orchestrator with pluggable observers and a CLI

pub mod actions;
pub mod adapters;
pub mod app;
pub mod cli;
pub mod controller;
pub mod encoding;
pub mod env;
pub mod error;
pub mod labels;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod reward;
pub mod roles;

pub use controller::{AgentController, Controller, ControllerStats};
pub use error::{Error, Result};
pub use ports::RoleKind;
pub use q_learning::{LearningSchedule, QTable, SarsaLearner};
