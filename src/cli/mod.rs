//! CLI infrastructure for the arena trainer
//!
//! This module provides the command-line interface for training agents and
//! inspecting the snapshots they leave behind.

pub mod commands;
pub mod output;
