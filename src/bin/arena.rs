//! Arena CLI - Train and inspect tabular SARSA agents
//!
//! This CLI provides:
//! - Training the ranged and flyer agents against a scripted protagonist
//! - Inspecting the Q-table snapshots they persist

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arena")]
#[command(version, about = "Tabular SARSA training for arena agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train agents, resuming from their latest snapshots
    Train(Box<sarsa_arena::cli::commands::train::TrainArgs>),

    /// Summarize a role's latest snapshot
    Inspect(sarsa_arena::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => sarsa_arena::cli::commands::train::execute(*args),
        Commands::Inspect(args) => sarsa_arena::cli::commands::inspect::execute(args),
    }
}
