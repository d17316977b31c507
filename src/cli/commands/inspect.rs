//! Inspect command - Summarize a role's latest snapshot

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::{App, ArenaConfig, SnapshotSummary},
    cli::output::{format_number, print_kv, print_section, print_subsection},
    ports::RoleKind,
};

#[derive(Parser, Debug)]
#[command(about = "Show the latest snapshot of a role")]
pub struct InspectArgs {
    /// Role to inspect (ranged, flyer)
    pub role: RoleKind,

    /// Root directory for snapshot directories
    #[arg(long, default_value = ".")]
    pub storage: PathBuf,

    /// Number of highest-valued states to list
    #[arg(long, short = 'n', default_value_t = 10)]
    pub top: usize,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Load the summary without printing.
pub fn run(args: &InspectArgs) -> Result<Option<SnapshotSummary>> {
    let config = ArenaConfig::default().with_storage_root(&args.storage);
    let app = App::from_config(&config);
    app.inspect(args.role, args.top)
        .with_context(|| format!("Failed to load {} snapshot", args.role))
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let Some(summary) = run(&args)? else {
        println!(
            "No {} snapshots under {}",
            args.role,
            args.storage.join(args.role.snapshot_dir()).display()
        );
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_section(&format!("Snapshot: {}", summary.role));
    print_kv("File", &summary.source.display().to_string());
    print_kv("Episode", &format_number(summary.episode));
    print_kv("States", &format_number(summary.states as u64));

    print_subsection(&format!("Top {} states", summary.top.len()));
    for state in &summary.top {
        println!("  {:60} {:16} {:>10.3}", state.state, state.action, state.value);
    }
    Ok(())
}
