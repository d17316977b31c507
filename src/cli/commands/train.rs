//! Train command - Run SARSA training episodes for arena agents

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::{App, ArenaConfig},
    cli::output::{format_number, print_kv, print_section, print_stats_table, print_subsection},
    env::ProtagonistKind,
    pipeline::{
        JsonlObserver, ProgressObserver, RewardHistoryObserver, TrainingOrchestrator,
        TrainingResult,
    },
    ports::RoleKind,
};

#[derive(Parser, Debug)]
#[command(about = "Train arena agents with SARSA")]
pub struct TrainArgs {
    /// Roles to train, comma separated (ranged, flyer)
    #[arg(long, value_delimiter = ',')]
    pub roles: Option<Vec<RoleKind>>,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Tick cap per episode
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Save a snapshot every this many episodes
    #[arg(long)]
    pub checkpoint_interval: Option<u64>,

    /// Log a progress report every this many episodes
    #[arg(long)]
    pub report_interval: Option<usize>,

    /// Scripted protagonist behaviour (patrol, hunter, stationary)
    #[arg(long)]
    pub protagonist: Option<ProtagonistKind>,

    /// Root directory for snapshot directories
    #[arg(long)]
    pub storage: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON configuration file; flags override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Decay the learning rate after every update
    #[arg(long)]
    pub alpha_decay: bool,

    /// Optional file for JSONL episode reports
    #[arg(long)]
    pub jsonl: Option<PathBuf>,

    /// Optional CSV file for per-episode reward history
    #[arg(long)]
    pub history_csv: Option<PathBuf>,

    /// Optional path for writing the training result as JSON
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,
}

impl TrainArgs {
    /// Merge the configuration file (if any) with command-line overrides.
    pub fn resolve_config(&self) -> Result<ArenaConfig> {
        let mut config = match &self.config {
            Some(path) => ArenaConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ArenaConfig::default(),
        };

        if let Some(roles) = &self.roles {
            config.roles = roles.clone();
        }
        if let Some(episodes) = self.episodes {
            config.training.num_episodes = episodes;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.training.max_ticks = max_ticks;
        }
        if let Some(interval) = self.checkpoint_interval {
            config.training.checkpoint_interval = interval;
        }
        if let Some(interval) = self.report_interval {
            config.training.report_interval = interval;
        }
        if let Some(protagonist) = self.protagonist {
            config.training.protagonist = protagonist;
        }
        if let Some(storage) = &self.storage {
            config.storage.root = storage.clone();
        }
        if let Some(seed) = self.seed {
            config.training.seed = Some(seed);
        }
        if self.alpha_decay {
            config.learning.alpha_decay_enabled = true;
        }

        config.validate().context("Invalid training configuration")?;
        Ok(config)
    }

    fn attach_observers(
        &self,
        mut orchestrator: TrainingOrchestrator,
    ) -> Result<TrainingOrchestrator> {
        if self.progress {
            orchestrator = orchestrator.with_observer(Box::new(ProgressObserver::new()));
        }
        if let Some(path) = &self.jsonl {
            let observer = JsonlObserver::new(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            orchestrator = orchestrator.with_observer(Box::new(observer));
        }
        if let Some(path) = &self.history_csv {
            let observer = RewardHistoryObserver::new(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            orchestrator = orchestrator.with_observer(Box::new(observer));
        }
        Ok(orchestrator)
    }
}

/// Run training and return its result without printing.
pub fn run(args: &TrainArgs) -> Result<TrainingResult> {
    let config = args.resolve_config()?;
    let app = App::from_config(&config);

    let mut controllers = app
        .create_controllers(&config)
        .context("Failed to restore controllers from snapshots")?;
    let mut env = app.create_environment(&config.training);
    let mut orchestrator =
        args.attach_observers(app.create_orchestrator(config.training.clone()))?;

    let result = orchestrator
        .run(&mut env, &mut controllers)
        .context("Training aborted")?;

    if let Some(path) = &args.summary {
        result
            .save(path)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
    }
    Ok(result)
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let result = run(&args)?;

    print_section("Training complete");
    print_stats_table(&[
        ("Episodes", format_number(result.episodes as u64)),
        ("Ticks", format_number(result.total_ticks)),
        ("Defeats", format_number(result.protagonist_defeats as u64)),
        ("Elapsed", format!("{:.1}s", result.elapsed_seconds)),
    ]);

    for role in &result.roles {
        print_subsection(&format!("Role: {}", role.role));
        print_kv(
            "Episodes",
            &format!("{} → {}", role.first_episode, role.last_episode),
        );
        print_kv("Updates", &format_number(role.total_updates));
        print_kv("States", &format_number(role.table_size as u64));
        print_kv("Mean reward", &format!("{:.2}", role.mean_reward));
        print_kv("Epsilon", &format!("{:.6}", role.final_epsilon));
        print_kv("Alpha", &format!("{:.6}", role.final_alpha));
    }

    if let Some(path) = &args.summary {
        println!("\nSummary written to {}", path.display());
    }
    Ok(())
}
