use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use progress_sync::{Demo, LabelTable, RunConfig};

/// Report a worker's progress from a polling monitor thread.
#[derive(Debug, Parser)]
#[command(name = "progress-sync", version)]
struct Cli {
    /// Synchronization strategy to demonstrate
    #[arg(value_enum, default_value_t = Demo::Mutex)]
    demo: Demo,

    /// Number of steps the worker performs
    #[arg(long, default_value_t = 1000)]
    steps: usize,

    /// Duration of one worker step, in milliseconds
    #[arg(long, default_value_t = 15)]
    step_ms: u64,

    /// Monitor polling interval, in milliseconds
    #[arg(long, default_value_t = 1000)]
    poll_ms: u64,

    /// Comma-separated phase labels for the labelled demos
    #[arg(long, value_delimiter = ',')]
    labels: Vec<String>,

    /// Wait for the worker's first step before printing
    #[arg(long)]
    await_first: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let labels = if cli.labels.is_empty() {
        LabelTable::default()
    } else {
        LabelTable::new(cli.labels).context("invalid --labels")?
    };

    let config = RunConfig {
        max_steps: cli.steps,
        step_duration: Duration::from_millis(cli.step_ms),
        poll_interval: Duration::from_millis(cli.poll_ms),
        await_first_publish: cli.await_first,
    };

    info!("demo {} with {} labels", cli.demo, labels.len());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli.demo
        .run(&config, &labels, &mut out)
        .with_context(|| format!("demo {} failed", cli.demo))?;
    Ok(())
}
