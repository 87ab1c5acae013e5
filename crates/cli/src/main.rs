//! Bundlewatch CLI - bw command

use clap::Parser;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use watcher::{ChangeCoalescer, ChangeFilter, ProjectWatchers, WatcherConfig};

mod trigger;

/// Bundlewatch - debounced rebuild notifications for bundler projects
#[derive(Parser)]
#[command(name = "bw")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project root directories to watch
    #[arg(required = true)]
    roots: Vec<PathBuf>,

    /// Bundler config file for all roots (default: <root>/bundleconfig.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Watcher configuration file (TOML)
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Quiet interval in milliseconds (overrides the config file)
    #[arg(long)]
    quiet_ms: Option<u64>,

    /// Command to run on each flush; {config} and {file} are substituted
    #[arg(long)]
    exec: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = match &cli.config_file {
        Some(path) => WatcherConfig::load(path)?,
        None => WatcherConfig::default(),
    };
    if let Some(ms) = cli.quiet_ms {
        config.quiet_interval_millis = ms;
    }

    let coalescer = Arc::new(ChangeCoalescer::new(config.quiet_interval()));
    let filter = ChangeFilter::new(config.filter.clone());
    let watchers = ProjectWatchers::new(Arc::clone(&coalescer), filter);

    for root in &cli.roots {
        let root = root
            .canonicalize()
            .with_context(|| format!("resolving project root {}", root.display()))?;
        let config_path = match &cli.config {
            Some(path) => path.clone(),
            None => root.join("bundleconfig.json"),
        };
        if !config_path.is_file() {
            bail!("no bundler config at {}", config_path.display());
        }
        watchers.add_project(&root, &config_path)?;
    }

    coalescer.start(trigger::from_exec(cli.exec));

    info!(
        "Watching {} project(s), quiet interval {}ms. Ctrl-C to stop.",
        watchers.watched_count(),
        config.quiet_interval_millis
    );

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;

    // Shutdown does not drain: pending changes are dropped with the watchers.
    coalescer.stop();
    watchers.clear();

    Ok(())
}
