//! One-shot ingestion: fetch recent events for a set of repositories, merge
//! them with the stored events and keep only the recent window.

use activity_events::{RepoRef, DEFAULT_MAX_EVENTS};
use activity_fetcher::GitHubFetcher;
use activity_service::{initialize_logging_with_config, load_configuration, EventUpdater};
use activity_store::create_local_store_with_config;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Default window for ingestion, in days
const DEFAULT_INGEST_DAYS: i64 = 100;

#[derive(Parser)]
#[command(name = "ingest-events")]
#[command(about = "Fetch recent repository events and trim the event store")]
struct Cli {
    /// Repository to fetch, as owner/repo (repeatable)
    #[arg(short, long = "repo", required = true)]
    repos: Vec<RepoRef>,

    /// Keep events from the last N days
    #[arg(short, long, default_value_t = DEFAULT_INGEST_DAYS)]
    days: i64,

    /// Keep at most N events
    #[arg(short, long, default_value_t = DEFAULT_MAX_EVENTS)]
    max_events: usize,

    /// Event store file (overrides configuration)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Events requested per repository (overrides configuration)
    #[arg(long)]
    per_page: Option<u32>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _ = dotenv::dotenv();

    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(path) = cli.store {
        config.store.path = path;
    }
    let per_page = cli.per_page.unwrap_or(config.fetcher.default_per_page);

    let _log_guard = initialize_logging_with_config(&config.logging)?;

    let store = create_local_store_with_config(config.store.clone())
        .context("Failed to initialize event store")?;
    let fetcher =
        GitHubFetcher::new(config.fetcher.clone()).context("Failed to initialize GitHub client")?;
    let updater = EventUpdater::new(Arc::new(fetcher), Arc::new(store), per_page);

    let repositories: Vec<String> = cli.repos.iter().map(ToString::to_string).collect();
    info!(
        "Ingesting events for {} repositories (days={}, max_events={})",
        repositories.len(),
        cli.days,
        cli.max_events
    );

    let stored = updater
        .ingest_recent(&repositories, cli.days, cli.max_events)
        .await
        .context("Failed to ingest events")?;

    println!("Number of stored events: {stored}");
    Ok(())
}
