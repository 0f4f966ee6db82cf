//! Repository Activity Service
//!
//! Serves the activity REST API, optionally polls the configured repositories
//! in the background, and shuts down gracefully on Ctrl+C or SIGTERM.

use activity_service::{
    graceful_shutdown, initialize_logging_with_config, load_configuration, setup_signal_handlers,
    ServiceState,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::oneshot;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "activity-service")]
#[command(about = "HTTP service tracking GitHub repository activity")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides configuration)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env before reading any configuration
    let dotenv_result = dotenv::dotenv();

    // Load configuration
    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Keep the guard alive so file logs are flushed on exit
    let _log_guard = initialize_logging_with_config(&config.logging)?;

    info!("Starting Repository Activity Service v{}", env!("CARGO_PKG_VERSION"));
    if let Err(e) = dotenv_result {
        if !e.not_found() {
            warn!("Failed to load .env file: {}", e);
        }
    }

    // Create service state
    let service_state = ServiceState::new(config).context("Failed to initialize service")?;
    info!("Service state initialized");

    // Setup signal handlers for graceful shutdown
    let shutdown_signal = setup_signal_handlers()?;
    info!("Signal handlers configured");

    // Start the HTTP server
    let (server_shutdown_tx, server_shutdown_rx) = oneshot::channel::<()>();
    let (addr, server_handle) = service_state.start_server(async move {
        let _ = server_shutdown_rx.await;
    })?;

    // Start the update scheduler
    let scheduler_handle = service_state.start_scheduler();

    // Wait for shutdown signal
    info!("Repository Activity Service is running on {}. Press Ctrl+C to shutdown gracefully.", addr);
    let _ = shutdown_signal.await;

    // Graceful shutdown
    info!("Shutdown signal received. Initiating graceful shutdown...");
    let _ = server_shutdown_tx.send(());
    graceful_shutdown(
        scheduler_handle,
        server_handle,
        service_state.config.server.shutdown_timeout(),
    )
    .await?;

    info!("Repository Activity Service shutdown complete");
    Ok(())
}
