//! Signal handling for graceful shutdown

use anyhow::Result;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Setup signal handlers for graceful shutdown.
///
/// The returned receiver resolves on the first of Ctrl+C or SIGTERM.
pub fn setup_signal_handlers() -> Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    #[cfg(unix)]
    let sigterm = register_sigterm()?;

    tokio::spawn(async move {
        #[cfg(unix)]
        let terminate = wait_for_flag(sigterm);
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("Ctrl+C signal received"),
                Err(e) => error!("Failed to listen for Ctrl+C signal: {}", e),
            },
            _ = terminate => info!("SIGTERM signal received"),
        }

        let _ = shutdown_tx.send(());
    });

    Ok(shutdown_rx)
}

#[cfg(unix)]
fn register_sigterm() -> Result<std::sync::Arc<std::sync::atomic::AtomicBool>> {
    use signal_hook::consts::SIGTERM;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGTERM, flag.clone())?;
    Ok(flag)
}

#[cfg(unix)]
async fn wait_for_flag(flag: std::sync::Arc<std::sync::atomic::AtomicBool>) {
    use std::sync::atomic::Ordering;

    // Poll for signal
    while !flag.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Stop background work, waiting at most `shutdown_timeout` for each task
pub async fn graceful_shutdown(
    scheduler_handle: Option<JoinHandle<()>>,
    server_handle: JoinHandle<()>,
    shutdown_timeout: Duration,
) -> Result<()> {
    info!("Starting graceful shutdown...");

    // The scheduler loops forever; cancel it between runs.
    if let Some(handle) = scheduler_handle {
        handle.abort();
        match handle.await {
            Ok(()) => info!("Update scheduler stopped"),
            Err(e) if e.is_cancelled() => info!("Update scheduler stopped"),
            Err(e) => error!("Update scheduler task failed: {}", e),
        }
    }

    match timeout(shutdown_timeout, server_handle).await {
        Ok(Ok(())) => info!("HTTP server stopped gracefully"),
        Ok(Err(e)) => error!("HTTP server task failed: {}", e),
        Err(_) => warn!("HTTP server did not stop within timeout, forcing shutdown"),
    }

    info!("Graceful shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_graceful_shutdown_cancels_scheduler() {
        let scheduler = tokio::spawn(std::future::pending::<()>());
        let server = tokio::spawn(async {});

        graceful_shutdown(Some(scheduler), server, Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_graceful_shutdown_times_out_on_stuck_server() {
        let server = tokio::spawn(std::future::pending::<()>());

        graceful_shutdown(None, server, Duration::from_millis(10)).await.unwrap();
    }
}
