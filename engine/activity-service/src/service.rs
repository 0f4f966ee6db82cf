//! Service state management
//!
//! Wires the GitHub client and the JSON file store into one [`EventUpdater`]
//! shared by the HTTP routes and the update scheduler.

use crate::config::ServiceConfig;
use crate::rest_api::create_routes;
use crate::scheduler::UpdateScheduler;
use crate::updater::EventUpdater;
use activity_fetcher::{EventSource, GitHubFetcher};
use activity_store::{create_local_store_with_config, EventStore};
use anyhow::{Context, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Service state containing the shared components
pub struct ServiceState {
    pub config: ServiceConfig,
    updater: Arc<EventUpdater>,
}

impl ServiceState {
    /// Create service state backed by the configured file store and GitHub API
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let store = create_local_store_with_config(config.store.clone())
            .context("Failed to initialize event store")?;
        info!("Event store initialized at {:?}", store.path());

        let fetcher = GitHubFetcher::new(config.fetcher.clone())
            .context("Failed to initialize GitHub client")?;
        info!("GitHub client initialized for {}", config.fetcher.api_base_url);

        Ok(Self::with_components(config, Arc::new(fetcher), Arc::new(store)))
    }

    /// Create service state from explicit components
    pub fn with_components(
        config: ServiceConfig,
        source: Arc<dyn EventSource>,
        store: Arc<dyn EventStore>,
    ) -> Self {
        let per_page = config.fetcher.default_per_page;
        let updater = Arc::new(EventUpdater::new(source, store, per_page));
        Self { config, updater }
    }

    /// Get the shared updater
    pub fn updater(&self) -> Arc<EventUpdater> {
        self.updater.clone()
    }

    /// Start the update scheduler if it is enabled
    pub fn start_scheduler(&self) -> Option<JoinHandle<()>> {
        if !self.config.scheduler.enabled {
            info!("Update scheduler disabled");
            return None;
        }

        let scheduler = UpdateScheduler::new(self.config.scheduler.clone(), self.updater());
        Some(scheduler.start())
    }

    /// Bind the HTTP server and run it until `shutdown` resolves.
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port 0 is requested.
    pub fn start_server<F>(&self, shutdown: F) -> Result<(SocketAddr, JoinHandle<()>)>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.server.socket_addr()?;
        self.start_server_on(addr, shutdown)
    }

    fn start_server_on<F>(
        &self,
        addr: SocketAddr,
        shutdown: F,
    ) -> Result<(SocketAddr, JoinHandle<()>)>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let routes = create_routes(self.updater());
        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .with_context(|| format!("Failed to bind HTTP server to {addr}"))?;

        info!("HTTP server listening on http://{}", bound);
        Ok((bound, tokio::spawn(server)))
    }
}
