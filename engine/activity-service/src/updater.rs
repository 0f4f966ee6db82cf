//! Update orchestration: fetch new events, merge them into the store

use activity_events::{
    deduplicate, filter_recent, newer_than, parse_repositories, Event, EventError,
};
use activity_fetcher::{EventSource, FetchError};
use activity_store::{EventStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Message returned by a successful update
pub const UPDATE_MESSAGE: &str = "Events updated!";

/// Result of an update run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub message: String,
    pub new_events_count: usize,
    pub repositories_updated: usize,
}

impl UpdateSummary {
    /// Summary reported when the run was refused
    pub fn rejected(message: impl Into<String>) -> Self {
        Self { message: message.into(), new_events_count: 0, repositories_updated: 0 }
    }
}

/// Errors that stop an update run
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error(transparent)]
    InvalidRepository(#[from] EventError),

    #[error("Error fetching events: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to save events: {0}")]
    Store(#[from] StoreError),
}

/// Fetches events from a source and merges them into a store
pub struct EventUpdater {
    source: Arc<dyn EventSource>,
    store: Arc<dyn EventStore>,
    per_page: u32,
}

impl EventUpdater {
    /// Create a new updater
    pub fn new(source: Arc<dyn EventSource>, store: Arc<dyn EventStore>, per_page: u32) -> Self {
        Self { source, store, per_page }
    }

    /// Get the backing store
    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// Page size used for update runs
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Fetch events without touching the store
    pub async fn fetch(&self, repositories: &[String], per_page: u32) -> Result<Vec<Event>, FetchError> {
        self.source.fetch_events(repositories, per_page).await
    }

    /// Fetch events newer than `latest_known` for every repository, merge them
    /// into the stored collection and save it.
    ///
    /// The whole list is validated before anything is fetched; the first
    /// malformed entry aborts the run.
    pub async fn update(
        &self,
        repositories: &[String],
        latest_known: Option<DateTime<Utc>>,
    ) -> Result<UpdateSummary, UpdateError> {
        let repos = parse_repositories(repositories)?;

        let mut new_events = Vec::new();
        for repo in &repos {
            let fetched = self.source.fetch_events(&[repo.to_string()], self.per_page).await?;
            let fresh = match latest_known {
                Some(since) => newer_than(fetched, since),
                None => fetched,
            };

            info!("Repository {} has {} new events", repo, fresh.len());
            new_events.extend(fresh);
        }

        let new_events_count = new_events.len();
        let stored = self.store.load().await;
        let merged = deduplicate(stored, new_events);
        self.store.save(&merged).await?;

        info!(
            "Update stored {} events ({} new from {} repositories)",
            merged.len(),
            new_events_count,
            repositories.len()
        );

        Ok(UpdateSummary {
            message: UPDATE_MESSAGE.to_string(),
            new_events_count,
            repositories_updated: repositories.len(),
        })
    }

    /// [`update`](Self::update) using the newest stored event as the cutoff
    pub async fn update_from_store(&self, repositories: &[String]) -> Result<UpdateSummary, UpdateError> {
        let latest_known = self.store.latest_timestamp().await;
        self.update(repositories, latest_known).await
    }

    /// One-shot ingestion: fetch, prepend to the stored events, keep only the
    /// window and save that subset. Returns the number of events kept.
    pub async fn ingest_recent(
        &self,
        repositories: &[String],
        days: i64,
        max_events: usize,
    ) -> Result<usize, UpdateError> {
        parse_repositories(repositories)?;

        let stored = self.store.load().await;
        let fetched = self.source.fetch_events(repositories, self.per_page).await?;
        info!("Fetched {} events, {} already stored", fetched.len(), stored.len());

        // First position wins the slot, so fetched events keep their lead.
        let combined = deduplicate(fetched, stored);
        let kept = filter_recent(combined, days, max_events);
        self.store.save(&kept).await?;

        Ok(kept.len())
    }
}
