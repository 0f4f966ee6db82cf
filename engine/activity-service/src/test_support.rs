//! Canned event source for unit tests

use activity_events::Event;
use activity_fetcher::{EventSource, FetchError};
use activity_store::{EventStore, StoreError};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Event source answering from a fixed map of repository -> events
#[derive(Default)]
pub struct StubSource {
    events: HashMap<String, Vec<Event>>,
    calls: Mutex<Vec<(Vec<String>, u32)>>,
    failing: bool,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, repo: &str, events: Vec<Event>) -> Self {
        self.events.insert(repo.to_string(), events);
        self
    }

    /// Every fetch returns an error
    pub fn failing() -> Self {
        Self { failing: true, ..Self::default() }
    }

    /// Repository lists and page sizes seen so far
    pub fn calls(&self) -> Vec<(Vec<String>, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl EventSource for StubSource {
    async fn fetch_events(
        &self,
        repositories: &[String],
        per_page: u32,
    ) -> activity_fetcher::Result<Vec<Event>> {
        self.calls.lock().unwrap().push((repositories.to_vec(), per_page));

        if self.failing {
            return Err(FetchError::Config("upstream unavailable".to_string()));
        }

        Ok(repositories
            .iter()
            .flat_map(|repo| self.events.get(repo).cloned().unwrap_or_default())
            .collect())
    }
}

/// Store that loads nothing and refuses every save
pub struct FailingStore;

#[async_trait::async_trait]
impl EventStore for FailingStore {
    async fn load(&self) -> Vec<Event> {
        Vec::new()
    }

    async fn save(&self, _events: &[Event]) -> activity_store::Result<()> {
        Err(StoreError::config("disk full"))
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn event_at(id: &str, event_type: &str, repo: &str, created_at: DateTime<Utc>) -> Event {
    Event::new(id, event_type, repo, created_at)
}

/// Newest-first events for a repository, one per hour going back from `anchor`
pub fn hourly_events(prefix: &str, repo: &str, count: i64, anchor: DateTime<Utc>) -> Vec<Event> {
    (0..count)
        .map(|i| {
            event_at(
                &format!("{prefix}{i}"),
                "PushEvent",
                repo,
                anchor - Duration::hours(i),
            )
        })
        .collect()
}
