//! Activity Events - GitHub repository activity records
//!
//! This crate holds the event model shared by the store, the fetcher and the
//! service, together with the processing applied to event collections:
//!
//! - **Windowing**: recency + count bound for the read path
//! - **Deduplication**: merge by event id, last write wins
//! - **Average interval**: mean seconds between events per (type, repository)

pub mod error;
pub mod models;
pub mod processor;
pub mod repo;

pub use error::{EventError, Result};
pub use models::{Event, EventId, RepoInfo, TIMESTAMP_FORMAT};
pub use processor::{
    average_interval, deduplicate, filter_recent, filter_recent_at, latest_timestamp, newer_than,
};
pub use repo::{parse_repositories, RepoRef};

/// Default recency window for the read path, in days
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Default cap on events returned by the read path
pub const DEFAULT_MAX_EVENTS: usize = 500;

/// Default number of events requested per repository
pub const DEFAULT_PER_PAGE: u32 = 100;
