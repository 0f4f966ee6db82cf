//! Activity Fetcher
//!
//! This crate fetches repository activity events from the GitHub REST API.
//! Each repository gets one request for its most recent page of events. A
//! repository that fails (bad status, network error, undecodable body) is
//! logged and skipped; the rest of the batch still comes back.

pub mod config;
pub mod error;
pub mod fetcher;

pub use config::FetcherConfig;
pub use error::{FetchError, Result};
pub use fetcher::{EventSource, GitHubFetcher};
