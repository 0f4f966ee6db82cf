//! # Event Store
//!
//! Persistence for the deduplicated activity event collection.
//!
//! ## Architecture
//!
//! - **EventStore**: Abstract trait for storage backends
//! - **JsonFileStore**: One pretty-printed JSON file, fully rewritten on every save
//! - **InMemoryStore**: Process-local backend for tests and dry runs
//!
//! Loading never fails: a missing, unreadable or malformed file yields an
//! empty collection and a warning in the log.
//!
//! ## Usage
//!
//! ```rust
//! use activity_store::{create_local_store, EventStore};
//! use tempfile::TempDir;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let temp_dir = TempDir::new()?;
//!     let store = create_local_store(temp_dir.path().join("events.json"))?;
//!
//!     let events = store.load().await;
//!     assert!(events.is_empty());
//!     store.save(&events).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod local;

pub use backend::{EventStore, InMemoryStore, JsonFileStore};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use local::{create_local_store, create_local_store_with_config};
