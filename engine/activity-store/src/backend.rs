//! Event store trait and implementations

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use activity_events::{latest_timestamp, Event};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Abstract trait for event store backends
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// Load the full collection. Absent or corrupt storage yields an empty list.
    async fn load(&self) -> Vec<Event>;

    /// Replace the full collection
    async fn save(&self, events: &[Event]) -> Result<()>;

    /// Most recent `created_at` in the stored collection
    async fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        latest_timestamp(&self.load().await)
    }
}

/// JSON file backend
pub struct JsonFileStore {
    config: StoreConfig,
}

impl JsonFileStore {
    /// Create a new file store
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate().map_err(StoreError::config)?;
        Ok(Self { config })
    }

    /// Get the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the backing file
    pub fn path(&self) -> &PathBuf {
        &self.config.path
    }
}

/// Decode the stored document. Anything but a list of objects is corrupt.
fn decode_document(content: &str, path: &Path) -> Vec<Event> {
    let document: Value = match serde_json::from_str(content) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("Failed to decode event store {:?}: {}", path, e);
            return Vec::new();
        }
    };

    match document {
        Value::Array(records) if records.iter().all(Value::is_object) => {
            Event::decode_lenient(records)
        }
        _ => {
            tracing::warn!("Invalid format in event store {:?}, expected a list of records", path);
            Vec::new()
        }
    }
}

/// Pretty-print with a four space indent
fn encode_document(events: &[Event]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    events.serialize(&mut serializer)?;
    Ok(buffer)
}

#[async_trait::async_trait]
impl EventStore for JsonFileStore {
    async fn load(&self) -> Vec<Event> {
        let path = &self.config.path;

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Event store {:?} does not exist yet", path);
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Failed to read event store {:?}: {}", path, e);
                return Vec::new();
            }
        };

        let events = decode_document(&content, path);
        tracing::debug!("Loaded {} events from {:?}", events.len(), path);
        events
    }

    async fn save(&self, events: &[Event]) -> Result<()> {
        let path = &self.config.path;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let encoded = encode_document(events)?;
        let temp_path = self.config.temp_path();
        tokio::fs::write(&temp_path, encoded).await?;
        tokio::fs::rename(&temp_path, path).await?;

        tracing::info!("Saved {} events to {:?}", events.len(), path);
        Ok(())
    }
}

/// In-memory event store (for testing)
#[derive(Clone, Default)]
pub struct InMemoryStore {
    events: Arc<Mutex<Vec<Event>>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with events
    pub fn with_events(events: Vec<Event>) -> Self {
        Self { events: Arc::new(Mutex::new(events)) }
    }
}

#[async_trait::async_trait]
impl EventStore for InMemoryStore {
    async fn load(&self) -> Vec<Event> {
        self.events.lock().await.clone()
    }

    async fn save(&self, events: &[Event]) -> Result<()> {
        *self.events.lock().await = events.to_vec();
        Ok(())
    }
}
