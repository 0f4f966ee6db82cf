//! Event records as delivered by the GitHub events API

use crate::error::{EventError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// Format of `created_at` as emitted by the GitHub events API
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Upstream event identifier, kept in the JSON shape it arrived in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(id) => write!(f, "{id}"),
            EventId::Text(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        EventId::Text(id.to_string())
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        EventId::Number(id)
    }
}

/// Repository section of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoInfo {
    /// Full name (e.g., "rust-lang/rust")
    pub name: String,

    /// Remaining upstream fields (id, url, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One GitHub activity event
///
/// Only the fields this system reads are typed. Everything else the upstream
/// sends (actor, org, public, ...) lands in `extra` and is written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,

    #[serde(rename = "type")]
    pub event_type: String,

    pub repo: RepoInfo,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub payload: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Build a bare event with an empty payload
    pub fn new(
        id: impl Into<EventId>,
        event_type: impl Into<String>,
        repo_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            repo: RepoInfo { name: repo_name.into(), extra: Map::new() },
            created_at,
            payload: Value::Null,
            extra: Map::new(),
        }
    }

    /// Repository full name
    pub fn repo_name(&self) -> &str {
        &self.repo.name
    }

    /// Label used by the interval statistics, "Type - owner/repo"
    pub fn group_label(&self) -> String {
        format!("{} - {}", self.event_type, self.repo.name)
    }

    /// Decode a single JSON record
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| EventError::malformed_record(e.to_string()))
    }

    /// Decode a list of JSON records, skipping the ones that do not decode
    pub fn decode_lenient(values: Vec<Value>) -> Vec<Self> {
        let total = values.len();
        let events: Vec<Self> = values
            .into_iter()
            .filter_map(|value| match Self::from_value(value) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("Skipping event record: {}", e);
                    None
                }
            })
            .collect();

        if events.len() < total {
            warn!("Skipped {} of {} event records", total - events.len(), total);
        }
        events
    }
}

/// Parse an upstream timestamp. RFC 3339 is accepted as a fallback.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
        .map_err(|_| EventError::InvalidTimestamp(raw.to_string()))
}

mod timestamp {
    use super::{parse_timestamp, TIMESTAMP_FORMAT};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
