//! Repository identifiers in `owner/name` form

use crate::error::{EventError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated `owner/name` repository identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoRef {
    owner: String,
    name: String,
}

impl RepoRef {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path segment used by the events endpoint
    pub fn events_path(&self) -> String {
        format!("repos/{}/{}/events", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = EventError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => {
                Ok(Self { owner: owner.to_string(), name: name.to_string() })
            }
            _ => Err(EventError::invalid_repository(raw)),
        }
    }
}

impl TryFrom<String> for RepoRef {
    type Error = EventError;

    fn try_from(raw: String) -> Result<Self> {
        raw.parse()
    }
}

impl From<RepoRef> for String {
    fn from(repo: RepoRef) -> Self {
        repo.to_string()
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Validate a list of repository identifiers, stopping at the first malformed one
pub fn parse_repositories<S: AsRef<str>>(repos: &[S]) -> Result<Vec<RepoRef>> {
    repos.iter().map(|repo| repo.as_ref().parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_and_name() {
        let repo: RepoRef = "tokio-rs/tokio".parse().unwrap();
        assert_eq!(repo.owner(), "tokio-rs");
        assert_eq!(repo.name(), "tokio");
        assert_eq!(repo.to_string(), "tokio-rs/tokio");
        assert_eq!(repo.events_path(), "repos/tokio-rs/tokio/events");
    }

    #[test]
    fn test_reject_malformed() {
        for raw in ["not-a-repo", "a/b/c", "/name", "owner/", ""] {
            let err = raw.parse::<RepoRef>().unwrap_err();
            assert_eq!(err, EventError::InvalidRepository(raw.to_string()));
        }
    }

    #[test]
    fn test_error_message() {
        let err = "not-a-repo".parse::<RepoRef>().unwrap_err();
        assert_eq!(err.to_string(), "invalid format: not-a-repo. Use 'owner/repo'.");
    }

    #[test]
    fn test_parse_repositories_stops_at_first_bad_entry() {
        let repos = vec!["a/b".to_string(), "bad".to_string(), "also-bad".to_string()];
        let err = parse_repositories(&repos).unwrap_err();
        assert_eq!(err, EventError::InvalidRepository("bad".to_string()));

        let parsed = parse_repositories(&["a/b", "c/d"]).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_serde_as_string() {
        let repo: RepoRef = serde_json::from_str("\"serde-rs/serde\"").unwrap();
        assert_eq!(repo.name(), "serde");
        assert_eq!(serde_json::to_string(&repo).unwrap(), "\"serde-rs/serde\"");
        assert!(serde_json::from_str::<RepoRef>("\"serde\"").is_err());
    }
}
