//! Configuration for the event store

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the event file
pub const DEFAULT_STORE_PATH: &str = "./data/events.json";

/// Configuration for the event store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON file holding the event collection
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_STORE_PATH) }
    }
}

impl StoreConfig {
    /// Create a new configuration for the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Temporary file written before the atomic rename
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.path.file_name().is_none() {
            return Err(format!("Store path {:?} does not name a file", self.path));
        }

        if self.path.is_dir() {
            return Err(format!("Store path {:?} is a directory", self.path));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path() {
        assert_eq!(StoreConfig::default().path, PathBuf::from("./data/events.json"));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let config = StoreConfig::new("/var/lib/activity/events.json");
        assert_eq!(config.temp_path(), PathBuf::from("/var/lib/activity/events.json.tmp"));
    }

    #[test]
    fn test_validate_rejects_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(StoreConfig::new(dir.path()).validate().is_err());
        assert!(StoreConfig::new("..").validate().is_err());
        assert!(StoreConfig::new(dir.path().join("events.json")).validate().is_ok());
    }
}
