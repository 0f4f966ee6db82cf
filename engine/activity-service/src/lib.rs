//! Repository Activity Service Library
//!
//! This library provides the core functionality for the repository activity
//! service: configuration management, the update pipeline, the REST API, the
//! periodic update scheduler and graceful shutdown handling.

use anyhow::{Context, Result};
use std::path::Path;

pub mod config;
pub mod logging;
pub mod rest_api;
pub mod scheduler;
pub mod service;
pub mod signals;
pub mod updater;

#[cfg(test)]
mod test_support;

pub use config::ServiceConfig;
pub use logging::{initialize_logging, initialize_logging_with_config};
pub use rest_api::create_routes;
pub use scheduler::UpdateScheduler;
pub use service::ServiceState;
pub use signals::{graceful_shutdown, setup_signal_handlers};
pub use updater::{EventUpdater, UpdateError, UpdateSummary};

/// Load configuration from an optional file and environment variables
pub fn load_configuration(path: Option<&Path>) -> Result<ServiceConfig> {
    config::load_config(path).context("Failed to load service configuration")
}
