//! Service configuration management

use activity_events::RepoRef;
use activity_fetcher::FetcherConfig;
use activity_store::StoreConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest accepted scheduler interval (one year)
pub const MAX_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

/// Environment variable naming a TOML configuration file
pub const CONFIG_FILE_ENV: &str = "ACTIVITY_CONFIG_FILE";

/// Main service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Event store configuration
    pub store: StoreConfig,

    /// GitHub client configuration
    pub fetcher: FetcherConfig,

    /// Periodic update configuration
    pub scheduler: SchedulerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

/// Periodic update settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Run updates in the background
    pub enabled: bool,

    /// Repositories polled on every run
    pub repositories: Vec<RepoRef>,

    /// Minutes between runs
    pub interval_minutes: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, compact, json)
    pub format: String,

    /// Log file path (if None, logs to stdout). Rotated daily.
    pub file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 5000, shutdown_timeout_secs: 10 }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { enabled: false, repositories: Vec::new(), interval_minutes: 60 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string(), file: None }
    }
}

impl ServerConfig {
    /// Get the server address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid server address {}:{}", self.host, self.port))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}

/// Load configuration from an optional file and environment variables
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from));

    let mut config = match path {
        Some(path) => {
            tracing::debug!("Loading configuration from file: {:?}", path);
            load_from_file(&path)?
        }
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file. Missing sections keep their defaults.
pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse configuration file: {:?}", path))
}

/// Override configuration values from environment variables
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("ACTIVITY_HOST") {
        config.server.host = host;
    }

    if let Some(port) = lookup("ACTIVITY_PORT") {
        config.server.port = port.parse().with_context(|| format!("Invalid ACTIVITY_PORT: {port}"))?;
    }

    if let Some(path) = lookup("ACTIVITY_STORE_PATH") {
        config.store.path = PathBuf::from(path);
    }

    if let Some(url) = lookup("GITHUB_API_URL") {
        config.fetcher.api_base_url = url;
    }

    if let Some(level) = lookup("ACTIVITY_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(format) = lookup("ACTIVITY_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Some(file) = lookup("ACTIVITY_LOG_FILE") {
        config.logging.file = Some(PathBuf::from(file));
    }

    if let Some(enabled) = lookup("ACTIVITY_POLL_ENABLED") {
        config.scheduler.enabled =
            enabled.parse().with_context(|| format!("Invalid ACTIVITY_POLL_ENABLED: {enabled}"))?;
    }

    if let Some(repos) = lookup("ACTIVITY_POLL_REPOSITORIES") {
        config.scheduler.repositories = repos
            .split(',')
            .map(str::trim)
            .filter(|repo| !repo.is_empty())
            .map(str::parse::<RepoRef>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Invalid ACTIVITY_POLL_REPOSITORIES")?;
    }

    if let Some(minutes) = lookup("ACTIVITY_POLL_MINUTES") {
        config.scheduler.interval_minutes =
            minutes.parse().with_context(|| format!("Invalid ACTIVITY_POLL_MINUTES: {minutes}"))?;
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    if config.server.port == 0 {
        return Err(anyhow::anyhow!("Invalid server port: {}", config.server.port));
    }

    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if config.scheduler.enabled {
        if config.scheduler.repositories.is_empty() {
            return Err(anyhow::anyhow!("Scheduler is enabled but no repositories are configured"));
        }
        if config.scheduler.interval_minutes == 0 {
            return Err(anyhow::anyhow!("Scheduler interval_minutes must be greater than 0"));
        }
        if config.scheduler.interval_minutes > MAX_INTERVAL_MINUTES {
            return Err(anyhow::anyhow!(
                "Scheduler interval_minutes must be at most {}",
                MAX_INTERVAL_MINUTES
            ));
        }
    }

    config.store.validate().map_err(|e| anyhow::anyhow!(e))?;
    config.fetcher.validate().map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
