//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: HEALTHZ_, nested keys separated by `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/healthz/{service_name}/config.toml
//! 4. System directory: /etc/healthz/{service_name}/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

const ENV_PREFIX: &str = "HEALTHZ_";

/// Time reserved within the request timeout for writing the report
pub const RESPONSE_MARGIN: Duration = Duration::from_millis(250);

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Health endpoint configuration
    #[serde(default)]
    pub health: HealthConfig,

    /// PostgreSQL probe (optional)
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Redis probe (optional)
    #[serde(default)]
    pub redis: Option<RedisConfig>,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error) or an EnvFilter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Health endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Route serving the aggregated report
    #[serde(default = "default_health_path")]
    pub path: String,

    /// Overall budget for one aggregation run in milliseconds
    ///
    /// Probe timeouts longer than the remaining budget are clamped. Defaults
    /// to the request timeout minus [`RESPONSE_MARGIN`] and never exceeds it.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

impl HealthConfig {
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            path: default_health_path(),
            deadline_ms: None,
        }
    }
}

/// PostgreSQL probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL, passed through to the driver
    pub url: String,

    /// Probe name in the report
    #[serde(default = "default_database_name")]
    pub name: String,

    /// Probe tags
    #[serde(default = "default_database_tags")]
    pub tags: Vec<String>,

    /// Probe timeout in milliseconds
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,

    /// Report Degraded when a successful ping is slower than this (milliseconds)
    #[serde(default)]
    pub degraded_threshold_ms: Option<u64>,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,
}

/// Redis probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL (redis://host:port), passed through to the client
    pub url: String,

    /// Probe name in the report
    #[serde(default = "default_redis_name")]
    pub name: String,

    /// Probe tags
    #[serde(default = "default_redis_tags")]
    pub tags: Vec<String>,

    /// Probe timeout in milliseconds
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,

    /// Report Degraded when a successful ping is slower than this (milliseconds)
    #[serde(default)]
    pub degraded_threshold_ms: Option<u64>,

    /// Maximum number of connections in the pool
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: usize,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DatabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn degraded_threshold(&self) -> Option<Duration> {
        self.degraded_threshold_ms.map(Duration::from_millis)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

impl RedisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn degraded_threshold(&self) -> Option<Duration> {
        self.degraded_threshold_ms.map(Duration::from_millis)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

// Default value functions
fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_health_path() -> String {
    crate::health::DEFAULT_HEALTH_PATH.to_string()
}

fn default_database_name() -> String {
    "postgresql".to_string()
}

fn default_database_tags() -> Vec<String> {
    vec!["db".to_string(), "sql".to_string(), "postgresql".to_string()]
}

fn default_redis_name() -> String {
    "redis".to_string()
}

fn default_redis_tags() -> Vec<String> {
    vec!["cache".to_string(), "redis".to_string()]
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

fn default_max_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> usize {
    5
}

fn default_connection_timeout() -> u64 {
    5
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name is inferred from the binary name.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "healthz".to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the search path; environment variables still apply. Unlike
    /// the search path, a missing file is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(figment::Error::from(format!(
                "configuration file not found: {}",
                path.display()
            ))
            .into());
        }

        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// All possible config file paths for a service, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix("healthz");
        if let Some(path) = xdg_dirs.find_config_file(Path::new(service_name).join("config.toml")) {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc/healthz").join(service_name).join("config.toml"));

        paths
    }

    /// Per-run deadline
    ///
    /// The configured `deadline_ms`, clamped so the report is written before
    /// the request timeout fires.
    pub fn deadline(&self) -> Duration {
        let ceiling = self.service.request_timeout().saturating_sub(RESPONSE_MARGIN);
        match self.health.deadline() {
            Some(deadline) => deadline.min(ceiling),
            None => ceiling,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "healthz".to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
            },
            health: HealthConfig::default(),
            database: None,
            redis: None,
        }
    }
}
