//! Configuration management for the ccdc crawler
//!
//! Configuration is built once at process start from an optional TOML file,
//! then overridden by environment variables, validated, and passed by
//! reference into each component's constructor.
//!
//! ```toml
//! [db]
//! path = "data/ccdc.sqlite"
//!
//! [http]
//! user_agent = "ccdc/0.1.0"
//! request_limit_per_min = 60
//! request_timeout_secs = 30
//!
//! [objects]
//! chunk_size = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default configuration file looked up when no `--config` is given
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration
    pub db: DbConfig,

    /// Outbound HTTP configuration
    pub http: HttpConfig,

    /// Object ingestion configuration
    pub objects: ObjectsConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// SQLite database path
    pub path: PathBuf,
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request
    pub user_agent: String,

    /// Maximum number of requests per minute, across the whole process
    pub request_limit_per_min: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Object ingestion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectsConfig {
    /// Number of object ids processed concurrently per batch
    pub chunk_size: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/ccdc.sqlite"),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("ccdc/{}", env!("CARGO_PKG_VERSION")),
            request_limit_per_min: 60,
            request_timeout_secs: 30,
        }
    }
}

impl Default for ObjectsConfig {
    fn default() -> Self {
        Self { chunk_size: 10 }
    }
}

impl Config {
    /// Load configuration for a run.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
    /// used when present and built-in defaults otherwise. Environment
    /// overrides are applied last, then the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse TOML config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Override values from `CCDC_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("CCDC_DB_PATH") {
            self.db.path = PathBuf::from(path);
        }

        if let Ok(user_agent) = std::env::var("CCDC_USER_AGENT") {
            self.http.user_agent = user_agent;
        }

        if let Some(limit) = env_number("CCDC_REQUEST_LIMIT_PER_MIN")? {
            self.http.request_limit_per_min = limit;
        }

        if let Some(timeout) = env_number("CCDC_REQUEST_TIMEOUT_SECS")? {
            self.http.request_timeout_secs = timeout;
        }

        if let Some(chunk_size) = env_number("CCDC_CHUNK_SIZE")? {
            self.objects.chunk_size = chunk_size;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.http.request_limit_per_min == 0 {
            return Err(Error::config(
                "http.request_limit_per_min must be greater than 0",
            ));
        }

        if self.http.request_timeout_secs == 0 {
            return Err(Error::config(
                "http.request_timeout_secs must be greater than 0",
            ));
        }

        if self.http.user_agent.trim().is_empty() {
            return Err(Error::config("http.user_agent must not be empty"));
        }

        if self.objects.chunk_size == 0 {
            return Err(Error::config("objects.chunk_size must be greater than 0"));
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }

    /// Window the request limit applies to
    #[must_use]
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(60)
    }
}

fn env_number<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::config(format!("Invalid value for {key}: {value:?} ({e})"))),
        Err(_) => Ok(None),
    }
}
