//! Configuration management for prreview
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (PRREVIEW_*)
//! 3. Config file (~/.config/prreview/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["text", "json"];

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Upper bound on a single request, e.g. "30s"
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// SQLite database configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the database file
    pub path: PathBuf,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// How long a writer waits on a locked database
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl DatabaseSettings {
    /// `~/.local/share/prreview/prreview.db` on Linux, `./prreview.db` if
    /// no data directory is known
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|p| p.join("prreview").join("prreview.db"))
            .unwrap_or_else(|| PathBuf::from("prreview.db"))
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter level; `RUST_LOG` takes precedence when set
    pub level: String,

    /// "text" or "json"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Values given on the command line, each overriding everything else
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/prreview/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("prreview").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - PRREVIEW_HOST, PRREVIEW_PORT, PRREVIEW_REQUEST_TIMEOUT
    /// - PRREVIEW_DB_PATH, PRREVIEW_DB_MAX_CONNECTIONS, PRREVIEW_DB_BUSY_TIMEOUT
    /// - PRREVIEW_LOG_LEVEL, PRREVIEW_LOG_FORMAT
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup, environment-style
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("PRREVIEW_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PRREVIEW_PORT") {
            self.server.port = parse_var("PRREVIEW_PORT", &port)?;
        }
        if let Some(timeout) = lookup("PRREVIEW_REQUEST_TIMEOUT") {
            self.server.request_timeout = parse_duration("PRREVIEW_REQUEST_TIMEOUT", &timeout)?;
        }
        if let Some(path) = lookup("PRREVIEW_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(max) = lookup("PRREVIEW_DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("PRREVIEW_DB_MAX_CONNECTIONS", &max)?;
        }
        if let Some(timeout) = lookup("PRREVIEW_DB_BUSY_TIMEOUT") {
            self.database.busy_timeout = parse_duration("PRREVIEW_DB_BUSY_TIMEOUT", &timeout)?;
        }
        if let Some(level) = lookup("PRREVIEW_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(format) = lookup("PRREVIEW_LOG_FORMAT") {
            self.log.format = format;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(path) = overrides.database_path {
            self.database.path = path;
        }
        if let Some(level) = overrides.log_level {
            self.log.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.log.format = format;
        }

        self
    }

    /// Load configuration with all overrides applied and validate it
    ///
    /// Priority: CLI > env > config file > defaults. An explicit
    /// `config_path` replaces the default file location and must exist.
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        overrides: CliOverrides,
    ) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        let config = base.with_env_overrides()?.with_cli_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&self.log.level.to_lowercase().as_str()) {
            return Err(Error::Config(format!(
                "log.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.log.level
            )));
        }
        if !LOG_FORMATS.contains(&self.log.format.as_str()) {
            return Err(Error::Config(format!(
                "log.format must be one of {}, got '{}'",
                LOG_FORMATS.join(", "),
                self.log.format
            )));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid {}='{}': {}", key, value, e)))
}

fn parse_duration(key: &str, value: &str) -> Result<Duration> {
    humantime_serde::re::humantime::parse_duration(value.trim())
        .map_err(|e| Error::Config(format!("Invalid {}='{}': {}", key, value, e)))
}
