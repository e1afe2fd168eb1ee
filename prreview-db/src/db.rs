//! Database connection and configuration

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use tracing::info;

use crate::error::{Error, Result};

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// How long a connection waits for a write lock
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    /// Create a new database config with the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Set the busy timeout
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

impl From<&prreview_core::config::DatabaseSettings> for DatabaseConfig {
    fn from(settings: &prreview_core::config::DatabaseSettings) -> Self {
        Self::new(settings.path.clone())
            .with_max_connections(settings.max_connections)
            .with_busy_timeout(settings.busy_timeout)
    }
}

/// Database connection pool
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database with the given configuration
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path.display()))?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true)
                .busy_timeout(config.busy_timeout)
                .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        info!(
            path = %config.path.display(),
            max_connections = config.max_connections,
            "database connected"
        );

        Ok(Self { pool })
    }

    /// Apply the schema. Safe to run on every startup.
    pub async fn migrate(&self) -> Result<()> {
        let migration_sql = include_str!("../migrations/001_initial_schema.sql");

        sqlx::raw_sql(migration_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;

        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}
