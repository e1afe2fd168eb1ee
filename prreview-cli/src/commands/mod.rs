//! CLI command implementations

pub mod pr;
pub mod serve;
pub mod team;
pub mod user;

pub use pr::PrArgs;
pub use serve::ServeArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

use std::sync::Arc;

use anyhow::Context;
use prreview_core::Config;
use prreview_db::{Database, DatabaseConfig, SqliteStore};
use serde::Serialize;

/// Connect to the configured database and bring the schema up to date
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<SqliteStore>> {
    let db = Database::connect(DatabaseConfig::from(&config.database))
        .await
        .with_context(|| {
            format!(
                "Failed to open database at {}",
                config.database.path.display()
            )
        })?;
    db.migrate().await.context("Failed to apply schema")?;
    Ok(Arc::new(SqliteStore::new(db)))
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
