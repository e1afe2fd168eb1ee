//! Database layer for prreview
//!
//! SQLite persistence for teams, users and pull requests, exposed to the
//! engine through [`SqliteStore`].

pub mod db;
pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use db::{Database, DatabaseConfig};
pub use error::{Error, Result};
pub use store::SqliteStore;
