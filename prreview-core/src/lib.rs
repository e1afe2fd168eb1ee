//! prreview Core - reviewer assignment for pull requests
//!
//! This crate holds the domain model, the error taxonomy, the storage
//! gateway traits and the reviewer assignment engine. Persistence and
//! request handling live in sibling crates and talk to the engine only
//! through the traits in [`store`].

pub mod assignment;
pub mod config;
pub mod domain;
pub mod error;
pub mod store;
pub mod team;
pub mod user;

pub use assignment::{AssignmentEngine, Reassignment, Sampler};
pub use config::{CliOverrides, Config};
pub use domain::{PrStatus, PullRequest, PullRequestShort, Team, TeamMember, User};
pub use error::{Error, Result};
pub use store::{MemoryStore, PullRequestStore, TeamStore, UserStore};
pub use team::TeamService;
pub use user::UserService;
