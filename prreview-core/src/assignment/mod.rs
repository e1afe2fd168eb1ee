//! Reviewer assignment engine
//!
//! Picks reviewers for new pull requests, replaces reviewers on open ones
//! and merges. The engine keeps no state apart from its [`Sampler`].

mod engine;
mod sampler;

pub use engine::{AssignmentEngine, Reassignment};
pub use sampler::Sampler;
