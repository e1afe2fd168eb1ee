//! Domain model: teams, users and pull requests
//!
//! Pure data plus the validation rules that apply before anything is
//! written. Behavior lives in the services and the assignment engine.

mod pull_request;
mod team;
mod user;

pub use pull_request::{PrStatus, PullRequest, PullRequestShort, MAX_REVIEWERS};
pub use team::{Team, TeamMember};
pub use user::User;

use crate::{Error, Result};

/// Maximum length of team names, user ids and usernames
pub const MAX_NAME_LEN: usize = 255;

/// Check that `value` holds between 1 and [`MAX_NAME_LEN`] characters
pub fn validate_name(field: &str, value: &str) -> Result<()> {
    let len = value.chars().count();
    if len == 0 {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    if len > MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Check that a free-form identifier is present
pub fn validate_required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(())
}
