//! Row types and their conversion into domain values

use chrono::{DateTime, SecondsFormat, Utc};
use prreview_core::{PrStatus, PullRequest, PullRequestShort, TeamMember, User};

use crate::{Error, Result};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_id: row.user_id,
            username: row.username,
            team_name: row.team_name,
            is_active: row.is_active,
        }
    }
}

impl From<UserRow> for TeamMember {
    fn from(row: UserRow) -> Self {
        TeamMember {
            user_id: row.user_id,
            username: row.username,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PullRequestRow {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequestRow {
    /// Combine with reviewer ids already in slot order
    pub fn into_pull_request(self, assigned_reviewers: Vec<String>) -> Result<PullRequest> {
        Ok(PullRequest {
            status: parse_status(&self.status)?,
            pull_request_id: self.pull_request_id,
            pull_request_name: self.pull_request_name,
            author_id: self.author_id,
            assigned_reviewers,
            created_at: Some(self.created_at),
            merged_at: self.merged_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PullRequestShortRow {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
}

impl TryFrom<PullRequestShortRow> for PullRequestShort {
    type Error = Error;

    fn try_from(row: PullRequestShortRow) -> Result<Self> {
        Ok(PullRequestShort {
            status: parse_status(&row.status)?,
            pull_request_id: row.pull_request_id,
            pull_request_name: row.pull_request_name,
            author_id: row.author_id,
        })
    }
}

/// Current time as fixed-width RFC 3339 text, so string order is time order
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_status(status: &str) -> Result<PrStatus> {
    status
        .parse()
        .map_err(|_| Error::InvalidData(format!("unknown pull request status '{}'", status)))
}
