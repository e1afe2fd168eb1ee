use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Upper bound on reviewers assigned to one pull request
pub const MAX_REVIEWERS: usize = 2;

/// Pull request status
///
/// `Open -> Merged` is one-way; re-merging is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(Error::Storage(format!("unknown pull request status '{}'", other))),
        }
    }
}

/// A pull request with its assigned reviewers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PrStatus,

    /// Reviewer user ids in assignment order, at most [`MAX_REVIEWERS`]
    pub assigned_reviewers: Vec<String>,

    /// Set by the store on creation
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Present iff the status is `MERGED`
    #[serde(rename = "mergedAt", default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Create a new open pull request with no reviewers
    pub fn new(
        pull_request_id: impl Into<String>,
        pull_request_name: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        Self {
            pull_request_id: pull_request_id.into(),
            pull_request_name: pull_request_name.into(),
            author_id: author_id.into(),
            status: PrStatus::Open,
            assigned_reviewers: Vec::new(),
            created_at: None,
            merged_at: None,
        }
    }

    /// Set the assigned reviewers
    pub fn with_reviewers(mut self, reviewers: Vec<String>) -> Self {
        self.assigned_reviewers = reviewers;
        self
    }

    pub fn is_merged(&self) -> bool {
        self.status == PrStatus::Merged
    }

    /// Check if `user_id` is currently an assigned reviewer
    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|id| id == user_id)
    }

    /// Project into the short form used by reviewer listings
    pub fn to_short(&self) -> PullRequestShort {
        PullRequestShort {
            pull_request_id: self.pull_request_id.clone(),
            pull_request_name: self.pull_request_name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// Read projection of a pull request without reviewers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PrStatus,
}
