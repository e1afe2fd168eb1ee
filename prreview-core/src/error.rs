//! Error types for prreview

use thiserror::Error;

/// Result type alias for prreview operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for prreview operations
///
/// The first eight variants are the domain taxonomy: expected business
/// outcomes that callers map to stable codes. Everything else is an
/// infrastructure or input failure.
#[derive(Error, Debug)]
pub enum Error {
    /// A team with this name already exists
    #[error("team '{0}' already exists")]
    TeamAlreadyExists(String),

    /// No team with this name
    #[error("team '{0}' not found")]
    TeamNotFound(String),

    /// No user with this id
    #[error("user '{0}' not found")]
    UserNotFound(String),

    /// A pull request with this id already exists
    #[error("pull request '{0}' already exists")]
    PullRequestAlreadyExists(String),

    /// No pull request with this id
    #[error("pull request '{0}' not found")]
    PullRequestNotFound(String),

    /// The pull request is merged and can no longer change
    #[error("cannot modify merged pull request '{0}'")]
    PullRequestMerged(String),

    /// The user is not among the pull request's reviewers
    #[error("user '{user_id}' is not assigned as reviewer of pull request '{pr_id}'")]
    ReviewerNotAssigned { pr_id: String, user_id: String },

    /// Nobody in the team can take over the review
    #[error("no available reviewers in team '{0}'")]
    NoEligibleCandidate(String),

    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is one of the expected domain outcomes
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Error::TeamAlreadyExists(_)
                | Error::TeamNotFound(_)
                | Error::UserNotFound(_)
                | Error::PullRequestAlreadyExists(_)
                | Error::PullRequestNotFound(_)
                | Error::PullRequestMerged(_)
                | Error::ReviewerNotAssigned { .. }
                | Error::NoEligibleCandidate(_)
        )
    }

    /// Check if this is a not-found outcome for any entity
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::TeamNotFound(_) | Error::UserNotFound(_) | Error::PullRequestNotFound(_)
        )
    }

    /// Wrap a storage failure with the operation that produced it
    pub fn storage(operation: &str, err: impl std::fmt::Display) -> Self {
        Error::Storage(format!("{}: {}", operation, err))
    }
}
