//! Error types for database operations

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum Error {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored row could not be turned into a domain value
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Team name collided with an existing row
    #[error("Team already exists: {0}")]
    TeamExists(String),

    /// Pull request id collided with an existing row
    #[error("Pull request already exists: {0}")]
    PullRequestExists(String),
}

impl Error {
    /// Whether a sqlx error is a UNIQUE or PRIMARY KEY violation
    pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
    }
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for prreview_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::TeamExists(name) => prreview_core::Error::TeamAlreadyExists(name),
            Error::PullRequestExists(id) => prreview_core::Error::PullRequestAlreadyExists(id),
            other => prreview_core::Error::storage("sqlite", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_become_domain_errors() {
        let err: prreview_core::Error = Error::TeamExists("infra".into()).into();
        assert!(matches!(err, prreview_core::Error::TeamAlreadyExists(n) if n == "infra"));

        let err: prreview_core::Error = Error::PullRequestExists("pr-1".into()).into();
        assert!(matches!(err, prreview_core::Error::PullRequestAlreadyExists(_)));
    }

    #[test]
    fn test_other_errors_become_storage() {
        let err: prreview_core::Error = Error::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, prreview_core::Error::Storage(_)));
        assert!(!err.is_domain());
    }
}
