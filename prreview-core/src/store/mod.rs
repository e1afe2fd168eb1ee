//! Storage gateway abstraction.
//!
//! These traits are the whole contract between the assignment engine and
//! durable storage. Each method is expected to be atomic on its own; the
//! engine never holds a transaction across calls. Races between concurrent
//! operations on one pull request are settled by the conditional write in
//! [`PullRequestStore::replace_reviewer`], not by in-process locks.
//!
//! Dropping a returned future cancels the call. Implementations must make
//! sure a cancelled write leaves nothing partially applied.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::domain::{PullRequest, PullRequestShort, Team, User};
use crate::Result;

/// Team persistence.
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Check whether a team with this name exists.
    async fn team_exists(&self, team_name: &str) -> Result<bool>;

    /// Create the team and upsert its members in one atomic write.
    ///
    /// A member whose user id already exists is overwritten (name, active
    /// flag and team). Fails with `TeamAlreadyExists` if the name is taken.
    async fn create_team_with_members(&self, team: &Team) -> Result<Team>;

    /// Get a team with its members ordered by user id.
    async fn get_team_with_members(&self, team_name: &str) -> Result<Option<Team>>;
}

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>>;

    /// Update the active flag, returning the updated user.
    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<Option<User>>;

    /// Active members of `team_name` ordered by user id, minus `exclude`.
    async fn get_active_team_members(
        &self,
        team_name: &str,
        exclude: Option<&str>,
    ) -> Result<Vec<User>>;
}

/// Pull request persistence.
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    /// Insert the pull request and its reviewer rows in one atomic write.
    ///
    /// The store sets `created_at`. Fails with `PullRequestAlreadyExists`
    /// if the id is taken.
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<()>;

    /// Get a pull request with reviewers in assignment order.
    async fn get_pull_request_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>>;

    async fn pull_request_exists(&self, pr_id: &str) -> Result<bool>;

    /// Set status to merged with the current time, unconditionally.
    ///
    /// Returns whether a row changed. Idempotency is the engine's job.
    async fn merge_pull_request(&self, pr_id: &str) -> Result<bool>;

    /// Swap `old_reviewer` for `new_reviewer` in place.
    ///
    /// Applies only while the pull request is open, `old_reviewer` is still
    /// assigned and `new_reviewer` is not. Returns the number of rows
    /// affected, so zero means one of those conditions no longer held.
    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_reviewer: &str,
        new_reviewer: &str,
    ) -> Result<u64>;

    /// Pull requests where `user_id` is a reviewer, newest first.
    async fn get_pull_requests_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>>;
}
