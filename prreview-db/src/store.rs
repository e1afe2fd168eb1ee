//! SQLite implementation of the core storage traits

use async_trait::async_trait;
use prreview_core::{
    PullRequest, PullRequestShort, PullRequestStore, Result, Team, TeamStore, User, UserStore,
};

use crate::db::Database;
use crate::repos::{PullRequestRepository, TeamRepository, UserRepository};

/// Storage gateway backed by a SQLite pool.
///
/// Multi-row writes run in a transaction; dropping a call midway rolls it
/// back. Races on one pull request are settled by the conditional reviewer
/// update.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn teams(&self) -> TeamRepository<'_> {
        TeamRepository::new(self.db.pool())
    }

    fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }

    fn pull_requests(&self) -> PullRequestRepository<'_> {
        PullRequestRepository::new(self.db.pool())
    }
}

#[async_trait]
impl TeamStore for SqliteStore {
    async fn team_exists(&self, team_name: &str) -> Result<bool> {
        Ok(self.teams().exists(team_name).await?)
    }

    async fn create_team_with_members(&self, team: &Team) -> Result<Team> {
        Ok(self.teams().create_with_members(team).await?)
    }

    async fn get_team_with_members(&self, team_name: &str) -> Result<Option<Team>> {
        Ok(self.teams().get_with_members(team_name).await?)
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.users().get_by_id(user_id).await?)
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<Option<User>> {
        Ok(self.users().set_active(user_id, is_active).await?)
    }

    async fn get_active_team_members(
        &self,
        team_name: &str,
        exclude: Option<&str>,
    ) -> Result<Vec<User>> {
        Ok(self.users().list_active_in_team(team_name, exclude).await?)
    }
}

#[async_trait]
impl PullRequestStore for SqliteStore {
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<()> {
        Ok(self.pull_requests().create(pr).await?)
    }

    async fn get_pull_request_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>> {
        Ok(self.pull_requests().get_by_id(pr_id).await?)
    }

    async fn pull_request_exists(&self, pr_id: &str) -> Result<bool> {
        Ok(self.pull_requests().exists(pr_id).await?)
    }

    async fn merge_pull_request(&self, pr_id: &str) -> Result<bool> {
        Ok(self.pull_requests().merge(pr_id).await?)
    }

    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_reviewer: &str,
        new_reviewer: &str,
    ) -> Result<u64> {
        Ok(self
            .pull_requests()
            .replace_reviewer(pr_id, old_reviewer, new_reviewer)
            .await?)
    }

    async fn get_pull_requests_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        Ok(self.pull_requests().list_by_reviewer(user_id).await?)
    }
}
