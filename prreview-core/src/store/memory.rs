//! In-memory implementation of the storage traits.
//!
//! All state sits behind one `RwLock`, so every call observes and mutates
//! a consistent snapshot. State is lost on restart.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{PullRequestStore, TeamStore, UserStore};
use crate::domain::{PrStatus, PullRequest, PullRequestShort, Team, TeamMember, User};
use crate::{Error, Result};

/// A pull request plus its insertion sequence, used to break ties
/// between equal creation timestamps.
#[derive(Debug, Clone)]
struct StoredPullRequest {
    pr: PullRequest,
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    teams: HashSet<String>,
    /// Keyed by user id so iteration is already id-ordered
    users: BTreeMap<String, User>,
    pull_requests: HashMap<String, StoredPullRequest>,
    next_seq: u64,
}

/// In-memory store implementing every gateway trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn team_exists(&self, team_name: &str) -> Result<bool> {
        Ok(self.inner.read().await.teams.contains(team_name))
    }

    async fn create_team_with_members(&self, team: &Team) -> Result<Team> {
        let mut inner = self.inner.write().await;
        if inner.teams.contains(&team.team_name) {
            return Err(Error::TeamAlreadyExists(team.team_name.clone()));
        }

        inner.teams.insert(team.team_name.clone());
        for member in &team.members {
            let user = member.clone().into_user(team.team_name.clone());
            inner.users.insert(user.user_id.clone(), user);
        }

        Ok(team.clone())
    }

    async fn get_team_with_members(&self, team_name: &str) -> Result<Option<Team>> {
        let inner = self.inner.read().await;
        if !inner.teams.contains(team_name) {
            return Ok(None);
        }

        let members = inner
            .users
            .values()
            .filter(|u| u.team_name == team_name)
            .map(|u| TeamMember {
                user_id: u.user_id.clone(),
                username: u.username.clone(),
                is_active: u.is_active,
            })
            .collect();

        Ok(Some(Team {
            team_name: team_name.to_string(),
            members,
        }))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(user_id).cloned())
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<Option<User>> {
        let mut inner = self.inner.write().await;
        Ok(inner.users.get_mut(user_id).map(|user| {
            user.is_active = is_active;
            user.clone()
        }))
    }

    async fn get_active_team_members(
        &self,
        team_name: &str,
        exclude: Option<&str>,
    ) -> Result<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .filter(|u| u.team_name == team_name && u.is_active)
            .filter(|u| exclude != Some(u.user_id.as_str()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PullRequestStore for MemoryStore {
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.pull_requests.contains_key(&pr.pull_request_id) {
            return Err(Error::PullRequestAlreadyExists(pr.pull_request_id.clone()));
        }

        let mut stored = pr.clone();
        stored.created_at = Some(Utc::now());
        stored.merged_at = None;

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .pull_requests
            .insert(pr.pull_request_id.clone(), StoredPullRequest { pr: stored, seq });

        Ok(())
    }

    async fn get_pull_request_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>> {
        let inner = self.inner.read().await;
        Ok(inner.pull_requests.get(pr_id).map(|s| s.pr.clone()))
    }

    async fn pull_request_exists(&self, pr_id: &str) -> Result<bool> {
        Ok(self.inner.read().await.pull_requests.contains_key(pr_id))
    }

    async fn merge_pull_request(&self, pr_id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.pull_requests.get_mut(pr_id) {
            Some(stored) => {
                stored.pr.status = PrStatus::Merged;
                stored.pr.merged_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_reviewer: &str,
        new_reviewer: &str,
    ) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let Some(stored) = inner.pull_requests.get_mut(pr_id) else {
            return Ok(0);
        };

        let pr = &mut stored.pr;
        if pr.status != PrStatus::Open || pr.has_reviewer(new_reviewer) {
            return Ok(0);
        }

        match pr.assigned_reviewers.iter_mut().find(|id| id.as_str() == old_reviewer) {
            Some(slot) => {
                *slot = new_reviewer.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn get_pull_requests_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        let inner = self.inner.read().await;
        let mut matching: Vec<&StoredPullRequest> = inner
            .pull_requests
            .values()
            .filter(|s| s.pr.has_reviewer(user_id))
            .collect();

        matching.sort_by(|a, b| {
            b.pr.created_at
                .cmp(&a.pr.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });

        Ok(matching.into_iter().map(|s| s.pr.to_short()).collect())
    }
}
