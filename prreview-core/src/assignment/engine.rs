//! Assignment engine operations

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use super::Sampler;
use crate::domain::{validate_required, PullRequest, PullRequestShort, User, MAX_REVIEWERS};
use crate::store::{PullRequestStore, UserStore};
use crate::{Error, Result};

/// Outcome of a successful reassignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// The pull request as read back after the swap
    pub pull_request: PullRequest,
    /// Id of the reviewer who took over
    pub replaced_by: String,
}

/// Stateless decision logic on top of the storage gateway.
///
/// Safe to share between tasks behind an `Arc`. Concurrent mutations of one
/// pull request are serialized by the store's conditional writes; the only
/// lock here guards the random generator.
pub struct AssignmentEngine {
    pull_requests: Arc<dyn PullRequestStore>,
    users: Arc<dyn UserStore>,
    sampler: Sampler,
}

impl AssignmentEngine {
    /// Create an engine with an entropy-seeded sampler
    pub fn new(pull_requests: Arc<dyn PullRequestStore>, users: Arc<dyn UserStore>) -> Self {
        Self {
            pull_requests,
            users,
            sampler: Sampler::from_entropy(),
        }
    }

    /// Replace the sampler, e.g. with a seeded one
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Open a pull request and assign up to two reviewers from the
    /// author's team.
    ///
    /// Candidates are the author's active teammates. Having fewer than two
    /// (or none) is not an error; the pull request just gets fewer reviewers.
    pub async fn create_pull_request(
        &self,
        pr_id: &str,
        pr_name: &str,
        author_id: &str,
    ) -> Result<PullRequest> {
        validate_required("pull_request_id", pr_id)?;
        validate_required("pull_request_name", pr_name)?;
        validate_required("author_id", author_id)?;

        if self.pull_requests.pull_request_exists(pr_id).await? {
            return Err(Error::PullRequestAlreadyExists(pr_id.to_string()));
        }

        let author = self.require_user(author_id).await?;
        let candidates = self
            .users
            .get_active_team_members(&author.team_name, Some(author_id))
            .await?;

        let reviewers = self.select_reviewers(&candidates);

        let pr = PullRequest::new(pr_id, pr_name, author_id).with_reviewers(reviewers);
        self.pull_requests.create_pull_request(&pr).await?;

        info!(
            pr_id = %pr_id,
            author_id = %author_id,
            reviewers_count = pr.assigned_reviewers.len(),
            "pull request created"
        );

        self.require_pull_request(pr_id).await
    }

    /// Replace `old_reviewer` with a random active member of the old
    /// reviewer's own team.
    ///
    /// The author and everyone already assigned are never picked. If the
    /// pull request is merged or the reviewer replaced concurrently, the
    /// conditional write affects nothing and the outcome is reported as
    /// `PullRequestMerged` or `ReviewerNotAssigned`.
    pub async fn reassign_reviewer(&self, pr_id: &str, old_reviewer: &str) -> Result<Reassignment> {
        let pr = self.require_pull_request(pr_id).await?;

        if pr.is_merged() {
            return Err(Error::PullRequestMerged(pr_id.to_string()));
        }
        if !pr.has_reviewer(old_reviewer) {
            return Err(not_assigned(pr_id, old_reviewer));
        }

        let old_user = self.require_user(old_reviewer).await?;
        let candidates = self
            .users
            .get_active_team_members(&old_user.team_name, None)
            .await?;

        let excluded: HashSet<&str> = std::iter::once(pr.author_id.as_str())
            .chain(pr.assigned_reviewers.iter().map(String::as_str))
            .collect();
        let eligible: Vec<&User> = candidates
            .iter()
            .filter(|c| !excluded.contains(c.user_id.as_str()))
            .collect();

        let Some(index) = self.sampler.pick_index(eligible.len()) else {
            return Err(Error::NoEligibleCandidate(old_user.team_name));
        };
        let new_reviewer = eligible[index].user_id.clone();

        let affected = self
            .pull_requests
            .replace_reviewer(pr_id, old_reviewer, &new_reviewer)
            .await?;

        if affected == 0 {
            return Err(self.classify_lost_race(pr_id, old_reviewer).await);
        }

        let updated = self.require_pull_request(pr_id).await?;

        info!(
            pr_id = %pr_id,
            old_reviewer = %old_reviewer,
            new_reviewer = %new_reviewer,
            team = %old_user.team_name,
            "reviewer reassigned"
        );

        Ok(Reassignment {
            pull_request: updated,
            replaced_by: new_reviewer,
        })
    }

    /// Mark a pull request as merged.
    ///
    /// Merging an already merged pull request returns it unchanged without
    /// writing, so duplicate merge signals never fail.
    pub async fn merge_pull_request(&self, pr_id: &str) -> Result<PullRequest> {
        let pr = self.require_pull_request(pr_id).await?;

        if pr.is_merged() {
            info!(
                pr_id = %pr_id,
                merged_at = ?pr.merged_at,
                "pull request already merged, returning current state"
            );
            return Ok(pr);
        }

        if !self.pull_requests.merge_pull_request(pr_id).await? {
            return Err(Error::PullRequestNotFound(pr_id.to_string()));
        }

        let merged = self.require_pull_request(pr_id).await?;

        info!(
            pr_id = %pr_id,
            merged_at = ?merged.merged_at,
            reviewers_count = merged.assigned_reviewers.len(),
            "pull request merged"
        );

        Ok(merged)
    }

    /// Pull requests the user is reviewing, newest first
    pub async fn reviews_for_user(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        let prs = self
            .pull_requests
            .get_pull_requests_by_reviewer(user_id)
            .await?;

        info!(user_id = %user_id, count = prs.len(), "retrieved user reviews");

        Ok(prs)
    }

    fn select_reviewers(&self, candidates: &[User]) -> Vec<String> {
        let ids: Vec<&str> = candidates.iter().map(|u| u.user_id.as_str()).collect();
        self.sampler
            .choose_up_to(&ids, MAX_REVIEWERS)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Work out why a conditional reviewer swap matched no rows.
    ///
    /// The read may itself race with a third operation; that only affects
    /// which of the two outcomes is reported.
    async fn classify_lost_race(&self, pr_id: &str, old_reviewer: &str) -> Error {
        match self.pull_requests.get_pull_request_by_id(pr_id).await {
            Ok(Some(pr)) if pr.is_merged() => {
                debug!(pr_id = %pr_id, "reassignment lost race to merge");
                Error::PullRequestMerged(pr_id.to_string())
            }
            Ok(_) => {
                debug!(pr_id = %pr_id, old_reviewer = %old_reviewer, "reassignment lost race");
                not_assigned(pr_id, old_reviewer)
            }
            Err(e) => {
                debug!(pr_id = %pr_id, error = %e, "could not re-read pull request after lost race");
                not_assigned(pr_id, old_reviewer)
            }
        }
    }

    async fn require_pull_request(&self, pr_id: &str) -> Result<PullRequest> {
        self.pull_requests
            .get_pull_request_by_id(pr_id)
            .await?
            .ok_or_else(|| Error::PullRequestNotFound(pr_id.to_string()))
    }

    async fn require_user(&self, user_id: &str) -> Result<User> {
        self.users
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))
    }
}

fn not_assigned(pr_id: &str, user_id: &str) -> Error {
    Error::ReviewerNotAssigned {
        pr_id: pr_id.to_string(),
        user_id: user_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PrStatus, Team, TeamMember};
    use crate::store::{MemoryStore, TeamStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    async fn store_with(teams: &[Team]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for team in teams {
            store.create_team_with_members(team).await.unwrap();
        }
        store
    }

    fn engine(store: &Arc<MemoryStore>) -> AssignmentEngine {
        AssignmentEngine::new(store.clone(), store.clone()).with_sampler(Sampler::seeded(11))
    }

    fn team(name: &str, members: &[(&str, bool)]) -> Team {
        members.iter().fold(Team::new(name), |team, (id, active)| {
            team.with_member(TeamMember::new(*id, id.to_uppercase()).with_active(*active))
        })
    }

    fn infra() -> Team {
        team("infra", &[("alice", true), ("bob", true), ("carol", false)])
    }

    /// Open a pull request with a fixed reviewer list, bypassing selection
    async fn seed_pr(store: &MemoryStore, id: &str, author: &str, reviewers: &[&str]) {
        let pr = PullRequest::new(id, id, author)
            .with_reviewers(reviewers.iter().map(|r| r.to_string()).collect());
        store.create_pull_request(&pr).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_excludes_inactive_and_author() {
        let store = store_with(&[infra()]).await;
        let pr = engine(&store)
            .create_pull_request("pr-1", "Add search", "alice")
            .await
            .unwrap();

        assert_eq!(pr.status, PrStatus::Open);
        assert_eq!(pr.assigned_reviewers, vec!["bob"]);
        assert!(pr.created_at.is_some());
        assert!(pr.merged_at.is_none());
    }

    #[tokio::test]
    async fn test_create_caps_at_two_reviewers() {
        let store = store_with(&[team(
            "infra",
            &[("alice", true), ("bob", true), ("carol", true), ("dave", true), ("erin", true)],
        )])
        .await;
        let engine = engine(&store);

        for i in 0..20 {
            let pr = engine
                .create_pull_request(&format!("pr-{}", i), "change", "alice")
                .await
                .unwrap();
            assert_eq!(pr.assigned_reviewers.len(), 2);
            assert!(!pr.has_reviewer("alice"));
            assert_ne!(pr.assigned_reviewers[0], pr.assigned_reviewers[1]);
        }
    }

    #[tokio::test]
    async fn test_create_alone_gets_no_reviewers() {
        let store = store_with(&[team("solo", &[("alice", true), ("bob", false)])]).await;
        let pr = engine(&store)
            .create_pull_request("pr-1", "Add search", "alice")
            .await
            .unwrap();
        assert!(pr.assigned_reviewers.is_empty());
    }

    #[tokio::test]
    async fn test_create_ignores_other_teams() {
        let store = store_with(&[infra(), team("web", &[("dave", true), ("erin", true)])]).await;
        let pr = engine(&store)
            .create_pull_request("pr-1", "Add search", "alice")
            .await
            .unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["bob"]);
    }

    #[tokio::test]
    async fn test_create_duplicate_keeps_original() {
        let store = store_with(&[infra()]).await;
        let engine = engine(&store);
        let original = engine
            .create_pull_request("pr-1", "Add search", "alice")
            .await
            .unwrap();

        let err = engine
            .create_pull_request("pr-1", "Rewrite everything", "bob")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PullRequestAlreadyExists(id) if id == "pr-1"));

        let kept = store.get_pull_request_by_id("pr-1").await.unwrap().unwrap();
        assert_eq!(kept, original);
    }

    #[tokio::test]
    async fn test_create_unknown_author() {
        let store = store_with(&[infra()]).await;
        let err = engine(&store)
            .create_pull_request("pr-1", "Add search", "mallory")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UserNotFound(id) if id == "mallory"));
        assert!(!store.pull_request_exists("pr-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let store = store_with(&[infra()]).await;
        let err = engine(&store)
            .create_pull_request("", "Add search", "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_selection_frequency_converges() {
        let store = store_with(&[team(
            "infra",
            &[("alice", true), ("bob", true), ("carol", true), ("dave", true)],
        )])
        .await;
        let engine = AssignmentEngine::new(store.clone(), store.clone())
            .with_sampler(Sampler::seeded(20240917));

        let trials = 1500;
        let mut hits = std::collections::HashMap::<String, usize>::new();
        for i in 0..trials {
            let pr = engine
                .create_pull_request(&format!("pr-{}", i), "change", "alice")
                .await
                .unwrap();
            for reviewer in pr.assigned_reviewers {
                *hits.entry(reviewer).or_default() += 1;
            }
        }

        assert_eq!(hits.len(), 3);
        for (reviewer, count) in hits {
            let freq = count as f64 / trials as f64;
            assert!(
                (freq - 2.0 / 3.0).abs() < 0.05,
                "{} selected with frequency {}",
                reviewer,
                freq
            );
        }
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let store = store_with(&[infra()]).await;
        let engine = engine(&store);
        engine
            .create_pull_request("pr-1", "Add search", "alice")
            .await
            .unwrap();

        let first = engine.merge_pull_request("pr-1").await.unwrap();
        assert_eq!(first.status, PrStatus::Merged);
        assert!(first.merged_at.is_some());

        let second = engine.merge_pull_request("pr-1").await.unwrap();
        assert_eq!(second, first);
        assert_eq!(
            serde_json::to_string(&second).unwrap(),
            serde_json::to_string(&first).unwrap()
        );
    }

    #[tokio::test]
    async fn test_merge_unknown() {
        let store = store_with(&[]).await;
        let err = engine(&store).merge_pull_request("pr-404").await.unwrap_err();
        assert!(matches!(err, Error::PullRequestNotFound(_)));
    }

    #[tokio::test]
    async fn test_reassign_draws_from_old_reviewers_team() {
        // bob sits in "web" even though the author is in "infra"
        let store = store_with(&[
            team("infra", &[("alice", true), ("zed", true)]),
            team("web", &[("bob", true), ("dave", true)]),
        ])
        .await;
        seed_pr(&store, "pr-1", "alice", &["bob"]).await;

        let result = engine(&store).reassign_reviewer("pr-1", "bob").await.unwrap();
        assert_eq!(result.replaced_by, "dave");
        assert_eq!(result.pull_request.assigned_reviewers, vec!["dave"]);
    }

    #[tokio::test]
    async fn test_reassign_excludes_author_and_current_reviewers() {
        let store = store_with(&[team(
            "infra",
            &[("alice", true), ("bob", true), ("carol", true), ("dave", true)],
        )])
        .await;
        seed_pr(&store, "pr-1", "alice", &["bob", "carol"]).await;

        let result = engine(&store).reassign_reviewer("pr-1", "bob").await.unwrap();
        assert_eq!(result.replaced_by, "dave");
        // replacement keeps the slot of the reviewer it replaced
        assert_eq!(result.pull_request.assigned_reviewers, vec!["dave", "carol"]);
    }

    #[tokio::test]
    async fn test_reassign_not_assigned_changes_nothing() {
        let store = store_with(&[infra()]).await;
        seed_pr(&store, "pr-1", "alice", &["bob"]).await;

        let err = engine(&store).reassign_reviewer("pr-1", "carol").await.unwrap_err();
        assert!(matches!(err, Error::ReviewerNotAssigned { .. }));

        let pr = store.get_pull_request_by_id("pr-1").await.unwrap().unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["bob"]);
    }

    #[tokio::test]
    async fn test_reassign_on_merged_changes_nothing() {
        let store = store_with(&[team(
            "infra",
            &[("alice", true), ("bob", true), ("dave", true)],
        )])
        .await;
        seed_pr(&store, "pr-1", "alice", &["bob"]).await;
        let engine = engine(&store);
        let merged = engine.merge_pull_request("pr-1").await.unwrap();

        let err = engine.reassign_reviewer("pr-1", "bob").await.unwrap_err();
        assert!(matches!(err, Error::PullRequestMerged(_)));

        let pr = store.get_pull_request_by_id("pr-1").await.unwrap().unwrap();
        assert_eq!(pr, merged);
    }

    #[tokio::test]
    async fn test_reassign_unknown_pull_request() {
        let store = store_with(&[infra()]).await;
        let err = engine(&store).reassign_reviewer("pr-404", "bob").await.unwrap_err();
        assert!(matches!(err, Error::PullRequestNotFound(_)));
    }

    #[tokio::test]
    async fn test_infra_scenario() {
        let store = store_with(&[infra()]).await;
        let engine = engine(&store);

        let pr = engine
            .create_pull_request("pr-1", "Add search", "alice")
            .await
            .unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["bob"]);

        let err = engine.reassign_reviewer("pr-1", "bob").await.unwrap_err();
        assert!(matches!(err, Error::NoEligibleCandidate(team) if team == "infra"));

        let pr = store.get_pull_request_by_id("pr-1").await.unwrap().unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["bob"]);
    }

    #[tokio::test]
    async fn test_reviews_for_user() {
        let store = store_with(&[infra()]).await;
        let engine = engine(&store);
        engine.create_pull_request("pr-1", "one", "alice").await.unwrap();
        engine.create_pull_request("pr-2", "two", "alice").await.unwrap();

        let reviews = engine.reviews_for_user("bob").await.unwrap();
        let ids: Vec<_> = reviews.iter().map(|p| p.pull_request_id.as_str()).collect();
        assert_eq!(ids, vec!["pr-2", "pr-1"]);
        assert!(engine.reviews_for_user("alice").await.unwrap().is_empty());
    }

    /// What another caller does between the engine's checks and its write
    enum Interference {
        Merge,
        Replace { old: &'static str, new: &'static str },
    }

    /// Store that lets a competing operation commit right before the
    /// engine's conditional reviewer swap.
    struct RacingStore {
        inner: Arc<MemoryStore>,
        interference: Mutex<Option<Interference>>,
    }

    #[async_trait]
    impl PullRequestStore for RacingStore {
        async fn create_pull_request(&self, pr: &PullRequest) -> Result<()> {
            self.inner.create_pull_request(pr).await
        }

        async fn get_pull_request_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>> {
            self.inner.get_pull_request_by_id(pr_id).await
        }

        async fn pull_request_exists(&self, pr_id: &str) -> Result<bool> {
            self.inner.pull_request_exists(pr_id).await
        }

        async fn merge_pull_request(&self, pr_id: &str) -> Result<bool> {
            self.inner.merge_pull_request(pr_id).await
        }

        async fn replace_reviewer(&self, pr_id: &str, old: &str, new: &str) -> Result<u64> {
            let interference = self.interference.lock().unwrap().take();
            match interference {
                Some(Interference::Merge) => {
                    self.inner.merge_pull_request(pr_id).await?;
                }
                Some(Interference::Replace { old, new }) => {
                    self.inner.replace_reviewer(pr_id, old, new).await?;
                }
                None => {}
            }
            self.inner.replace_reviewer(pr_id, old, new).await
        }

        async fn get_pull_requests_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
            self.inner.get_pull_requests_by_reviewer(user_id).await
        }
    }

    fn racing_engine(store: &Arc<MemoryStore>, interference: Interference) -> AssignmentEngine {
        let racing = Arc::new(RacingStore {
            inner: store.clone(),
            interference: Mutex::new(Some(interference)),
        });
        AssignmentEngine::new(racing, store.clone()).with_sampler(Sampler::seeded(3))
    }

    fn crowded_infra() -> Team {
        team(
            "infra",
            &[("alice", true), ("bob", true), ("carol", true), ("dave", true), ("erin", true)],
        )
    }

    #[tokio::test]
    async fn test_lost_race_to_merge_reports_merged() {
        let store = store_with(&[crowded_infra()]).await;
        seed_pr(&store, "pr-1", "alice", &["bob", "carol"]).await;

        let err = racing_engine(&store, Interference::Merge)
            .reassign_reviewer("pr-1", "bob")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PullRequestMerged(_)));

        let pr = store.get_pull_request_by_id("pr-1").await.unwrap().unwrap();
        assert!(pr.is_merged());
        assert_eq!(pr.assigned_reviewers, vec!["bob", "carol"]);
    }

    #[tokio::test]
    async fn test_lost_race_to_reassign_reports_not_assigned() {
        let store = store_with(&[crowded_infra()]).await;
        seed_pr(&store, "pr-1", "alice", &["bob", "carol"]).await;

        let err = racing_engine(&store, Interference::Replace { old: "bob", new: "erin" })
            .reassign_reviewer("pr-1", "bob")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReviewerNotAssigned { user_id, .. } if user_id == "bob"));

        let pr = store.get_pull_request_by_id("pr-1").await.unwrap().unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["erin", "carol"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reassign_exactly_one_wins() {
        for round in 0..25 {
            let store = store_with(&[crowded_infra()]).await;
            seed_pr(&store, "pr-1", "alice", &["bob", "carol"]).await;
            let engine = Arc::new(engine(&store));

            let a = tokio::spawn({
                let engine = engine.clone();
                async move { engine.reassign_reviewer("pr-1", "bob").await }
            });
            let b = tokio::spawn({
                let engine = engine.clone();
                async move { engine.reassign_reviewer("pr-1", "bob").await }
            });
            let results = [a.await.unwrap(), b.await.unwrap()];

            let wins = results.iter().filter(|r| r.is_ok()).count();
            assert_eq!(wins, 1, "round {}", round);
            assert!(results
                .iter()
                .any(|r| matches!(r, Err(Error::ReviewerNotAssigned { .. }))));

            let pr = store.get_pull_request_by_id("pr-1").await.unwrap().unwrap();
            assert_eq!(pr.assigned_reviewers.len(), 2);
            assert!(!pr.has_reviewer("bob"));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_merge_and_reassign() {
        for _ in 0..25 {
            let store = store_with(&[crowded_infra()]).await;
            seed_pr(&store, "pr-1", "alice", &["bob", "carol"]).await;
            let engine = Arc::new(engine(&store));

            let reassign = tokio::spawn({
                let engine = engine.clone();
                async move { engine.reassign_reviewer("pr-1", "bob").await }
            });
            let merge = tokio::spawn({
                let engine = engine.clone();
                async move { engine.merge_pull_request("pr-1").await }
            });

            let reassigned = reassign.await.unwrap();
            merge.await.unwrap().unwrap();

            let pr = store.get_pull_request_by_id("pr-1").await.unwrap().unwrap();
            assert!(pr.is_merged());
            match reassigned {
                Ok(result) => {
                    assert!(pr.has_reviewer(&result.replaced_by));
                    assert!(!pr.has_reviewer("bob"));
                }
                Err(Error::PullRequestMerged(_)) => {
                    assert!(pr.has_reviewer("bob"));
                }
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
    }
}
