//! Pull request repository

use prreview_core::{PullRequest, PullRequestShort};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::models::{now_timestamp, PullRequestRow, PullRequestShortRow};
use crate::{Error, Result};

/// Repository for pull requests and their reviewer slots
pub struct PullRequestRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PullRequestRepository<'a> {
    /// Create a new pull request repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a pull request and its reviewers in one transaction.
    ///
    /// `created_at` is set here; whatever the caller put there is ignored.
    pub async fn create(&self, pr: &PullRequest) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status, created_at)
            VALUES (?, ?, ?, 'OPEN', ?)
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(now_timestamp())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if Error::is_unique_violation(&e) {
                Error::PullRequestExists(pr.pull_request_id.clone())
            } else {
                e.into()
            }
        })?;

        Self::insert_reviewers(&mut tx, &pr.pull_request_id, &pr.assigned_reviewers).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn insert_reviewers(
        tx: &mut Transaction<'_, Sqlite>,
        pr_id: &str,
        reviewers: &[String],
    ) -> Result<()> {
        for (slot, reviewer) in reviewers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pr_reviewers (pull_request_id, reviewer_id, slot) VALUES (?, ?, ?)",
            )
            .bind(pr_id)
            .bind(reviewer)
            .bind(slot as i64)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Get a pull request with reviewers in slot order
    pub async fn get_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>> {
        // one read transaction so the row and its reviewers are consistent
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PullRequestRow>(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = ?
            "#,
        )
        .bind(pr_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reviewers: Vec<(String,)> = sqlx::query_as(
            "SELECT reviewer_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY slot",
        )
        .bind(pr_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let reviewers = reviewers.into_iter().map(|(id,)| id).collect();
        row.into_pull_request(reviewers).map(Some)
    }

    /// Check whether a pull request exists
    pub async fn exists(&self, pr_id: &str) -> Result<bool> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pull_requests WHERE pull_request_id = ?")
                .bind(pr_id)
                .fetch_one(self.pool)
                .await?;
        Ok(row.0 > 0)
    }

    /// Set status to merged with the current time. Returns whether a row
    /// was updated.
    pub async fn merge(&self, pr_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE pull_requests SET status = 'MERGED', merged_at = ? WHERE pull_request_id = ?",
        )
        .bind(now_timestamp())
        .bind(pr_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Swap one reviewer for another with a single conditional update.
    ///
    /// Matches nothing unless the pull request is open, `old_reviewer` holds
    /// a slot and `new_reviewer` holds none.
    pub async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_reviewer: &str,
        new_reviewer: &str,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE pr_reviewers
            SET reviewer_id = ?1, assigned_at = CURRENT_TIMESTAMP
            WHERE pull_request_id = ?2
              AND reviewer_id = ?3
              AND EXISTS (
                  SELECT 1 FROM pull_requests
                  WHERE pull_request_id = ?2 AND status = 'OPEN'
              )
              AND NOT EXISTS (
                  SELECT 1 FROM pr_reviewers
                  WHERE pull_request_id = ?2 AND reviewer_id = ?1
              )
            "#,
        )
        .bind(new_reviewer)
        .bind(pr_id)
        .bind(old_reviewer)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Pull requests where the user holds a reviewer slot, newest first
    pub async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        sqlx::query_as::<_, PullRequestShortRow>(
            r#"
            SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status
            FROM pull_requests p
            JOIN pr_reviewers r ON r.pull_request_id = p.pull_request_id
            WHERE r.reviewer_id = ?
            ORDER BY p.created_at DESC, p.rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(PullRequestShort::try_from)
        .collect()
    }
}
