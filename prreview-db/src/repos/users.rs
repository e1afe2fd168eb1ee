//! User repository

use prreview_core::User;
use sqlx::SqlitePool;

use crate::models::UserRow;
use crate::Result;

/// Repository for user records
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by id
    pub async fn get_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Update the active flag and return the updated user
    pub async fn set_active(&self, user_id: &str, is_active: bool) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET is_active = ?, updated_at = CURRENT_TIMESTAMP
            WHERE user_id = ?
            RETURNING user_id, username, team_name, is_active
            "#,
        )
        .bind(is_active)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Active members of a team ordered by id, optionally minus one user
    pub async fn list_active_in_team(
        &self,
        team_name: &str,
        exclude: Option<&str>,
    ) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE team_name = ? AND is_active = 1 AND (? IS NULL OR user_id <> ?)
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .bind(exclude)
        .bind(exclude)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
