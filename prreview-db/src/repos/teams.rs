//! Team repository

use prreview_core::{Team, TeamMember};
use sqlx::SqlitePool;

use crate::models::UserRow;
use crate::{Error, Result};

/// Repository for teams and their membership
pub struct TeamRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TeamRepository<'a> {
    /// Create a new team repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Check whether a team exists
    pub async fn exists(&self, team_name: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM teams WHERE team_name = ?")
            .bind(team_name)
            .fetch_one(self.pool)
            .await?;
        Ok(row.0 > 0)
    }

    /// Insert the team and upsert every member in one transaction
    pub async fn create_with_members(&self, team: &Team) -> Result<Team> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
            .bind(&team.team_name)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if Error::is_unique_violation(&e) {
                    Error::TeamExists(team.team_name.clone())
                } else {
                    e.into()
                }
            })?;

        for member in &team.members {
            sqlx::query(
                r#"
                INSERT INTO users (user_id, username, team_name, is_active)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (user_id) DO UPDATE SET
                    username = excluded.username,
                    team_name = excluded.team_name,
                    is_active = excluded.is_active,
                    updated_at = CURRENT_TIMESTAMP
                "#,
            )
            .bind(&member.user_id)
            .bind(&member.username)
            .bind(&team.team_name)
            .bind(member.is_active)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(team.clone())
    }

    /// Get a team with members ordered by user id
    pub async fn get_with_members(&self, team_name: &str) -> Result<Option<Team>> {
        if !self.exists(team_name).await? {
            return Ok(None);
        }

        let members = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE team_name = ?
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(TeamMember::from)
        .collect();

        Ok(Some(Team {
            team_name: team_name.to_string(),
            members,
        }))
    }
}
