use serde::{Deserialize, Serialize};

use super::{validate_name, User};
use crate::{Error, Result};

/// A member as listed inside a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl TeamMember {
    /// Create an active team member
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active: true,
        }
    }

    /// Set the active flag
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Turn this member into a user record belonging to `team_name`
    pub fn into_user(self, team_name: impl Into<String>) -> User {
        User {
            user_id: self.user_id,
            username: self.username,
            team_name: team_name.into(),
            is_active: self.is_active,
        }
    }
}

/// A team and its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl Team {
    /// Create a team with no members yet
    pub fn new(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            members: Vec::new(),
        }
    }

    /// Add a member
    pub fn with_member(mut self, member: TeamMember) -> Self {
        self.members.push(member);
        self
    }

    /// Validate name and member bounds before creation
    pub fn validate(&self) -> Result<()> {
        validate_name("team_name", &self.team_name)?;
        if self.members.is_empty() {
            return Err(Error::Validation(
                "team must have at least one member".to_string(),
            ));
        }
        for member in &self.members {
            validate_name("user_id", &member.user_id)?;
            validate_name("username", &member.username)?;
        }
        Ok(())
    }

    /// Sort members by user id, the order reads return them in
    pub fn sort_members(&mut self) {
        self.members.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    }
}
