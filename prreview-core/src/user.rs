//! User operations

use std::sync::Arc;

use tracing::info;

use crate::domain::User;
use crate::store::UserStore;
use crate::{Error, Result};

/// Toggles reviewer availability
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Set whether the user can be picked as a reviewer.
    ///
    /// Existing assignments are left alone; the flag only affects future
    /// selections.
    pub async fn set_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let user = self
            .users
            .set_user_active(user_id, is_active)
            .await?
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;

        info!(
            user_id = %user.user_id,
            is_active = user.is_active,
            team_name = %user.team_name,
            "user active flag updated"
        );

        Ok(user)
    }
}
