use serde::{Deserialize, Serialize};

/// A user and the team they belong to
///
/// `is_active` decides whether the user can be picked as a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}
