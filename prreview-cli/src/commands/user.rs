//! User commands

use clap::{ArgAction, Args, Subcommand};
use prreview_core::{AssignmentEngine, Config, UserService};
use serde_json::json;

use super::{open_store, print_json};

/// User management commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Mark a user as available or unavailable for review
    SetActive {
        /// User id
        user_id: String,

        /// true or false
        #[arg(action = ArgAction::Set)]
        active: bool,
    },

    /// List pull requests the user is reviewing, newest first
    Reviews {
        /// User id
        user_id: String,
    },
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let store = open_store(config).await?;

        match &self.command {
            UserCommand::SetActive { user_id, active } => {
                let user = UserService::new(store).set_active(user_id, *active).await?;
                print_json(&user)
            }
            UserCommand::Reviews { user_id } => {
                let engine = AssignmentEngine::new(store.clone(), store);
                let pull_requests = engine.reviews_for_user(user_id).await?;
                print_json(&json!({
                    "user_id": user_id,
                    "pull_requests": pull_requests,
                }))
            }
        }
    }
}
