//! Pull request commands

use clap::{Args, Subcommand};
use prreview_core::{AssignmentEngine, Config};
use serde_json::json;

use super::{open_store, print_json};

/// Pull request commands
#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Open a pull request and assign reviewers from the author's team
    Create {
        /// Pull request id
        id: String,

        /// Pull request title
        name: String,

        /// Author user id
        #[arg(short, long)]
        author: String,
    },

    /// Mark a pull request as merged
    Merge {
        /// Pull request id
        id: String,
    },

    /// Replace a reviewer with another member of their team
    Reassign {
        /// Pull request id
        id: String,

        /// Reviewer to replace
        #[arg(long = "old")]
        old_user_id: String,
    },
}

impl PrArgs {
    /// Execute the pull request command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let store = open_store(config).await?;
        let engine = AssignmentEngine::new(store.clone(), store);

        match &self.command {
            PrCommand::Create { id, name, author } => {
                print_json(&engine.create_pull_request(id, name, author).await?)
            }
            PrCommand::Merge { id } => print_json(&engine.merge_pull_request(id).await?),
            PrCommand::Reassign { id, old_user_id } => {
                let result = engine.reassign_reviewer(id, old_user_id).await?;
                print_json(&json!({
                    "pr": result.pull_request,
                    "replaced_by": result.replaced_by,
                }))
            }
        }
    }
}
