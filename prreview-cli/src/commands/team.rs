//! Team commands

use clap::{Args, Subcommand};
use prreview_core::{Config, Team, TeamMember, TeamService};

use super::{open_store, print_json};

/// Team management commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Create a team with its members
    Add {
        /// Team name
        name: String,

        /// Member as `user_id:username` or `user_id:username:inactive`
        #[arg(short, long = "member", required = true, value_parser = parse_member)]
        members: Vec<TeamMember>,
    },

    /// Show a team and its members
    Get {
        /// Team name
        name: String,
    },
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let service = TeamService::new(open_store(config).await?);

        match &self.command {
            TeamCommand::Add { name, members } => {
                let team = Team {
                    team_name: name.clone(),
                    members: members.clone(),
                };
                print_json(&service.create_team(team).await?)
            }
            TeamCommand::Get { name } => print_json(&service.get_team(name).await?),
        }
    }
}

/// Parse `user_id:username[:active|inactive]`
fn parse_member(s: &str) -> Result<TeamMember, String> {
    let mut parts = s.splitn(3, ':');
    let (Some(user_id), Some(username)) = (parts.next(), parts.next()) else {
        return Err(format!("expected user_id:username, got '{}'", s));
    };
    if user_id.is_empty() || username.is_empty() {
        return Err(format!("expected user_id:username, got '{}'", s));
    }

    let is_active = match parts.next() {
        None | Some("active") => true,
        Some("inactive") => false,
        Some(other) => {
            return Err(format!(
                "member state must be 'active' or 'inactive', got '{}'",
                other
            ))
        }
    };

    Ok(TeamMember::new(user_id, username).with_active(is_active))
}
