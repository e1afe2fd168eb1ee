//! Team operations

use std::sync::Arc;

use tracing::info;

use crate::domain::Team;
use crate::store::TeamStore;
use crate::{Error, Result};

/// Creates and reads teams
pub struct TeamService {
    teams: Arc<dyn TeamStore>,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamStore>) -> Self {
        Self { teams }
    }

    /// Create a team and upsert its members.
    ///
    /// A user id that already exists elsewhere is moved into this team with
    /// the name and active flag given here.
    pub async fn create_team(&self, team: Team) -> Result<Team> {
        team.validate()?;

        if self.teams.team_exists(&team.team_name).await? {
            return Err(Error::TeamAlreadyExists(team.team_name));
        }

        let mut created = self.teams.create_team_with_members(&team).await?;
        created.sort_members();

        info!(
            team_name = %created.team_name,
            members_count = created.members.len(),
            "team created"
        );

        Ok(created)
    }

    /// Get a team with members ordered by user id
    pub async fn get_team(&self, team_name: &str) -> Result<Team> {
        let team = self
            .teams
            .get_team_with_members(team_name)
            .await?
            .ok_or_else(|| Error::TeamNotFound(team_name.to_string()))?;

        info!(
            team_name = %team.team_name,
            members_count = team.members.len(),
            "team retrieved"
        );

        Ok(team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TeamMember;
    use crate::store::MemoryStore;
    use std::io;
    use std::sync::Mutex;

    /// Collects formatted log lines for assertions
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn service() -> TeamService {
        TeamService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let service = service();
        let team = Team::new("infra")
            .with_member(TeamMember::new("carol", "Carol").with_active(false))
            .with_member(TeamMember::new("alice", "Alice"))
            .with_member(TeamMember::new("bob", "Bob"));

        let created = service.create_team(team.clone()).await.unwrap();
        let fetched = service.get_team("infra").await.unwrap();
        assert_eq!(created, fetched);

        let mut expected = team;
        expected.sort_members();
        assert_eq!(fetched, expected);
    }

    #[tokio::test]
    async fn test_duplicate_team() {
        let service = service();
        let team = Team::new("infra").with_member(TeamMember::new("alice", "Alice"));
        service.create_team(team.clone()).await.unwrap();

        let err = service.create_team(team).await.unwrap_err();
        assert!(matches!(err, Error::TeamAlreadyExists(name) if name == "infra"));
    }

    #[tokio::test]
    async fn test_create_validates() {
        let service = service();
        let err = service.create_team(Team::new("empty")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(matches!(
            service.get_team("empty").await,
            Err(Error::TeamNotFound(_))
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_get_team_logs_retrieval() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let service = service();
        let team = Team::new("infra")
            .with_member(TeamMember::new("alice", "Alice"))
            .with_member(TeamMember::new("bob", "Bob"));
        service.create_team(team).await.unwrap();
        service.get_team("infra").await.unwrap();

        let output = logs.contents();
        let line = output
            .lines()
            .find(|line| line.contains("team retrieved"))
            .unwrap();
        assert!(line.contains("team_name=infra"));
        assert!(line.contains("members_count=2"));
    }
}
