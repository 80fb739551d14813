//! Maintenance teams service

use crate::{
    error::AppResult,
    models::team::{CreateTeam, MaintenanceTeam, TeamDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct TeamsService {
    repository: Repository,
}

impl TeamsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all teams
    pub async fn list(&self) -> AppResult<Vec<MaintenanceTeam>> {
        self.repository.teams.list().await
    }

    /// Get a team with its members
    pub async fn get(&self, id: i32) -> AppResult<TeamDetails> {
        self.repository.teams.get_details(id).await
    }

    /// Create a team
    pub async fn create(&self, data: &CreateTeam) -> AppResult<MaintenanceTeam> {
        self.repository.teams.create(data).await
    }

    /// Add a member to a team
    pub async fn add_member(&self, team_id: i32, user_id: i32) -> AppResult<TeamDetails> {
        // Both sides must exist; membership insert is idempotent
        self.repository.teams.get_by_id(team_id).await?;
        self.repository.users.get_by_id(user_id).await?;
        self.repository.teams.add_member(team_id, user_id).await?;
        self.repository.teams.get_details(team_id).await
    }

    /// Remove a member from a team
    pub async fn remove_member(&self, team_id: i32, user_id: i32) -> AppResult<TeamDetails> {
        self.repository.teams.remove_member(team_id, user_id).await?;
        self.repository.teams.get_details(team_id).await
    }
}
