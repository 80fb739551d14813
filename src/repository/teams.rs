//! Maintenance teams repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        team::{CreateTeam, MaintenanceTeam, TeamDetails},
        user::UserShort,
    },
    workflow::engine::TeamDirectory,
};

#[derive(Clone)]
pub struct TeamsRepository {
    pool: Pool<Postgres>,
}

impl TeamsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all teams
    pub async fn list(&self) -> AppResult<Vec<MaintenanceTeam>> {
        let teams = sqlx::query_as::<_, MaintenanceTeam>(
            "SELECT * FROM maintenance_teams ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(teams)
    }

    /// Get team by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<MaintenanceTeam> {
        sqlx::query_as::<_, MaintenanceTeam>("SELECT * FROM maintenance_teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", id)))
    }

    /// Get team with its members
    pub async fn get_details(&self, id: i32) -> AppResult<TeamDetails> {
        let team = self.get_by_id(id).await?;

        let members = sqlx::query_as::<_, UserShort>(
            r#"
            SELECT u.id, u.login, u.firstname, u.lastname, u.role
            FROM users u
            JOIN maintenance_team_members m ON m.user_id = u.id
            WHERE m.team_id = $1
            ORDER BY u.lastname, u.firstname
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(TeamDetails {
            id: team.id,
            name: team.name,
            active: team.active,
            created_at: team.created_at,
            members,
        })
    }

    /// Create a team
    pub async fn create(&self, data: &CreateTeam) -> AppResult<MaintenanceTeam> {
        let team = sqlx::query_as::<_, MaintenanceTeam>(
            "INSERT INTO maintenance_teams (name) VALUES ($1) RETURNING *",
        )
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(team)
    }

    /// Add a member to a team (no-op when already present)
    pub async fn add_member(&self, team_id: i32, user_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO maintenance_team_members (team_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove a member from a team
    pub async fn remove_member(&self, team_id: i32, user_id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM maintenance_team_members WHERE team_id = $1 AND user_id = $2",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "User {} is not a member of team {}",
                user_id, team_id
            )));
        }
        Ok(())
    }

    /// Teams a user belongs to
    pub async fn teams_of_user(&self, user_id: i32) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT team_id FROM maintenance_team_members WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Whether a user is a member of a team
    pub async fn is_member(&self, team_id: i32, user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM maintenance_team_members WHERE team_id = $1 AND user_id = $2)",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl TeamDirectory for TeamsRepository {
    async fn member_ids(&self, team_id: i32) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT user_id FROM maintenance_team_members WHERE team_id = $1",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
