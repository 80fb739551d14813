//! Maintenance team endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::team::{AddTeamMember, CreateTeam, MaintenanceTeam, TeamDetails},
};

use super::AuthenticatedUser;

/// List maintenance teams
#[utoipa::path(
    get,
    path = "/teams",
    tag = "teams",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Teams", body = Vec<MaintenanceTeam>)
    )
)]
pub async fn list_teams(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<MaintenanceTeam>>> {
    let teams = state.services.teams.list().await?;
    Ok(Json(teams))
}

/// Get a team with its members
#[utoipa::path(
    get,
    path = "/teams/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team details", body = TeamDetails),
        (status = 404, description = "Team not found")
    )
)]
pub async fn get_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TeamDetails>> {
    let team = state.services.teams.get(id).await?;
    Ok(Json(team))
}

/// Create a team (admin or manager)
#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    security(("bearer_auth" = [])),
    request_body = CreateTeam,
    responses(
        (status = 201, description = "Team created", body = MaintenanceTeam),
        (status = 403, description = "Manager privileges required")
    )
)]
pub async fn create_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateTeam>,
) -> AppResult<(StatusCode, Json<MaintenanceTeam>)> {
    claims.require_supervisor()?;
    data.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let team = state.services.teams.create(&data).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// Add a member to a team (admin or manager)
#[utoipa::path(
    post,
    path = "/teams/{id}/members",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    request_body = AddTeamMember,
    responses(
        (status = 200, description = "Member added", body = TeamDetails),
        (status = 404, description = "Team or user not found")
    )
)]
pub async fn add_team_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<AddTeamMember>,
) -> AppResult<Json<TeamDetails>> {
    claims.require_supervisor()?;
    let team = state.services.teams.add_member(id, data.user_id).await?;
    Ok(Json(team))
}

/// Remove a member from a team (admin or manager)
#[utoipa::path(
    delete,
    path = "/teams/{id}/members/{user_id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Team ID"),
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Member removed", body = TeamDetails),
        (status = 404, description = "Team or membership not found")
    )
)]
pub async fn remove_team_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, user_id)): Path<(i32, i32)>,
) -> AppResult<Json<TeamDetails>> {
    claims.require_supervisor()?;
    let team = state.services.teams.remove_member(id, user_id).await?;
    Ok(Json(team))
}
