//! Maintenance stage endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::stage::{CreateStage, MaintenanceStage},
};

use super::AuthenticatedUser;

/// List workflow stages
#[utoipa::path(
    get,
    path = "/stages",
    tag = "stages",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stages in workflow order", body = Vec<MaintenanceStage>)
    )
)]
pub async fn list_stages(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<MaintenanceStage>>> {
    let stages = state.services.stages.list().await?;
    Ok(Json(stages))
}

/// Create a workflow stage (admin only)
#[utoipa::path(
    post,
    path = "/stages",
    tag = "stages",
    security(("bearer_auth" = [])),
    request_body = CreateStage,
    responses(
        (status = 201, description = "Stage created", body = MaintenanceStage),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn create_stage(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateStage>,
) -> AppResult<(StatusCode, Json<MaintenanceStage>)> {
    claims.require_admin()?;
    data.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let stage = state.services.stages.create(&data).await?;
    Ok((StatusCode::CREATED, Json(stage)))
}
