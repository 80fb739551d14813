//! Maintenance request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        activity::ActivityRecord,
        request::{
            AssignTechnician, ChangeStage, CompleteRequest, CreateRequest, RequestQuery,
            RequestView, ScrapRequest,
        },
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List maintenance requests visible to the caller
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "Paginated requests", body = PaginatedResponse<RequestView>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<PaginatedResponse<RequestView>>> {
    let (items, total) = state.services.requests.list(claims.actor(), &query).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get a maintenance request by ID
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = RequestView),
        (status = 404, description = "Request not found or not visible")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RequestView>> {
    let request = state.services.requests.get(claims.actor(), id).await?;
    Ok(Json(request))
}

/// Create a maintenance request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created", body = RequestView),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<RequestView>)> {
    data.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let request = state.services.requests.create(claims.actor(), &data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Move a request into another stage
#[utoipa::path(
    post,
    path = "/requests/{id}/stage",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = ChangeStage,
    responses(
        (status = 200, description = "Stage changed", body = RequestView),
        (status = 403, description = "Transition not permitted"),
        (status = 404, description = "Request or stage not found")
    )
)]
pub async fn change_stage(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<ChangeStage>,
) -> AppResult<Json<RequestView>> {
    let request = state
        .services
        .requests
        .change_stage(claims.actor(), id, data.stage_id)
        .await?;
    Ok(Json(request))
}

/// Assign a technician to a request
#[utoipa::path(
    post,
    path = "/requests/{id}/assign",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = AssignTechnician,
    responses(
        (status = 200, description = "Technician assigned", body = RequestView),
        (status = 400, description = "Technician not in the maintenance team"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn assign_technician(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<AssignTechnician>,
) -> AppResult<Json<RequestView>> {
    let request = state
        .services
        .requests
        .assign_technician(claims.actor(), id, data.technician_id)
        .await?;
    Ok(Json(request))
}

/// Complete a request: move it to the done stage and record duration,
/// end date, cost and note in one operation
#[utoipa::path(
    post,
    path = "/requests/{id}/complete",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Request completed", body = RequestView),
        (status = 403, description = "Transition not permitted"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn complete_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CompleteRequest>,
) -> AppResult<Json<RequestView>> {
    let request = state
        .services
        .requests
        .complete(claims.actor(), id, &data)
        .await?;
    Ok(Json(request))
}

/// Scrap a request: move it to the scrap stage and deactivate the equipment
#[utoipa::path(
    post,
    path = "/requests/{id}/scrap",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = ScrapRequest,
    responses(
        (status = 200, description = "Request scrapped", body = RequestView),
        (status = 403, description = "Transition not permitted"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn scrap_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<ScrapRequest>,
) -> AppResult<Json<RequestView>> {
    let request = state
        .services
        .requests
        .scrap(claims.actor(), id, &data.reason)
        .await?;
    Ok(Json(request))
}

/// Delete a request still in the new state
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 400, description = "Request is no longer new"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn delete_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.requests.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Activity trail of a request
#[utoipa::path(
    get,
    path = "/requests/{id}/activity",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Stage change history", body = Vec<ActivityRecord>),
        (status = 404, description = "Request not found or not visible")
    )
)]
pub async fn request_activity(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<ActivityRecord>>> {
    let records = state.services.requests.activity(claims.actor(), id).await?;
    Ok(Json(records))
}
