//! Maintenance request model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{RequestState, RequestType};

/// Maintenance request from database.
///
/// `state` is derived from `stage_id` by the transition engine and is never
/// written independently of a stage change. `equipment_id`, `requester_id`
/// and `created_by` are set at creation and never reassigned.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceRequest {
    pub id: i32,
    pub subject: String,
    pub description: Option<String>,
    pub note: Option<String>,
    pub request_type: RequestType,
    /// Ordinal priority, "0" (low) to "3" (critical)
    pub priority: String,
    pub equipment_id: i32,
    pub team_id: Option<i32>,
    pub category_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub requester_id: i32,
    pub created_by: i32,
    pub stage_id: i32,
    pub state: RequestState,
    pub date_request: DateTime<Utc>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
    /// Hours spent
    pub duration: Option<f64>,
    pub maintenance_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Maintenance request with joined display fields
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RequestView {
    pub id: i32,
    pub subject: String,
    pub description: Option<String>,
    pub note: Option<String>,
    pub request_type: RequestType,
    pub priority: String,
    pub equipment_id: i32,
    pub equipment_name: String,
    pub team_id: Option<i32>,
    pub team_name: Option<String>,
    pub category_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub technician_name: Option<String>,
    pub requester_id: i32,
    pub created_by: i32,
    pub stage_id: i32,
    pub stage_name: String,
    pub state: RequestState,
    pub date_request: DateTime<Utc>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
    pub duration: Option<f64>,
    pub maintenance_cost: Option<Decimal>,
    pub is_overdue: bool,
}

/// Fully-defaulted insert payload, produced by the request service after
/// applying the equipment defaults and the initial stage
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub subject: String,
    pub description: Option<String>,
    pub request_type: RequestType,
    pub priority: String,
    pub equipment_id: i32,
    pub team_id: Option<i32>,
    pub category_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub requester_id: i32,
    pub created_by: i32,
    pub stage_id: i32,
    pub state: RequestState,
    pub scheduled_date: Option<DateTime<Utc>>,
}

/// Create maintenance request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    pub description: Option<String>,
    pub equipment_id: i32,
    pub request_type: Option<RequestType>,
    #[validate(length(min = 1, max = 1, message = "Priority must be a single digit"))]
    pub priority: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    /// Requester on whose behalf the request is opened; defaults to the actor
    pub requester_id: Option<i32>,
}

/// Request list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct RequestQuery {
    pub state: Option<RequestState>,
    pub request_type: Option<RequestType>,
    pub equipment_id: Option<i32>,
    pub team_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub is_overdue: Option<bool>,
    pub scheduled_from: Option<DateTime<Utc>>,
    pub scheduled_to: Option<DateTime<Utc>>,
    /// Free-text search on the subject
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Change stage request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStage {
    pub stage_id: i32,
}

/// Assign technician request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignTechnician {
    pub technician_id: i32,
}

/// Complete request payload
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CompleteRequest {
    /// Hours spent
    pub duration: Option<f64>,
    /// Defaults to now when unset
    pub date_end: Option<DateTime<Utc>>,
    pub maintenance_cost: Option<Decimal>,
    pub note: Option<String>,
}

/// Scrap request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScrapRequest {
    pub reason: String,
}
