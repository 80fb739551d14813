//! Maintenance stage model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A step in the maintenance workflow.
///
/// Stages are static configuration: a handful of rows created at bootstrap,
/// read-only for the transition engine. `sequence` orders them; the stage
/// with the lowest sequence is the initial one. `is_done` and `is_scrap`
/// classify terminal stages; business rules only ever look at these flags
/// (and the classification derived from them), never at display names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceStage {
    pub id: i32,
    pub name: String,
    pub sequence: i32,
    /// UI hint: folded column in kanban views
    pub fold: bool,
    pub is_done: bool,
    pub is_scrap: bool,
}

/// Create stage request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStage {
    #[validate(length(min = 1, message = "Stage name is required"))]
    pub name: String,
    pub sequence: Option<i32>,
    pub fold: Option<bool>,
    pub is_done: Option<bool>,
    pub is_scrap: Option<bool>,
}
