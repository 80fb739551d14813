//! Activity log models for stage transitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::RequestState;

/// A stage transition event, emitted by the transition engine.
///
/// Emission is fire-and-forget: a failed write is logged server-side and
/// never surfaces to the caller of the transition.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StageChangeEvent {
    pub request_id: i32,
    pub actor_id: i32,
    pub old_stage_id: Option<i32>,
    pub new_stage_id: i32,
    pub old_state: Option<RequestState>,
    pub new_state: RequestState,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Persisted activity record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ActivityRecord {
    pub id: i32,
    pub request_id: i32,
    pub actor_id: i32,
    pub old_stage_id: Option<i32>,
    pub new_stage_id: i32,
    pub old_state: Option<RequestState>,
    pub new_state: RequestState,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
