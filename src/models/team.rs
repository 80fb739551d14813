//! Maintenance team model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::user::UserShort;

/// Maintenance team record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceTeam {
    pub id: i32,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Team with its technician members, for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamDetails {
    pub id: i32,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub members: Vec<UserShort>,
}

/// Create team request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeam {
    #[validate(length(min = 1, message = "Team name is required"))]
    pub name: String,
}

/// Add team member request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddTeamMember {
    pub user_id: i32,
}
