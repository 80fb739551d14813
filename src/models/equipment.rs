//! Equipment and equipment category models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    pub serial_no: Option<String>,
    /// Cleared when a maintenance request on this equipment reaches a scrap stage
    pub active: bool,
    pub category_id: Option<i32>,
    /// Default maintenance team for new requests on this equipment
    pub team_id: Option<i32>,
    /// Default technician for new requests on this equipment
    pub technician_id: Option<i32>,
    /// Custodian: the regular user this equipment is assigned to
    pub assigned_user_id: Option<i32>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub scrap_date: Option<DateTime<Utc>>,
    pub scrap_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Equipment name is required"))]
    pub name: String,
    pub serial_no: Option<String>,
    pub category_id: Option<i32>,
    pub team_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub assigned_user_id: Option<i32>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Update equipment request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEquipment {
    pub name: Option<String>,
    pub serial_no: Option<String>,
    pub active: Option<bool>,
    pub category_id: Option<i32>,
    pub team_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub assigned_user_id: Option<i32>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Equipment category record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentCategory {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Create category request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
}
