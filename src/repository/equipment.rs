//! Equipment and category repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::equipment::{
        CreateCategory, CreateEquipment, Equipment, EquipmentCategory, UpdateEquipment,
    },
    workflow::engine::EquipmentStore,
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all equipment
    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Create equipment
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (
                name, serial_no, category_id, team_id, technician_id,
                assigned_user_id, location, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.serial_no)
        .bind(data.category_id)
        .bind(data.team_id)
        .bind(data.technician_id)
        .bind(data.assigned_user_id)
        .bind(&data.location)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update equipment
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.serial_no, "serial_no");
        add_field!(data.active, "active");
        add_field!(data.category_id, "category_id");
        add_field!(data.team_id, "team_id");
        add_field!(data.technician_id, "technician_id");
        add_field!(data.assigned_user_id, "assigned_user_id");
        add_field!(data.location, "location");
        add_field!(data.notes, "notes");

        let query = format!(
            "UPDATE equipment SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.serial_no);
        bind_field!(data.active);
        bind_field!(data.category_id);
        bind_field!(data.team_id);
        bind_field!(data.technician_id);
        bind_field!(data.assigned_user_id);
        bind_field!(data.location);
        bind_field!(data.notes);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Delete equipment
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    /// Equipment ids assigned to a user (custodian)
    pub async fn assigned_to_user(&self, user_id: i32) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> =
            sqlx::query_scalar("SELECT id FROM equipment WHERE assigned_user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List categories
    pub async fn list_categories(&self) -> AppResult<Vec<EquipmentCategory>> {
        let rows = sqlx::query_as::<_, EquipmentCategory>(
            "SELECT * FROM equipment_categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a category
    pub async fn create_category(&self, data: &CreateCategory) -> AppResult<EquipmentCategory> {
        let row = sqlx::query_as::<_, EquipmentCategory>(
            "INSERT INTO equipment_categories (name) VALUES ($1) RETURNING *",
        )
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl EquipmentStore for EquipmentRepository {
    async fn deactivate(&self, equipment_id: i32) -> AppResult<()> {
        sqlx::query("UPDATE equipment SET active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(equipment_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_scrapped(&self, equipment_id: i32, reason: String) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE equipment
            SET active = FALSE, scrap_date = NOW(), scrap_reason = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(equipment_id)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
