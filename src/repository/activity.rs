//! Activity log repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::activity::{ActivityRecord, StageChangeEvent},
    workflow::engine::ActivityLog,
};

#[derive(Clone)]
pub struct ActivityRepository {
    pool: Pool<Postgres>,
}

impl ActivityRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Activity for a request, newest first
    pub async fn list_for_request(&self, request_id: i32) -> AppResult<Vec<ActivityRecord>> {
        let records = sqlx::query_as::<_, ActivityRecord>(
            r#"
            SELECT * FROM maintenance_activity
            WHERE request_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}

#[async_trait]
impl ActivityLog for ActivityRepository {
    async fn record(&self, event: StageChangeEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO maintenance_activity (
                request_id, actor_id, old_stage_id, new_stage_id,
                old_state, new_state, note, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.request_id)
        .bind(event.actor_id)
        .bind(event.old_stage_id)
        .bind(event.new_stage_id)
        .bind(event.old_state)
        .bind(event.new_state)
        .bind(&event.note)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
