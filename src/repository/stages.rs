//! Stage registry repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::stage::{CreateStage, MaintenanceStage},
    workflow::engine::StageRegistry,
};

#[derive(Clone)]
pub struct StagesRepository {
    pool: Pool<Postgres>,
}

impl StagesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all stages ordered by sequence
    pub async fn list(&self) -> AppResult<Vec<MaintenanceStage>> {
        let stages = sqlx::query_as::<_, MaintenanceStage>(
            "SELECT * FROM maintenance_stages ORDER BY sequence, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stages)
    }

    /// The initial stage: lowest sequence
    pub async fn first_stage(&self) -> AppResult<Option<MaintenanceStage>> {
        let stage = sqlx::query_as::<_, MaintenanceStage>(
            "SELECT * FROM maintenance_stages ORDER BY sequence, id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(stage)
    }

    /// Create a stage
    pub async fn create(&self, data: &CreateStage) -> AppResult<MaintenanceStage> {
        let stage = sqlx::query_as::<_, MaintenanceStage>(
            r#"
            INSERT INTO maintenance_stages (name, sequence, fold, is_done, is_scrap)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.sequence.unwrap_or(10))
        .bind(data.fold.unwrap_or(false))
        .bind(data.is_done.unwrap_or(false))
        .bind(data.is_scrap.unwrap_or(false))
        .fetch_one(&self.pool)
        .await?;
        Ok(stage)
    }

    /// Seed the default workflow stages when the registry is empty.
    ///
    /// Idempotent; run once at startup so request creation never has to
    /// bootstrap stages on the fly.
    pub async fn ensure_defaults(&self) -> AppResult<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM maintenance_stages")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO maintenance_stages (name, sequence, fold, is_done, is_scrap) VALUES
                ('New', 10, FALSE, FALSE, FALSE),
                ('In Progress', 20, FALSE, FALSE, FALSE),
                ('Repaired', 30, TRUE, TRUE, FALSE),
                ('Scrap', 40, TRUE, FALSE, TRUE)
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Seeded default maintenance stages");
        Ok(())
    }
}

#[async_trait]
impl StageRegistry for StagesRepository {
    async fn find_stage(&self, id: i32) -> AppResult<Option<MaintenanceStage>> {
        let stage =
            sqlx::query_as::<_, MaintenanceStage>("SELECT * FROM maintenance_stages WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(stage)
    }

    async fn done_stage(&self) -> AppResult<Option<MaintenanceStage>> {
        let stage = sqlx::query_as::<_, MaintenanceStage>(
            r#"
            SELECT * FROM maintenance_stages
            ORDER BY (NOT is_done), (LOWER(name) != 'repaired'), sequence
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        // Only a stage that actually matches one of the criteria qualifies
        Ok(stage.filter(|s| s.is_done || s.name.to_lowercase() == "repaired"))
    }

    async fn scrap_stage(&self) -> AppResult<Option<MaintenanceStage>> {
        let stage = sqlx::query_as::<_, MaintenanceStage>(
            r#"
            SELECT * FROM maintenance_stages
            ORDER BY (NOT is_scrap), (LOWER(name) != 'scrap'), sequence
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(stage.filter(|s| s.is_scrap || s.name.to_lowercase() == "scrap"))
    }
}
