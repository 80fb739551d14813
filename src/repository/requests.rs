//! Maintenance requests repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RequestState,
        request::{CompleteRequest, MaintenanceRequest, NewRequest, RequestQuery, RequestView},
    },
    workflow::{engine::RequestStore, visibility::VisibilityScope},
};

/// Joined select backing [`RequestView`]; every filter condition only touches
/// `r.*` columns so the count query can skip the joins.
const VIEW_SELECT: &str = r#"
    SELECT r.id, r.subject, r.description, r.note, r.request_type, r.priority,
           r.equipment_id, e.name AS equipment_name,
           r.team_id, t.name AS team_name,
           r.category_id,
           r.technician_id,
           COALESCE(NULLIF(TRIM(CONCAT(u.firstname, ' ', u.lastname)), ''), u.login) AS technician_name,
           r.requester_id, r.created_by,
           r.stage_id, s.name AS stage_name,
           r.state, r.date_request, r.scheduled_date, r.date_start, r.date_end,
           r.duration, r.maintenance_cost,
           COALESCE(r.scheduled_date < NOW() AND r.state IN ('new', 'in_progress'), FALSE) AS is_overdue
    FROM maintenance_requests r
    JOIN equipment e ON e.id = r.equipment_id
    JOIN maintenance_stages s ON s.id = r.stage_id
    LEFT JOIN maintenance_teams t ON t.id = r.team_id
    LEFT JOIN users u ON u.id = r.technician_id
"#;

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<MaintenanceRequest> {
        sqlx::query_as::<_, MaintenanceRequest>("SELECT * FROM maintenance_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Maintenance request {} not found", id)))
    }

    /// Get the display view of a request
    pub async fn view(&self, id: i32) -> AppResult<RequestView> {
        let query = format!("{} WHERE r.id = $1", VIEW_SELECT);
        sqlx::query_as::<_, RequestView>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Maintenance request {} not found", id)))
    }

    /// Search requests within a visibility scope, with pagination.
    ///
    /// The scope condition is always ANDed with the explicit filters.
    pub async fn search(
        &self,
        scope: &VisibilityScope,
        query: &RequestQuery,
    ) -> AppResult<(Vec<RequestView>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(condition) = scope_condition(scope) {
            conditions.push(condition);
        }

        if let Some(state) = query.state {
            params.push(state.as_str().to_string());
            conditions.push(format!("r.state = ${}", params.len()));
        }

        if let Some(request_type) = query.request_type {
            params.push(request_type.as_str().to_string());
            conditions.push(format!("r.request_type = ${}", params.len()));
        }

        if let Some(equipment_id) = query.equipment_id {
            conditions.push(format!("r.equipment_id = {}", equipment_id));
        }

        if let Some(team_id) = query.team_id {
            conditions.push(format!("r.team_id = {}", team_id));
        }

        if let Some(technician_id) = query.technician_id {
            conditions.push(format!("r.technician_id = {}", technician_id));
        }

        if let Some(is_overdue) = query.is_overdue {
            if is_overdue {
                conditions.push(
                    "(r.scheduled_date < NOW() AND r.state IN ('new', 'in_progress'))".to_string(),
                );
            } else {
                conditions.push(
                    "NOT COALESCE(r.scheduled_date < NOW() AND r.state IN ('new', 'in_progress'), FALSE)"
                        .to_string(),
                );
            }
        }

        if let Some(from) = query.scheduled_from {
            conditions.push(format!("r.scheduled_date >= '{}'", from.to_rfc3339()));
        }

        if let Some(to) = query.scheduled_to {
            conditions.push(format!("r.scheduled_date <= '{}'", to.to_rfc3339()));
        }

        if let Some(ref search) = query.search {
            params.push(format!("%{}%", search.to_lowercase()));
            conditions.push(format!("LOWER(r.subject) LIKE ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!(
            "SELECT COUNT(*) FROM maintenance_requests r {}",
            where_clause
        );
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_builder = count_builder.bind(param);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            "{} {} ORDER BY r.priority DESC, r.date_request DESC LIMIT {} OFFSET {}",
            VIEW_SELECT, where_clause, per_page, offset
        );
        let mut select_builder = sqlx::query_as::<_, RequestView>(&select_query);
        for param in &params {
            select_builder = select_builder.bind(param);
        }
        let requests = select_builder.fetch_all(&self.pool).await?;

        Ok((requests, total))
    }

    /// Insert a new request
    pub async fn insert(&self, data: &NewRequest) -> AppResult<MaintenanceRequest> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            INSERT INTO maintenance_requests (
                subject, description, request_type, priority, equipment_id,
                team_id, category_id, technician_id, requester_id, created_by,
                stage_id, state, scheduled_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(&data.subject)
        .bind(&data.description)
        .bind(data.request_type)
        .bind(&data.priority)
        .bind(data.equipment_id)
        .bind(data.team_id)
        .bind(data.category_id)
        .bind(data.technician_id)
        .bind(data.requester_id)
        .bind(data.created_by)
        .bind(data.stage_id)
        .bind(data.state)
        .bind(data.scheduled_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    /// Set the assigned technician
    pub async fn assign_technician(
        &self,
        id: i32,
        technician_id: i32,
    ) -> AppResult<MaintenanceRequest> {
        sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests
            SET technician_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(technician_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Maintenance request {} not found", id)))
    }

    /// Record the completion details set by the complete operation
    pub async fn update_completion(
        &self,
        id: i32,
        data: &CompleteRequest,
        date_end: DateTime<Utc>,
    ) -> AppResult<MaintenanceRequest> {
        sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests
            SET duration = COALESCE($2, duration),
                date_end = $3,
                maintenance_cost = COALESCE($4, maintenance_cost),
                note = COALESCE($5, note),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.duration)
        .bind(date_end)
        .bind(data.maintenance_cost)
        .bind(&data.note)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Maintenance request {} not found", id)))
    }

    /// Delete a request
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM maintenance_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Maintenance request {} not found",
                id
            )));
        }
        Ok(())
    }
}

/// Render a visibility scope as a SQL condition on `r.*` (None = unrestricted)
fn scope_condition(scope: &VisibilityScope) -> Option<String> {
    match scope {
        VisibilityScope::All => None,
        VisibilityScope::Technician { actor_id, team_ids } => {
            if team_ids.is_empty() {
                Some(format!("r.technician_id = {}", actor_id))
            } else {
                let ids = team_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(format!(
                    "(r.technician_id = {} OR r.team_id IN ({}))",
                    actor_id, ids
                ))
            }
        }
        VisibilityScope::User {
            actor_id,
            equipment_ids,
        } => {
            if equipment_ids.is_empty() {
                Some(format!(
                    "(r.requester_id = {} OR r.created_by = {})",
                    actor_id, actor_id
                ))
            } else {
                let ids = equipment_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(format!(
                    "(r.requester_id = {} OR r.created_by = {} OR r.equipment_id IN ({}))",
                    actor_id, actor_id, ids
                ))
            }
        }
    }
}

#[async_trait]
impl RequestStore for RequestsRepository {
    async fn find_request(&self, id: i32) -> AppResult<Option<MaintenanceRequest>> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            "SELECT * FROM maintenance_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn update_stage(
        &self,
        id: i32,
        stage_id: i32,
        state: RequestState,
        date_start: Option<DateTime<Utc>>,
    ) -> AppResult<MaintenanceRequest> {
        sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests
            SET stage_id = $2, state = $3,
                date_start = COALESCE($4, date_start),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(stage_id)
        .bind(state)
        .bind(date_start)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Maintenance request {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Actor, Role};

    #[test]
    fn test_scope_condition_rendering() {
        assert_eq!(scope_condition(&VisibilityScope::All), None);

        let scope = VisibilityScope::for_actor(
            Actor { id: 10, role: Role::Technician },
            vec![1, 2],
            vec![],
        );
        assert_eq!(
            scope_condition(&scope).unwrap(),
            "(r.technician_id = 10 OR r.team_id IN (1, 2))"
        );

        let scope = VisibilityScope::for_actor(
            Actor { id: 10, role: Role::Technician },
            vec![],
            vec![],
        );
        assert_eq!(scope_condition(&scope).unwrap(), "r.technician_id = 10");

        let scope = VisibilityScope::for_actor(
            Actor { id: 20, role: Role::User },
            vec![],
            vec![5],
        );
        assert_eq!(
            scope_condition(&scope).unwrap(),
            "(r.requester_id = 20 OR r.created_by = 20 OR r.equipment_id IN (5))"
        );
    }
}
