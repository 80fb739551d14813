//! Maintenance request lifecycle service.
//!
//! The higher-level operations (create, assign, complete, scrap, delete)
//! built on the transition engine, plus the visibility-scoped read side.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        activity::{ActivityRecord, StageChangeEvent},
        enums::{RequestState, RequestType},
        request::{
            CompleteRequest, CreateRequest, NewRequest, RequestQuery, RequestView,
        },
        user::{Actor, Role},
    },
    repository::Repository,
    workflow::{
        derive_state,
        engine::{ActivityLog, TransitionEngine},
        visibility::VisibilityScope,
        StageClass,
    },
};

const PRIORITIES: [&str; 4] = ["0", "1", "2", "3"];

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Wire the transition engine to the repository collaborators
    fn engine(&self) -> TransitionEngine<'_> {
        TransitionEngine::new(
            &self.repository.requests,
            &self.repository.stages,
            &self.repository.teams,
            &self.repository.equipment,
            &self.repository.activity,
        )
    }

    /// Resolve the actor's visibility scope.
    ///
    /// Memberships are looked up fresh per operation; the scope itself stays
    /// a pure value after that.
    async fn scope_for(&self, actor: Actor) -> AppResult<VisibilityScope> {
        match actor.role {
            Role::Admin | Role::Manager => Ok(VisibilityScope::All),
            Role::Technician => {
                let teams = self.repository.teams.teams_of_user(actor.id).await?;
                Ok(VisibilityScope::for_actor(actor, teams, Vec::new()))
            }
            Role::User => {
                let equipment = self.repository.equipment.assigned_to_user(actor.id).await?;
                Ok(VisibilityScope::for_actor(actor, Vec::new(), equipment))
            }
        }
    }

    /// List requests visible to the actor, with explicit filters applied on top
    pub async fn list(
        &self,
        actor: Actor,
        query: &RequestQuery,
    ) -> AppResult<(Vec<RequestView>, i64)> {
        let scope = self.scope_for(actor).await?;
        self.repository.requests.search(&scope, query).await
    }

    /// Get a single request.
    ///
    /// Single-record fetches are visibility-gated like listings; requests
    /// outside the actor's scope read as not found rather than forbidden, so
    /// ids outside the scope leak nothing.
    pub async fn get(&self, actor: Actor, id: i32) -> AppResult<RequestView> {
        let request = self.repository.requests.get_by_id(id).await?;
        let scope = self.scope_for(actor).await?;
        if !scope.allows(&request) {
            return Err(AppError::NotFound(format!(
                "Maintenance request {} not found",
                id
            )));
        }
        self.repository.requests.view(id).await
    }

    /// Activity trail of a request, under the same visibility rule as `get`
    pub async fn activity(&self, actor: Actor, id: i32) -> AppResult<Vec<ActivityRecord>> {
        let request = self.repository.requests.get_by_id(id).await?;
        let scope = self.scope_for(actor).await?;
        if !scope.allows(&request) {
            return Err(AppError::NotFound(format!(
                "Maintenance request {} not found",
                id
            )));
        }
        self.repository.activity.list_for_request(id).await
    }

    /// Create a request, inheriting team, category and technician defaults
    /// from the equipment, into the initial stage
    pub async fn create(&self, actor: Actor, data: &CreateRequest) -> AppResult<RequestView> {
        let priority = data.priority.clone().unwrap_or_else(|| "1".to_string());
        if !PRIORITIES.contains(&priority.as_str()) {
            return Err(AppError::Validation(
                "Priority must be between 0 and 3".to_string(),
            ));
        }

        let equipment = self.repository.equipment.get_by_id(data.equipment_id).await?;

        let stage = self
            .repository
            .stages
            .first_stage()
            .await?
            .ok_or_else(|| AppError::Internal("Stage registry is empty".to_string()))?;
        let state = derive_state(StageClass::of(&stage));

        let new_request = NewRequest {
            subject: data.subject.clone(),
            description: data.description.clone(),
            request_type: data.request_type.unwrap_or(RequestType::Corrective),
            priority,
            equipment_id: equipment.id,
            team_id: equipment.team_id,
            category_id: equipment.category_id,
            technician_id: equipment.technician_id,
            requester_id: data.requester_id.unwrap_or(actor.id),
            created_by: actor.id,
            stage_id: stage.id,
            state,
            scheduled_date: data.scheduled_date,
        };

        let request = self.repository.requests.insert(&new_request).await?;

        // Creation shows up in the activity trail; emission is best-effort
        let event = StageChangeEvent {
            request_id: request.id,
            actor_id: actor.id,
            old_stage_id: None,
            new_stage_id: stage.id,
            old_state: None,
            new_state: state,
            note: None,
            occurred_at: Utc::now(),
        };
        if let Err(e) = self.repository.activity.record(event).await {
            tracing::warn!(
                "Failed to record creation of request {}: {}",
                request.id,
                e
            );
        }

        self.repository.requests.view(request.id).await
    }

    /// Move a request into a stage through the transition engine
    pub async fn change_stage(
        &self,
        actor: Actor,
        id: i32,
        stage_id: i32,
    ) -> AppResult<RequestView> {
        self.engine().change_stage(actor, id, stage_id, None).await?;
        self.repository.requests.view(id).await
    }

    /// Assign a technician without touching the stage.
    ///
    /// Admins may assign anyone; everyone else may only assign a member of
    /// the request's maintenance team.
    pub async fn assign_technician(
        &self,
        actor: Actor,
        id: i32,
        technician_id: i32,
    ) -> AppResult<RequestView> {
        let request = self.repository.requests.get_by_id(id).await?;

        if actor.role != Role::Admin {
            let in_team = match request.team_id {
                Some(team_id) => self.repository.teams.is_member(team_id, technician_id).await?,
                None => false,
            };
            if !in_team {
                return Err(AppError::Validation(
                    "Technician is not a member of the maintenance team".to_string(),
                ));
            }
        }

        self.repository.requests.assign_technician(id, technician_id).await?;
        self.repository.requests.view(id).await
    }

    /// Complete shortcut: move to the done stage and record the completion
    /// details in the same operation
    pub async fn complete(
        &self,
        actor: Actor,
        id: i32,
        data: &CompleteRequest,
    ) -> AppResult<RequestView> {
        let engine = self.engine();
        let done = engine.resolve_done_stage().await?;
        engine.change_stage(actor, id, done.id, None).await?;

        let date_end = data.date_end.unwrap_or_else(Utc::now);
        self.repository.requests.update_completion(id, data, date_end).await?;

        self.repository.requests.view(id).await
    }

    /// Scrap shortcut: move to the scrap stage; the engine stamps the
    /// equipment with the scrap date and reason
    pub async fn scrap(&self, actor: Actor, id: i32, reason: &str) -> AppResult<RequestView> {
        let engine = self.engine();
        let stage = engine.resolve_scrap_stage().await?;
        engine
            .change_stage(actor, id, stage.id, Some(reason.to_string()))
            .await?;
        self.repository.requests.view(id).await
    }

    /// Delete a request; only permitted while it is still new
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let request = self.repository.requests.get_by_id(id).await?;
        if request.state != RequestState::New {
            return Err(AppError::Validation(
                "Only requests in the new state can be deleted".to_string(),
            ));
        }
        self.repository.requests.delete(id).await
    }
}
