//! Stage transition engine.
//!
//! Applies a validated, authorized stage change and keeps the derived state
//! consistent. The engine owns the stage → state rule: nothing else writes
//! `state`. Collaborators (request store, stage registry, team directory,
//! equipment store, activity log) are reached through traits so the engine
//! can be exercised without a database.
//!
//! Failure isolation: authorization and validation happen before any write.
//! The two secondary writes (equipment deactivation on scrap, activity-log
//! emission) are best-effort; their failure is logged and never unwinds the
//! already-committed stage change.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use crate::error::{AppError, AppResult};
use crate::models::{
    activity::StageChangeEvent,
    enums::RequestState,
    request::MaintenanceRequest,
    stage::MaintenanceStage,
    user::Actor,
};

use super::authorizer::{authorize_stage_change, RequestSnapshot};
use super::{derive_state, StageClass};

/// Persistence for maintenance requests, as needed by the engine
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn find_request(&self, id: i32) -> AppResult<Option<MaintenanceRequest>>;

    /// Persist a stage change and its derived state in one write.
    /// `date_start` is only written when `Some` (first move into progress).
    async fn update_stage(
        &self,
        id: i32,
        stage_id: i32,
        state: RequestState,
        date_start: Option<DateTime<Utc>>,
    ) -> AppResult<MaintenanceRequest>;
}

/// Read access to the stage catalog
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StageRegistry: Send + Sync {
    async fn find_stage(&self, id: i32) -> AppResult<Option<MaintenanceStage>>;

    /// The terminal success stage: first stage flagged `is_done`, falling
    /// back to a stage named "Repaired"
    async fn done_stage(&self) -> AppResult<Option<MaintenanceStage>>;

    /// The terminal disposal stage: first stage flagged `is_scrap`, falling
    /// back to a stage named "Scrap"
    async fn scrap_stage(&self) -> AppResult<Option<MaintenanceStage>>;
}

/// Team membership lookup
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn member_ids(&self, team_id: i32) -> AppResult<Vec<i32>>;
}

/// Side-effect writes on equipment
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    /// Clear the active flag
    async fn deactivate(&self, equipment_id: i32) -> AppResult<()>;

    /// Clear the active flag and record scrap date and reason
    async fn mark_scrapped(&self, equipment_id: i32, reason: String) -> AppResult<()>;
}

/// Fire-and-forget activity sink
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn record(&self, event: StageChangeEvent) -> AppResult<()>;
}

/// The transition engine, wired to its collaborators per invocation
pub struct TransitionEngine<'a> {
    requests: &'a dyn RequestStore,
    stages: &'a dyn StageRegistry,
    teams: &'a dyn TeamDirectory,
    equipment: &'a dyn EquipmentStore,
    activity: &'a dyn ActivityLog,
}

impl<'a> TransitionEngine<'a> {
    pub fn new(
        requests: &'a dyn RequestStore,
        stages: &'a dyn StageRegistry,
        teams: &'a dyn TeamDirectory,
        equipment: &'a dyn EquipmentStore,
        activity: &'a dyn ActivityLog,
    ) -> Self {
        Self {
            requests,
            stages,
            teams,
            equipment,
            activity,
        }
    }

    /// Move a request into the given stage.
    ///
    /// Loads the request and target stage (failing not-found before anything
    /// else), asks the authorizer for a verdict, then persists the stage with
    /// its derived state. Re-entering the current stage is a no-op: the
    /// request is returned unchanged and no side effect fires.
    ///
    /// `scrap_reason` is only consulted when the target is a scrap stage; it
    /// selects the richer equipment stamping used by the dedicated scrap
    /// operation.
    pub async fn change_stage(
        &self,
        actor: Actor,
        request_id: i32,
        target_stage_id: i32,
        scrap_reason: Option<String>,
    ) -> AppResult<MaintenanceRequest> {
        let request = self
            .requests
            .find_request(request_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Maintenance request {} not found", request_id))
            })?;

        let stage = self
            .stages
            .find_stage(target_stage_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Stage {} not found", target_stage_id)))?;

        let members = match request.team_id {
            Some(team_id) => self.teams.member_ids(team_id).await?,
            None => Vec::new(),
        };

        let snapshot = RequestSnapshot {
            technician_id: request.technician_id,
            team_members: &members,
            requester_id: request.requester_id,
            created_by: request.created_by,
        };

        let class = StageClass::of(&stage);
        authorize_stage_change(actor, &snapshot, class).into_result()?;

        if request.stage_id == stage.id {
            return Ok(request);
        }

        let new_state = derive_state(class);
        let now = Utc::now();

        // Stamp the work start on the first move into progress
        let date_start = match (new_state, request.date_start) {
            (RequestState::InProgress, None) => Some(now),
            _ => None,
        };

        let updated = self
            .requests
            .update_stage(request_id, stage.id, new_state, date_start)
            .await?;

        // The stage change above is committed; equipment deactivation is
        // best-effort and never rolls it back.
        if new_state == RequestState::Scrap {
            let result = match &scrap_reason {
                Some(reason) => {
                    self.equipment
                        .mark_scrapped(request.equipment_id, reason.clone())
                        .await
                }
                None => self.equipment.deactivate(request.equipment_id).await,
            };
            if let Err(e) = result {
                tracing::error!(
                    "Failed to deactivate equipment {} for scrapped request {}: {}",
                    request.equipment_id,
                    request_id,
                    e
                );
            }
        }

        let event = StageChangeEvent {
            request_id,
            actor_id: actor.id,
            old_stage_id: Some(request.stage_id),
            new_stage_id: stage.id,
            old_state: Some(request.state),
            new_state,
            note: scrap_reason,
            occurred_at: now,
        };
        if let Err(e) = self.activity.record(event).await {
            tracing::warn!(
                "Failed to record stage change for request {}: {}",
                request_id,
                e
            );
        }

        Ok(updated)
    }

    /// Resolve the stage used by the complete shortcut
    pub async fn resolve_done_stage(&self) -> AppResult<MaintenanceStage> {
        self.stages
            .done_stage()
            .await?
            .ok_or_else(|| AppError::NotFound("No done stage configured".to_string()))
    }

    /// Resolve the stage used by the scrap shortcut
    pub async fn resolve_scrap_stage(&self) -> AppResult<MaintenanceStage> {
        self.stages
            .scrap_stage()
            .await?
            .ok_or_else(|| AppError::NotFound("No scrap stage configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::RequestType;
    use crate::models::user::Role;
    use mockall::predicate::eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const ADMIN: Actor = Actor { id: 1, role: Role::Admin };
    const TECH_X: Actor = Actor { id: 10, role: Role::Technician };
    const TECH_Y: Actor = Actor { id: 11, role: Role::Technician };
    const USER_U: Actor = Actor { id: 20, role: Role::User };

    const EQUIPMENT_E: i32 = 40;
    const TEAM_T: i32 = 7;

    fn stage(id: i32, name: &str, sequence: i32, is_done: bool, is_scrap: bool) -> MaintenanceStage {
        MaintenanceStage {
            id,
            name: name.to_string(),
            sequence,
            fold: false,
            is_done,
            is_scrap,
        }
    }

    fn default_stages() -> Vec<MaintenanceStage> {
        vec![
            stage(1, "New", 10, false, false),
            stage(2, "In Progress", 20, false, false),
            stage(3, "Repaired", 30, true, false),
            stage(4, "Scrap", 40, false, true),
        ]
    }

    fn request(id: i32, stage_id: i32, state: RequestState) -> MaintenanceRequest {
        MaintenanceRequest {
            id,
            subject: "pump is leaking".to_string(),
            description: None,
            note: None,
            request_type: RequestType::Corrective,
            priority: "1".to_string(),
            equipment_id: EQUIPMENT_E,
            team_id: Some(TEAM_T),
            category_id: None,
            technician_id: None,
            requester_id: USER_U.id,
            created_by: USER_U.id,
            stage_id,
            state,
            date_request: Utc::now(),
            scheduled_date: None,
            date_start: None,
            date_end: None,
            duration: None,
            maintenance_cost: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    // ------------------------------------------------------------------
    // In-memory world: a fake store backing full lifecycle tests
    // ------------------------------------------------------------------

    struct InMemoryWorld {
        requests: Mutex<HashMap<i32, MaintenanceRequest>>,
        stages: Vec<MaintenanceStage>,
        teams: HashMap<i32, Vec<i32>>,
        equipment_active: Mutex<HashMap<i32, bool>>,
        scrap_reasons: Mutex<HashMap<i32, String>>,
        events: Mutex<Vec<StageChangeEvent>>,
    }

    impl InMemoryWorld {
        fn new(requests: Vec<MaintenanceRequest>, teams: HashMap<i32, Vec<i32>>) -> Self {
            Self {
                requests: Mutex::new(requests.into_iter().map(|r| (r.id, r)).collect()),
                stages: default_stages(),
                teams,
                equipment_active: Mutex::new(HashMap::from([(EQUIPMENT_E, true)])),
                scrap_reasons: Mutex::new(HashMap::new()),
                events: Mutex::new(Vec::new()),
            }
        }

        fn set_technician(&self, request_id: i32, technician_id: Option<i32>) {
            self.requests
                .lock()
                .unwrap()
                .get_mut(&request_id)
                .unwrap()
                .technician_id = technician_id;
        }

        fn engine(&self) -> TransitionEngine<'_> {
            TransitionEngine::new(self, self, self, self, self)
        }
    }

    #[async_trait]
    impl RequestStore for InMemoryWorld {
        async fn find_request(&self, id: i32) -> AppResult<Option<MaintenanceRequest>> {
            Ok(self.requests.lock().unwrap().get(&id).cloned())
        }

        async fn update_stage(
            &self,
            id: i32,
            stage_id: i32,
            state: RequestState,
            date_start: Option<DateTime<Utc>>,
        ) -> AppResult<MaintenanceRequest> {
            let mut requests = self.requests.lock().unwrap();
            let request = requests
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("Maintenance request {} not found", id)))?;
            request.stage_id = stage_id;
            request.state = state;
            if date_start.is_some() {
                request.date_start = date_start;
            }
            Ok(request.clone())
        }
    }

    #[async_trait]
    impl StageRegistry for InMemoryWorld {
        async fn find_stage(&self, id: i32) -> AppResult<Option<MaintenanceStage>> {
            Ok(self.stages.iter().find(|s| s.id == id).cloned())
        }

        async fn done_stage(&self) -> AppResult<Option<MaintenanceStage>> {
            Ok(self.stages.iter().find(|s| s.is_done).cloned())
        }

        async fn scrap_stage(&self) -> AppResult<Option<MaintenanceStage>> {
            Ok(self.stages.iter().find(|s| s.is_scrap).cloned())
        }
    }

    #[async_trait]
    impl TeamDirectory for InMemoryWorld {
        async fn member_ids(&self, team_id: i32) -> AppResult<Vec<i32>> {
            Ok(self.teams.get(&team_id).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl EquipmentStore for InMemoryWorld {
        async fn deactivate(&self, equipment_id: i32) -> AppResult<()> {
            self.equipment_active.lock().unwrap().insert(equipment_id, false);
            Ok(())
        }

        async fn mark_scrapped(&self, equipment_id: i32, reason: String) -> AppResult<()> {
            self.equipment_active.lock().unwrap().insert(equipment_id, false);
            self.scrap_reasons.lock().unwrap().insert(equipment_id, reason);
            Ok(())
        }
    }

    #[async_trait]
    impl ActivityLog for InMemoryWorld {
        async fn record(&self, event: StageChangeEvent) -> AppResult<()> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle scenarios against the in-memory world
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_full_lifecycle() {
        let world = InMemoryWorld::new(
            vec![request(100, 1, RequestState::New)],
            HashMap::from([(TEAM_T, vec![TECH_X.id])]),
        );
        let engine = world.engine();

        // Team technician starts the work
        let updated = engine.change_stage(TECH_X, 100, 2, None).await.unwrap();
        assert_eq!(updated.state, RequestState::InProgress);
        assert!(updated.date_start.is_some());

        // A technician outside the team may not complete
        let err = engine.change_stage(TECH_Y, 100, 3, None).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));

        // Once assigned, the technician completes
        world.set_technician(100, Some(TECH_X.id));
        let updated = engine.change_stage(TECH_X, 100, 3, None).await.unwrap();
        assert_eq!(updated.state, RequestState::Repaired);

        // Admin scraps; the equipment goes inactive
        let updated = engine.change_stage(ADMIN, 100, 4, None).await.unwrap();
        assert_eq!(updated.state, RequestState::Scrap);
        assert_eq!(world.equipment_active.lock().unwrap()[&EQUIPMENT_E], false);

        // One event per effective transition
        let events = world.events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].old_state, Some(RequestState::New));
        assert_eq!(events[0].new_state, RequestState::InProgress);
        assert_eq!(events[2].new_state, RequestState::Scrap);
    }

    #[tokio::test]
    async fn test_scrap_with_reason_stamps_equipment() {
        let world = InMemoryWorld::new(
            vec![request(100, 1, RequestState::New)],
            HashMap::new(),
        );
        let engine = world.engine();

        engine
            .change_stage(ADMIN, 100, 4, Some("beyond repair".to_string()))
            .await
            .unwrap();

        assert_eq!(world.equipment_active.lock().unwrap()[&EQUIPMENT_E], false);
        assert_eq!(
            world.scrap_reasons.lock().unwrap().get(&EQUIPMENT_E),
            Some(&"beyond repair".to_string())
        );
    }

    #[tokio::test]
    async fn test_user_reset_to_initial_allowed_for_owner() {
        let world = InMemoryWorld::new(
            vec![request(100, 2, RequestState::InProgress)],
            HashMap::new(),
        );
        let engine = world.engine();

        let updated = engine.change_stage(USER_U, 100, 1, None).await.unwrap();
        assert_eq!(updated.state, RequestState::New);

        // Anyone else with the user role is denied
        let stranger = Actor { id: 77, role: Role::User };
        let err = engine.change_stage(stranger, 100, 1, None).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    // ------------------------------------------------------------------
    // Failure isolation, with mocked collaborators
    // ------------------------------------------------------------------

    fn stage_registry_with(stages: Vec<MaintenanceStage>) -> MockStageRegistry {
        let mut registry = MockStageRegistry::new();
        registry
            .expect_find_stage()
            .returning(move |id| Ok(stages.iter().find(|s| s.id == id).cloned()));
        registry
    }

    #[tokio::test]
    async fn test_request_not_found() {
        let mut requests = MockRequestStore::new();
        requests.expect_find_request().with(eq(5)).returning(|_| Ok(None));
        let stages = stage_registry_with(default_stages());
        let teams = MockTeamDirectory::new();
        let equipment = MockEquipmentStore::new();
        let activity = MockActivityLog::new();

        let engine = TransitionEngine::new(&requests, &stages, &teams, &equipment, &activity);
        let err = engine.change_stage(ADMIN, 5, 2, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unknown_stage_is_not_found_not_forbidden() {
        let mut requests = MockRequestStore::new();
        requests
            .expect_find_request()
            .returning(|_| Ok(Some(request(100, 1, RequestState::New))));
        let stages = stage_registry_with(default_stages());
        let teams = MockTeamDirectory::new();
        let equipment = MockEquipmentStore::new();
        let activity = MockActivityLog::new();

        let engine = TransitionEngine::new(&requests, &stages, &teams, &equipment, &activity);
        // A user with no rights at all still gets NotFound for a bad stage id
        let err = engine.change_stage(USER_U, 100, 999, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_denied_transition_writes_nothing() {
        let mut requests = MockRequestStore::new();
        requests
            .expect_find_request()
            .returning(|_| Ok(Some(request(100, 1, RequestState::New))));
        requests.expect_update_stage().times(0);
        let stages = stage_registry_with(default_stages());
        let mut teams = MockTeamDirectory::new();
        teams.expect_member_ids().returning(|_| Ok(vec![]));
        let mut equipment = MockEquipmentStore::new();
        equipment.expect_deactivate().times(0);
        equipment.expect_mark_scrapped().times(0);
        let mut activity = MockActivityLog::new();
        activity.expect_record().times(0);

        let engine = TransitionEngine::new(&requests, &stages, &teams, &equipment, &activity);
        let err = engine.change_stage(TECH_Y, 100, 4, None).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_noop_transition_skips_side_effects() {
        let mut requests = MockRequestStore::new();
        requests
            .expect_find_request()
            .returning(|_| Ok(Some(request(100, 1, RequestState::New))));
        requests.expect_update_stage().times(0);
        let stages = stage_registry_with(default_stages());
        let mut teams = MockTeamDirectory::new();
        teams.expect_member_ids().returning(|_| Ok(vec![]));
        let mut equipment = MockEquipmentStore::new();
        equipment.expect_deactivate().times(0);
        equipment.expect_mark_scrapped().times(0);
        let mut activity = MockActivityLog::new();
        activity.expect_record().times(0);

        let engine = TransitionEngine::new(&requests, &stages, &teams, &equipment, &activity);
        let unchanged = engine.change_stage(ADMIN, 100, 1, None).await.unwrap();
        assert_eq!(unchanged.stage_id, 1);
        assert_eq!(unchanged.state, RequestState::New);
    }

    #[tokio::test]
    async fn test_equipment_failure_does_not_unwind_transition() {
        let mut requests = MockRequestStore::new();
        requests
            .expect_find_request()
            .returning(|_| Ok(Some(request(100, 1, RequestState::New))));
        requests
            .expect_update_stage()
            .with(eq(100), eq(4), eq(RequestState::Scrap), eq(None))
            .returning(|id, stage_id, state, _| Ok(request(id, stage_id, state)));
        let stages = stage_registry_with(default_stages());
        let mut teams = MockTeamDirectory::new();
        teams.expect_member_ids().returning(|_| Ok(vec![]));
        let mut equipment = MockEquipmentStore::new();
        equipment
            .expect_deactivate()
            .with(eq(EQUIPMENT_E))
            .returning(|_| Err(AppError::Internal("equipment store down".to_string())));
        let mut activity = MockActivityLog::new();
        activity.expect_record().returning(|_| Ok(()));

        let engine = TransitionEngine::new(&requests, &stages, &teams, &equipment, &activity);
        let updated = engine.change_stage(ADMIN, 100, 4, None).await.unwrap();
        assert_eq!(updated.state, RequestState::Scrap);
    }

    #[tokio::test]
    async fn test_activity_failure_is_swallowed() {
        let mut requests = MockRequestStore::new();
        requests
            .expect_find_request()
            .returning(|_| Ok(Some(request(100, 1, RequestState::New))));
        requests
            .expect_update_stage()
            .returning(|id, stage_id, state, _| Ok(request(id, stage_id, state)));
        let stages = stage_registry_with(default_stages());
        let mut teams = MockTeamDirectory::new();
        teams.expect_member_ids().returning(|_| Ok(vec![]));
        let equipment = MockEquipmentStore::new();
        let mut activity = MockActivityLog::new();
        activity
            .expect_record()
            .returning(|_| Err(AppError::Internal("log sink down".to_string())));

        let engine = TransitionEngine::new(&requests, &stages, &teams, &equipment, &activity);
        let updated = engine.change_stage(ADMIN, 100, 2, None).await.unwrap();
        assert_eq!(updated.state, RequestState::InProgress);
    }

    #[tokio::test]
    async fn test_resolve_done_and_scrap_stages() {
        let mut registry = MockStageRegistry::new();
        registry
            .expect_done_stage()
            .returning(|| Ok(Some(stage(3, "Repaired", 30, true, false))));
        registry
            .expect_scrap_stage()
            .returning(|| Ok(Some(stage(4, "Scrap", 40, false, true))));
        let requests = MockRequestStore::new();
        let teams = MockTeamDirectory::new();
        let equipment = MockEquipmentStore::new();
        let activity = MockActivityLog::new();

        let engine = TransitionEngine::new(&requests, &registry, &teams, &equipment, &activity);
        assert!(engine.resolve_done_stage().await.unwrap().is_done);
        assert!(engine.resolve_scrap_stage().await.unwrap().is_scrap);
    }
}
