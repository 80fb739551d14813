//! Per-actor visibility scope for request listings.
//!
//! Visibility governs reads the way the authorizer governs writes; the two
//! share the role/ownership model but are evaluated independently. An actor
//! may see a request it cannot move.

use crate::models::request::MaintenanceRequest;
use crate::models::user::{Actor, Role};

/// The read-scoping predicate for one actor.
///
/// Built once per operation from the actor's role and resolved memberships;
/// the repository renders it into SQL, and [`allows`](Self::allows) evaluates
/// the same predicate in memory. Explicit filters and free-text search are
/// always ANDed with this scope, never substituted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Admins and managers: no restriction
    All,
    /// Technicians: assigned requests, plus requests of their teams
    Technician { actor_id: i32, team_ids: Vec<i32> },
    /// Regular users: own requests, plus requests on equipment assigned to them
    User { actor_id: i32, equipment_ids: Vec<i32> },
}

impl VisibilityScope {
    /// Build the scope for an actor.
    ///
    /// `team_ids` are the teams the actor belongs to; `equipment_ids` the
    /// equipment assigned to the actor. Each is only consulted for the role
    /// that needs it.
    pub fn for_actor(actor: Actor, team_ids: Vec<i32>, equipment_ids: Vec<i32>) -> Self {
        match actor.role {
            Role::Admin | Role::Manager => VisibilityScope::All,
            Role::Technician => VisibilityScope::Technician {
                actor_id: actor.id,
                team_ids,
            },
            Role::User => VisibilityScope::User {
                actor_id: actor.id,
                equipment_ids,
            },
        }
    }

    /// Evaluate the scope against a single request
    pub fn allows(&self, request: &MaintenanceRequest) -> bool {
        match self {
            VisibilityScope::All => true,
            VisibilityScope::Technician { actor_id, team_ids } => {
                request.technician_id == Some(*actor_id)
                    || request.team_id.is_some_and(|t| team_ids.contains(&t))
            }
            VisibilityScope::User {
                actor_id,
                equipment_ids,
            } => {
                request.requester_id == *actor_id
                    || request.created_by == *actor_id
                    || equipment_ids.contains(&request.equipment_id)
            }
        }
    }
}
