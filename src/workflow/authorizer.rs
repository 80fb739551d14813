//! Role/ownership authorization for stage transitions.
//!
//! A pure decision function: given the acting principal, a snapshot of the
//! request's ownership facts and the classification of the proposed target
//! stage, produce an allow/deny verdict. The caller is responsible for
//! rejecting nonexistent stages before asking for a verdict; a missing stage
//! is a not-found condition, not an authorization failure.

use crate::error::AppError;
use crate::models::user::{Actor, Role};

use super::StageClass;

/// Ownership facts about a request, as needed for an authorization decision
#[derive(Debug, Clone)]
pub struct RequestSnapshot<'a> {
    /// Assigned technician, if any
    pub technician_id: Option<i32>,
    /// Member ids of the request's maintenance team (empty when no team)
    pub team_members: &'a [i32],
    /// The user on whose behalf the request was opened
    pub requester_id: i32,
    /// The user who created the record
    pub created_by: i32,
}

/// Authorization verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied(&'static str),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }

    /// Convert a denial into the error surfaced to the caller
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Verdict::Allowed => Ok(()),
            Verdict::Denied(reason) => Err(AppError::Authorization(reason.to_string())),
        }
    }
}

/// Decide whether `actor` may move a request into a stage of class `target`.
///
/// Total over the (role, stage class) product:
///
/// * admins and managers may perform any transition;
/// * regular users may only reset their own requests to the initial stage;
/// * technicians may start work they are assigned to or that belongs to
///   their team, may complete only work assigned to them, may never scrap,
///   and are unrestricted elsewhere.
pub fn authorize_stage_change(
    actor: Actor,
    request: &RequestSnapshot<'_>,
    target: StageClass,
) -> Verdict {
    match actor.role {
        Role::Admin | Role::Manager => Verdict::Allowed,

        Role::User => {
            let owns = actor.id == request.created_by || actor.id == request.requester_id;
            if target == StageClass::Initial && owns {
                Verdict::Allowed
            } else {
                Verdict::Denied("users cannot change request stage")
            }
        }

        Role::Technician => match target {
            StageClass::InProgress => {
                let assigned = request.technician_id == Some(actor.id);
                if assigned || request.team_members.contains(&actor.id) {
                    Verdict::Allowed
                } else {
                    Verdict::Denied("must be assigned technician or team member")
                }
            }
            StageClass::Done => {
                if request.technician_id == Some(actor.id) {
                    Verdict::Allowed
                } else {
                    Verdict::Denied("only assigned technician may complete")
                }
            }
            StageClass::Scrap => Verdict::Denied("technicians cannot scrap"),
            StageClass::Initial | StageClass::Other => Verdict::Allowed,
        },
    }
}
