//! Maintenance workflow core.
//!
//! The rules that decide who may move a request into which stage, the coarse
//! state derived from each stage, and the visibility scope applied to
//! listings. Everything in this module except the transition engine is a pure
//! function of its inputs; the engine reaches its collaborators through the
//! traits defined in [`engine`].

pub mod authorizer;
pub mod engine;
pub mod visibility;

use crate::models::{enums::RequestState, stage::MaintenanceStage};

/// Structural classification of a stage, computed once from its flags and
/// normalized name. Authorization and state derivation dispatch on this,
/// never on raw display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageClass {
    /// The entry stage ("New")
    Initial,
    /// Work underway ("In Progress")
    InProgress,
    /// Terminal success (`is_done`)
    Done,
    /// Terminal disposal (`is_scrap`)
    Scrap,
    /// Any custom intermediate stage
    Other,
}

impl StageClass {
    /// Classify a stage. Flag checks take precedence over names; names are
    /// normalized (case, underscores, surrounding whitespace) exactly once
    /// here.
    pub fn of(stage: &MaintenanceStage) -> Self {
        let name = normalize_name(&stage.name);
        if name == "new" {
            StageClass::Initial
        } else if stage.is_scrap || name == "scrap" {
            StageClass::Scrap
        } else if stage.is_done {
            StageClass::Done
        } else if name == "in progress" {
            StageClass::InProgress
        } else {
            StageClass::Other
        }
    }
}

/// Total mapping from stage classification to coarse state.
///
/// Every stage maps to exactly one state; custom intermediate stages count
/// as work in progress.
pub fn derive_state(class: StageClass) -> RequestState {
    match class {
        StageClass::Initial => RequestState::New,
        StageClass::Scrap => RequestState::Scrap,
        StageClass::Done => RequestState::Repaired,
        StageClass::InProgress | StageClass::Other => RequestState::InProgress,
    }
}

/// Lowercase, fold underscores to spaces and collapse runs of whitespace
fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(name: &str, sequence: i32, is_done: bool, is_scrap: bool) -> MaintenanceStage {
        MaintenanceStage {
            id: sequence,
            name: name.to_string(),
            sequence,
            fold: false,
            is_done,
            is_scrap,
        }
    }

    #[test]
    fn test_classify_default_stages() {
        assert_eq!(StageClass::of(&stage("New", 10, false, false)), StageClass::Initial);
        assert_eq!(StageClass::of(&stage("In Progress", 20, false, false)), StageClass::InProgress);
        assert_eq!(StageClass::of(&stage("Repaired", 30, true, false)), StageClass::Done);
        assert_eq!(StageClass::of(&stage("Scrap", 40, false, true)), StageClass::Scrap);
    }

    #[test]
    fn test_classify_normalizes_names() {
        assert_eq!(StageClass::of(&stage("NEW", 10, false, false)), StageClass::Initial);
        assert_eq!(StageClass::of(&stage("in_progress", 20, false, false)), StageClass::InProgress);
        assert_eq!(StageClass::of(&stage("  In   Progress ", 20, false, false)), StageClass::InProgress);
        assert_eq!(StageClass::of(&stage("SCRAP", 40, false, false)), StageClass::Scrap);
    }

    #[test]
    fn test_classify_flags_beat_names() {
        // A renamed done stage still classifies as Done
        assert_eq!(StageClass::of(&stage("Fixed", 30, true, false)), StageClass::Done);
        // is_scrap wins over is_done
        assert_eq!(StageClass::of(&stage("Disposed", 40, true, true)), StageClass::Scrap);
    }

    #[test]
    fn test_classify_custom_stage_is_other() {
        assert_eq!(StageClass::of(&stage("Waiting for parts", 25, false, false)), StageClass::Other);
    }

    #[test]
    fn test_derive_state_total() {
        // Every class maps to exactly one of the four states
        assert_eq!(derive_state(StageClass::Initial), RequestState::New);
        assert_eq!(derive_state(StageClass::InProgress), RequestState::InProgress);
        assert_eq!(derive_state(StageClass::Other), RequestState::InProgress);
        assert_eq!(derive_state(StageClass::Done), RequestState::Repaired);
        assert_eq!(derive_state(StageClass::Scrap), RequestState::Scrap);
    }

    #[test]
    fn test_derive_state_idempotent() {
        for class in [
            StageClass::Initial,
            StageClass::InProgress,
            StageClass::Done,
            StageClass::Scrap,
            StageClass::Other,
        ] {
            assert_eq!(derive_state(class), derive_state(class));
        }
    }
}
