//! Business logic services

pub mod auth;
pub mod equipment;
pub mod requests;
pub mod stages;
pub mod teams;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub requests: requests::RequestsService,
    pub stages: stages::StagesService,
    pub teams: teams::TeamsService,
    pub equipment: equipment::EquipmentService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            requests: requests::RequestsService::new(repository.clone()),
            stages: stages::StagesService::new(repository.clone()),
            teams: teams::TeamsService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(repository),
        }
    }
}
