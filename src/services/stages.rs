//! Stage configuration service

use crate::{
    error::AppResult,
    models::stage::{CreateStage, MaintenanceStage},
    repository::Repository,
};

#[derive(Clone)]
pub struct StagesService {
    repository: Repository,
}

impl StagesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List stages in workflow order
    pub async fn list(&self) -> AppResult<Vec<MaintenanceStage>> {
        self.repository.stages.list().await
    }

    /// Create a stage
    pub async fn create(&self, data: &CreateStage) -> AppResult<MaintenanceStage> {
        self.repository.stages.create(data).await
    }
}
