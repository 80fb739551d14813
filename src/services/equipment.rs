//! Equipment management service

use crate::{
    error::AppResult,
    models::equipment::{
        CreateCategory, CreateEquipment, Equipment, EquipmentCategory, UpdateEquipment,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all equipment
    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list().await
    }

    /// Get equipment by ID
    pub async fn get(&self, id: i32) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await
    }

    /// Create equipment
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        self.repository.equipment.create(data).await
    }

    /// Update equipment
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        self.repository.equipment.update(id, data).await
    }

    /// Delete equipment
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.equipment.delete(id).await
    }

    /// List categories
    pub async fn list_categories(&self) -> AppResult<Vec<EquipmentCategory>> {
        self.repository.equipment.list_categories().await
    }

    /// Create a category
    pub async fn create_category(&self, data: &CreateCategory) -> AppResult<EquipmentCategory> {
        self.repository.equipment.create_category(data).await
    }
}
