//! GMAO Equipment Maintenance Management System
//!
//! A Rust implementation of the GMAO maintenance server, providing a REST
//! JSON API for tracking equipment maintenance requests through their
//! workflow, with role-based stage transitions and per-actor visibility.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod workflow;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
