//! Artax Library Catalog Management System
//!
//! A Rust REST API server for managing a small organization's library
//! catalog: books with their reference entities, staff-registered users,
//! catalog queries and an auditable change trail.

use std::sync::Arc;

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
