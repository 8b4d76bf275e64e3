//! Local Library
//!
//! Server-rendered catalog of books, authors, genres and physical book
//! copies, backed by an in-memory store or PostgreSQL.

use std::sync::Arc;

pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::Repository;
use views::{HtmlRenderer, ViewRenderer};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub renderer: Arc<dyn ViewRenderer>,
}

impl AppState {
    /// State over `repository` with the default HTML renderer
    pub fn new(config: AppConfig, repository: Repository) -> Self {
        Self::with_renderer(config, repository, Arc::new(HtmlRenderer))
    }

    pub fn with_renderer(
        config: AppConfig,
        repository: Repository,
        renderer: Arc<dyn ViewRenderer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services::Services::new(repository)),
            renderer,
        }
    }
}
