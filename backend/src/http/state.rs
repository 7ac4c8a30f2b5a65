//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::repository::SessionRepository;
use crate::models::IngestOptions;
use crate::services::DashboardSettings;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session store
    pub repository: Arc<dyn SessionRepository>,
    pub ingest: Arc<IngestOptions>,
    pub settings: Arc<DashboardSettings>,
    /// Upload body limit in bytes
    pub body_limit: usize,
}

impl AppState {
    /// Create a new application state with the given repository and configuration.
    pub fn new(repository: Arc<dyn SessionRepository>, config: &AppConfig) -> Self {
        Self {
            repository,
            ingest: Arc::new(config.ingest_options()),
            settings: Arc::new(config.dashboard_settings()),
            body_limit: config.body_limit_bytes(),
        }
    }
}
