//! In-memory local repository implementation.
//!
//! Sessions live in a `HashMap` behind a `parking_lot::RwLock`. The lock is
//! only held for map access; datasets are shared as `Arc<Dataset>` so analysis
//! runs without it.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{SessionId, SessionInfo};
use crate::db::repository::*;
use crate::models::Dataset;

struct SessionEntry {
    info: SessionInfo,
    dataset: Arc<Dataset>,
}

struct LocalData {
    sessions: HashMap<SessionId, SessionEntry>,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
            is_healthy: true,
        }
    }
}

/// In-memory local repository.
///
/// Cloning shares the underlying store.
///
/// # Example
/// ```
/// use m7box_stats::db::repositories::LocalRepository;
/// use m7box_stats::db::repository::SessionRepository;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let repo = LocalRepository::new();
///     assert!(repo.list_sessions().await.unwrap().is_empty());
/// });
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

fn session_not_found(operation: &str, session_id: SessionId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Session {} does not exist", session_id),
        ErrorContext::new(operation)
            .with_entity("session")
            .with_entity_id(session_id),
    )
}

fn info_for(
    session_id: SessionId,
    name: &str,
    checksum: &str,
    dataset: &Dataset,
) -> SessionInfo {
    let now = Utc::now();
    SessionInfo {
        session_id,
        name: name.to_string(),
        rows: dataset.height(),
        columns: dataset.column_names().into_iter().map(str::to_string).collect(),
        checksum: checksum.to_string(),
        created_at: now,
        updated_at: now,
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the health status for testing store failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Drop every session.
    pub fn clear(&self) {
        self.data.write().sessions.clear();
    }

    /// Get the number of sessions stored.
    pub fn session_count(&self) -> usize {
        self.data.read().sessions.len()
    }

    fn ensure_healthy(&self, operation: &str) -> RepositoryResult<()> {
        if self.data.read().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::internal_with_context(
                "Session store is unavailable",
                ErrorContext::new(operation),
            ))
        }
    }
}

#[async_trait]
impl SessionRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn create_session(
        &self,
        name: &str,
        checksum: &str,
        dataset: Dataset,
    ) -> RepositoryResult<SessionInfo> {
        self.ensure_healthy("create_session")?;
        let session_id = SessionId::new();
        let info = info_for(session_id, name, checksum, &dataset);
        self.data.write().sessions.insert(
            session_id,
            SessionEntry {
                info: info.clone(),
                dataset: Arc::new(dataset),
            },
        );
        Ok(info)
    }

    async fn get_session(&self, session_id: SessionId) -> RepositoryResult<SessionInfo> {
        self.ensure_healthy("get_session")?;
        self.data
            .read()
            .sessions
            .get(&session_id)
            .map(|entry| entry.info.clone())
            .ok_or_else(|| session_not_found("get_session", session_id))
    }

    async fn get_dataset(&self, session_id: SessionId) -> RepositoryResult<Arc<Dataset>> {
        self.ensure_healthy("get_dataset")?;
        self.data
            .read()
            .sessions
            .get(&session_id)
            .map(|entry| Arc::clone(&entry.dataset))
            .ok_or_else(|| session_not_found("get_dataset", session_id))
    }

    async fn replace_dataset(
        &self,
        session_id: SessionId,
        checksum: &str,
        dataset: Dataset,
    ) -> RepositoryResult<SessionInfo> {
        self.ensure_healthy("replace_dataset")?;
        let mut data = self.data.write();
        let entry = data
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| session_not_found("replace_dataset", session_id))?;

        let mut info = info_for(session_id, &entry.info.name, checksum, &dataset);
        info.created_at = entry.info.created_at;
        entry.info = info.clone();
        entry.dataset = Arc::new(dataset);
        Ok(info)
    }

    async fn delete_session(&self, session_id: SessionId) -> RepositoryResult<()> {
        self.ensure_healthy("delete_session")?;
        self.data
            .write()
            .sessions
            .remove(&session_id)
            .map(|_| ())
            .ok_or_else(|| session_not_found("delete_session", session_id))
    }

    async fn list_sessions(&self) -> RepositoryResult<Vec<SessionInfo>> {
        self.ensure_healthy("list_sessions")?;
        let mut sessions: Vec<SessionInfo> = self
            .data
            .read()
            .sessions
            .values()
            .map(|entry| entry.info.clone())
            .collect();
        sessions.sort_by_key(|info| info.created_at);
        Ok(sessions)
    }
}
