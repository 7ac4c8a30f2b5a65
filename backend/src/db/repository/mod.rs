//! Repository trait for the per-session dataset store.
//!
//! - [`error`]: Error types for repository operations
//!
//! Each session owns one dataset snapshot. Snapshots are handed out as
//! `Arc<Dataset>` and replaced wholesale on re-upload, so a request that is
//! already analysing a snapshot is never affected by a concurrent upload.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;
use std::sync::Arc;

use crate::api::{SessionId, SessionInfo};
use crate::models::Dataset;

/// Repository trait for session storage.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the store is usable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Session Operations ====================

    /// Create a session owning `dataset`.
    async fn create_session(
        &self,
        name: &str,
        checksum: &str,
        dataset: Dataset,
    ) -> RepositoryResult<SessionInfo>;

    /// Session metadata.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the session doesn't exist
    async fn get_session(&self, session_id: SessionId) -> RepositoryResult<SessionInfo>;

    /// Current dataset snapshot of a session.
    async fn get_dataset(&self, session_id: SessionId) -> RepositoryResult<Arc<Dataset>>;

    /// Swap the session's dataset for a new snapshot.
    async fn replace_dataset(
        &self,
        session_id: SessionId,
        checksum: &str,
        dataset: Dataset,
    ) -> RepositoryResult<SessionInfo>;

    /// Drop a session and its dataset.
    async fn delete_session(&self, session_id: SessionId) -> RepositoryResult<()>;

    /// All sessions, oldest first.
    async fn list_sessions(&self) -> RepositoryResult<Vec<SessionInfo>>;
}
