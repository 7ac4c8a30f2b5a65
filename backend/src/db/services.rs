//! High-level session store service layer.
//!
//! Repository-agnostic operations: ingestion of uploaded records, checksum
//! computation and session lifecycle. Use these rather than calling the
//! repository directly.
//!
//! # Usage
//!
//! ```no_run
//! use m7box_stats::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let sessions = services::list_sessions(&repo).await?;
//!     println!("Found {} sessions", sessions.len());
//!     Ok(())
//! }
//! ```

use log::info;
use std::sync::Arc;

use super::checksum::records_checksum;
use super::repository::{ErrorContext, RepositoryError, RepositoryResult, SessionRepository};
use crate::api::{SessionId, SessionInfo, UploadRequest};
use crate::models::{dataset_from_records, Dataset, IngestOptions};

/// Name given to sessions uploaded without one.
pub const DEFAULT_SESSION_NAME: &str = "Untitled session";

// ==================== Health & Connection ====================

/// Check if the store is usable.
pub async fn health_check<R: SessionRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Session Operations ====================

fn ingest(
    request: &UploadRequest,
    options: &IngestOptions,
    operation: &str,
) -> RepositoryResult<(String, Dataset)> {
    let checksum = records_checksum(&request.records).map_err(|e| {
        RepositoryError::internal_with_context(
            format!("Failed to serialize records: {}", e),
            ErrorContext::new(operation),
        )
    })?;
    let dataset = dataset_from_records(&request.records, options)
        .map_err(|e| RepositoryError::from(e).with_operation(operation))?;
    Ok((checksum, dataset))
}

/// Ingest uploaded records and open a new session owning them.
pub async fn upload_dataset<R: SessionRepository + ?Sized>(
    repo: &R,
    request: &UploadRequest,
    options: &IngestOptions,
) -> RepositoryResult<SessionInfo> {
    let (checksum, dataset) = ingest(request, options, "upload_dataset")?;
    let name = request
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(DEFAULT_SESSION_NAME);
    let info = repo.create_session(name, &checksum, dataset).await?;
    info!(
        "Opened session {} ('{}') with {} rows x {} columns",
        info.session_id,
        info.name,
        info.rows,
        info.columns.len()
    );
    Ok(info)
}

/// Replace a session's dataset with newly uploaded records.
pub async fn replace_dataset<R: SessionRepository + ?Sized>(
    repo: &R,
    session_id: SessionId,
    request: &UploadRequest,
    options: &IngestOptions,
) -> RepositoryResult<SessionInfo> {
    let (checksum, dataset) = ingest(request, options, "replace_dataset")?;
    let info = repo.replace_dataset(session_id, &checksum, dataset).await?;
    info!("Replaced dataset of session {} ({} rows)", session_id, info.rows);
    Ok(info)
}

/// Current dataset snapshot of a session.
pub async fn session_dataset<R: SessionRepository + ?Sized>(
    repo: &R,
    session_id: SessionId,
) -> RepositoryResult<Arc<Dataset>> {
    repo.get_dataset(session_id).await
}

/// Session metadata.
pub async fn get_session<R: SessionRepository + ?Sized>(
    repo: &R,
    session_id: SessionId,
) -> RepositoryResult<SessionInfo> {
    repo.get_session(session_id).await
}

/// All open sessions.
pub async fn list_sessions<R: SessionRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Vec<SessionInfo>> {
    repo.list_sessions().await
}

/// Close a session, dropping its dataset.
pub async fn close_session<R: SessionRepository + ?Sized>(
    repo: &R,
    session_id: SessionId,
) -> RepositoryResult<()> {
    repo.delete_session(session_id).await?;
    info!("Closed session {}", session_id);
    Ok(())
}
