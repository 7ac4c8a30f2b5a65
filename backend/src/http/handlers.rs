//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer. Analysis runs on the session's current snapshot; an upload
//! landing mid-request does not affect it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::dto::{
    DashboardQuery, DashboardReport, DistributionReport, DistributionRequest, FilterOptions,
    HealthResponse, OccurrenceTable, OptionsParams, SessionInfo, SessionListResponse,
    UploadRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::SessionId;
use crate::db::services as db_services;
use crate::models::Dataset;
use crate::services::{
    self, apply_bin_specs, apply_filters, build_dashboard, dashboard_options, AnalysisResult,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

async fn snapshot(state: &AppState, session_id: SessionId) -> Result<Arc<Dataset>, AppError> {
    Ok(db_services::session_dataset(state.repository.as_ref(), session_id).await?)
}

/// Runs `analysis` over the snapshot on the blocking thread pool.
async fn analyze<T, F>(dataset: Arc<Dataset>, analysis: F) -> HandlerResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Dataset) -> AnalysisResult<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || analysis(&dataset))
        .await
        .map_err(|e| AppError::Internal(format!("analysis task failed: {}", e)))?;
    Ok(Json(result?))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let store = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };
    let sessions = db_services::list_sessions(state.repository.as_ref())
        .await
        .map(|s| s.len())
        .unwrap_or(0);

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        store,
        sessions,
    }))
}

// =============================================================================
// Sessions
// =============================================================================

/// GET /v1/sessions
pub async fn list_sessions(State(state): State<AppState>) -> HandlerResult<SessionListResponse> {
    let sessions = db_services::list_sessions(state.repository.as_ref()).await?;
    let total = sessions.len();
    Ok(Json(SessionListResponse { sessions, total }))
}

/// POST /v1/sessions
///
/// Ingest uploaded records into a new session.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Result<(StatusCode, Json<SessionInfo>), AppError> {
    let info =
        db_services::upload_dataset(state.repository.as_ref(), &request, &state.ingest).await?;
    tracing::info!(session_id = %info.session_id, rows = info.rows, "session created");
    Ok((StatusCode::CREATED, Json(info)))
}

/// GET /v1/sessions/{session_id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> HandlerResult<SessionInfo> {
    Ok(Json(
        db_services::get_session(state.repository.as_ref(), session_id).await?,
    ))
}

/// PUT /v1/sessions/{session_id}/dataset
///
/// Replace the session's dataset with a new upload.
pub async fn replace_dataset(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(request): Json<UploadRequest>,
) -> HandlerResult<SessionInfo> {
    let info = db_services::replace_dataset(
        state.repository.as_ref(),
        session_id,
        &request,
        &state.ingest,
    )
    .await?;
    Ok(Json(info))
}

/// DELETE /v1/sessions/{session_id}
pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<StatusCode, AppError> {
    db_services::close_session(state.repository.as_ref(), session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Analysis Endpoints
// =============================================================================

/// GET /v1/sessions/{session_id}/options?range=ODR
///
/// Choices and default bounds for the dashboard filters.
pub async fn get_options(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Query(params): Query<OptionsParams>,
) -> HandlerResult<FilterOptions> {
    let dataset = snapshot(&state, session_id).await?;
    analyze(dataset, move |ds| dashboard_options(ds, params.range)).await
}

/// POST /v1/sessions/{session_id}/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(query): Json<DashboardQuery>,
) -> HandlerResult<DashboardReport> {
    let dataset = snapshot(&state, session_id).await?;
    let settings = Arc::clone(&state.settings);
    analyze(dataset, move |ds| build_dashboard(ds, &query, &settings)).await
}

/// POST /v1/sessions/{session_id}/occurrences
///
/// Rows matching the dashboard filters, projected onto the occurrence columns.
pub async fn get_occurrences(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(query): Json<DashboardQuery>,
) -> HandlerResult<OccurrenceTable> {
    let dataset = snapshot(&state, session_id).await?;
    analyze(dataset, move |ds| services::query_occurrences(ds, &query)).await
}

/// POST /v1/sessions/{session_id}/distribution
///
/// Generic bin → filter → aggregate pass.
pub async fn get_distribution(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(request): Json<DistributionRequest>,
) -> HandlerResult<DistributionReport> {
    let dataset = snapshot(&state, session_id).await?;
    analyze(dataset, move |ds| {
        let binned = apply_bin_specs(ds, &request.bin_specs)?;
        let filtered = apply_filters(&binned.dataset, &request.predicates)?;
        services::report(
            &filtered,
            &request.category_column,
            binned.bin_order(&request.category_column),
            &request.probes,
            &request.median_columns,
        )
    })
    .await
}
