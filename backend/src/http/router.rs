//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS for the dashboard frontend.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route(
            "/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route(
            "/sessions/{session_id}",
            get(handlers::get_session).delete(handlers::close_session),
        )
        .route(
            "/sessions/{session_id}/dataset",
            put(handlers::replace_dataset),
        )
        .route("/sessions/{session_id}/options", get(handlers::get_options))
        .route(
            "/sessions/{session_id}/dashboard",
            post(handlers::get_dashboard),
        )
        .route(
            "/sessions/{session_id}/occurrences",
            post(handlers::get_occurrences),
        )
        .route(
            "/sessions/{session_id}/distribution",
            post(handlers::get_distribution),
        );

    let body_limit = state.body_limit;
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
