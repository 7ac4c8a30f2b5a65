//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::error::AnalysisError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Internal server error
    Internal(String),
    /// Dataset does not support the requested analysis
    Analysis(AnalysisError),
    /// Session store error
    Repository(RepositoryError),
}

fn analysis_code(err: &AnalysisError) -> &'static str {
    match err {
        AnalysisError::UnknownColumn { .. } => "UNKNOWN_COLUMN",
        AnalysisError::TypeMismatch { .. } => "TYPE_MISMATCH",
        AnalysisError::InvalidBinSpec { .. } => "INVALID_BIN_SPEC",
        AnalysisError::InvalidRange { .. } => "INVALID_RANGE",
        AnalysisError::ShapeMismatch { .. } | AnalysisError::DuplicateColumn(_) => {
            "INVALID_DATASET"
        }
        AnalysisError::Ingest(_) => "INVALID_RECORDS",
    }
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ApiError) {
        match self {
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Analysis(e) => {
                let mut error = ApiError::new(analysis_code(&e), e.to_string());
                if let Some(column) = e.column() {
                    error = error.with_details(format!("column={}", column));
                }
                (StatusCode::BAD_REQUEST, error)
            }
            AppError::Repository(e) => {
                let details = e.context().to_string();
                let (status, code) = match &e {
                    RepositoryError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    RepositoryError::ValidationError { .. } => {
                        (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
                    }
                    RepositoryError::InternalError { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
                    }
                };
                (status, ApiError::new(code, e.to_string()).with_details(details))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!(code = %error.code, "{}", error.message);
        }
        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::Analysis(err)
    }
}
