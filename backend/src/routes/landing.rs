use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::SessionId;

/// Session information with dataset shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub name: String,
    pub rows: usize,
    pub columns: Vec<String>,
    /// SHA-256 of the uploaded records.
    pub checksum: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upload body: already-parsed CSV rows as JSON objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub records: Vec<Value>,
}

pub const LIST_SESSIONS: &str = "/v1/sessions";
pub const SESSION: &str = "/v1/sessions/{session_id}";
pub const SESSION_DATASET: &str = "/v1/sessions/{session_id}/dataset";
