//! Data Transfer Objects for the HTTP API.
//!
//! Analysis DTOs are re-exported from the routes module since they already
//! derive Serialize/Deserialize.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    // Dashboard
    AxisHints, ChartKind, DashboardChart, DashboardQuery, DashboardReport, MetricTile,
    OccurrenceTable, RangeKind, TileKind,
    // Distribution
    DistributionReport, DistributionRequest, DistributionRow, ProbabilityProbe,
    // Landing
    SessionInfo, UploadRequest,
    // Options
    FilterOptions, NumericBounds, OptionsParams, TimeBounds,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Session store status
    pub store: String,
    pub sessions: usize,
}

/// Session list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionInfo>,
    /// Total count
    pub total: usize,
}
