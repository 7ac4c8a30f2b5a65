//! Public API surface for the backend.
//!
//! This file consolidates the DTO types for the HTTP API.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::routes::dashboard::AxisHints;
pub use crate::routes::dashboard::BoundsQuery;
pub use crate::routes::dashboard::ChartKind;
pub use crate::routes::dashboard::DashboardChart;
pub use crate::routes::dashboard::DashboardQuery;
pub use crate::routes::dashboard::DashboardReport;
pub use crate::routes::dashboard::MetricTile;
pub use crate::routes::dashboard::OccurrenceTable;
pub use crate::routes::dashboard::RangeKind;
pub use crate::routes::dashboard::TileKind;
pub use crate::routes::distribution::ColumnMedian;
pub use crate::routes::distribution::Comparison;
pub use crate::routes::distribution::DistributionReport;
pub use crate::routes::distribution::DistributionRequest;
pub use crate::routes::distribution::DistributionRow;
pub use crate::routes::distribution::DistributionStats;
pub use crate::routes::distribution::ProbabilityProbe;
pub use crate::routes::distribution::ThresholdProbability;
pub use crate::routes::landing::SessionInfo;
pub use crate::routes::landing::UploadRequest;
pub use crate::routes::options::FilterOptions;
pub use crate::routes::options::NumericBounds;
pub use crate::routes::options::OptionsParams;
pub use crate::routes::options::TimeBounds;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Session identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Fresh random identifier.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SessionId)
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
