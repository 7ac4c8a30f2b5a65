use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::DistributionReport;
use crate::services::filtering::Selection;

// =========================================================
// Dashboard types + routes
// =========================================================

/// Which range family the dashboard looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeKind {
    #[default]
    #[serde(rename = "ODR", alias = "odr")]
    Odr,
    #[serde(rename = "RDR", alias = "rdr")]
    Rdr,
}

impl RangeKind {
    pub const ALL: [RangeKind; 2] = [RangeKind::Odr, RangeKind::Rdr];

    /// Column-name prefix of the range family.
    pub fn prefix(&self) -> &'static str {
        match self {
            RangeKind::Odr => "ODR",
            RangeKind::Rdr => "RDR",
        }
    }
}

impl fmt::Display for RangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Optional bounds of a right-exclusive range filter.
///
/// A missing bound falls back to the observed minimum (low) or maximum (high).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsQuery<T> {
    #[serde(default)]
    pub low: Option<T>,
    #[serde(default)]
    pub high: Option<T>,
}

impl<T> Default for BoundsQuery<T> {
    fn default() -> Self {
        Self {
            low: None,
            high: None,
        }
    }
}

/// Filter state of the range-box dashboard.
///
/// Every selection defaults to the wildcard. Every range defaults to the
/// observed `[min, max)` of its column, which drops rows missing the value
/// and rows at the maximum. A range set to `None` (`null` in JSON) is not
/// applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardQuery {
    pub range: RangeKind,
    pub instrument: Selection,
    pub day_of_week: Selection,
    pub m7box_direction: Selection,
    pub m7box_confirmation_direction: Selection,
    pub dr_confirmation_direction: Selection,
    pub confirmation_valid: Selection,
    pub m7box_confirmation_valid: Selection,
    pub models: Selection,
    pub adr_mid_broken: Selection,
    pub odr_mid_broken: Selection,
    pub box_size: Option<BoundsQuery<f64>>,
    pub m7box_time: Option<BoundsQuery<NaiveTime>>,
    pub dr_time: Option<BoundsQuery<NaiveTime>>,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            range: RangeKind::default(),
            instrument: Selection::default(),
            day_of_week: Selection::default(),
            m7box_direction: Selection::default(),
            m7box_confirmation_direction: Selection::default(),
            dr_confirmation_direction: Selection::default(),
            confirmation_valid: Selection::default(),
            m7box_confirmation_valid: Selection::default(),
            models: Selection::default(),
            adr_mid_broken: Selection::default(),
            odr_mid_broken: Selection::default(),
            box_size: Some(BoundsQuery::default()),
            m7box_time: Some(BoundsQuery::default()),
            dr_time: Some(BoundsQuery::default()),
        }
    }
}

impl DashboardQuery {
    /// Default query with no range filter applied.
    pub fn without_ranges() -> Self {
        Self {
            box_size: None,
            m7box_time: None,
            dr_time: None,
            ..Self::default()
        }
    }
}

/// What a metric tile shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Probability,
    Median,
}

/// One headline number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTile {
    pub kind: TileKind,
    pub label: String,
    pub column: String,
    /// Probability in `[0, 1]` or median; NaN (null) when undefined.
    pub value: f64,
    /// Rendered value, e.g. `"40.00%"`, `"-0.75"` or `"n/a"`.
    pub display: String,
}

/// Initial viewport of a distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisHints {
    /// Inclusive category index range to show first.
    pub focus_start: usize,
    pub focus_end: usize,
    /// Count-axis range (interquantile, padded).
    pub count_min: f64,
    pub count_max: f64,
}

/// Which of the four distribution charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    M7BoxRetracement,
    M7BoxExtension,
    DrRetracement,
    DrExtension,
}

/// One distribution chart of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardChart {
    pub kind: ChartKind,
    pub title: String,
    pub distribution: DistributionReport,
    pub axis: AxisHints,
}

/// Everything the dashboard page renders for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub range: RangeKind,
    /// Rows surviving the filter chain.
    pub total_count: usize,
    pub tiles: Vec<MetricTile>,
    pub charts: Vec<DashboardChart>,
}

impl DashboardReport {
    pub fn chart(&self, kind: ChartKind) -> Option<&DashboardChart> {
        self.charts.iter().find(|c| c.kind == kind)
    }

    pub fn tile(&self, label: &str) -> Option<&MetricTile> {
        self.tiles.iter().find(|t| t.label == label)
    }
}

/// The "dates of occurrence" view of the filtered rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceTable {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Route path for the dashboard endpoint.
pub const POST_DASHBOARD: &str = "/v1/sessions/{session_id}/dashboard";
/// Route path for the occurrences endpoint.
pub const POST_OCCURRENCES: &str = "/v1/sessions/{session_id}/occurrences";
