use serde::{Deserialize, Serialize};

use crate::services::binning::BinSpec;
use crate::services::filtering::FilterPredicate;

// =========================================================
// Distribution types + route
// =========================================================

/// One category of a frequency distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRow {
    pub label: String,
    pub count: usize,
    /// Share of non-missing rows, in percent.
    pub percentage: f64,
    /// Bar annotation, `"{count} ({percentage:.2}%)"`.
    pub text: String,
}

/// Direction of a threshold probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `value <= threshold`
    AtMost,
    /// `value >= threshold`
    AtLeast,
}

impl Comparison {
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::AtMost => value <= threshold,
            Comparison::AtLeast => value >= threshold,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::AtMost => "<=",
            Comparison::AtLeast => ">=",
        }
    }
}

/// Requested threshold probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityProbe {
    pub column: String,
    pub comparison: Comparison,
    pub threshold: f64,
}

impl ProbabilityProbe {
    pub fn new(column: impl Into<String>, comparison: Comparison, threshold: f64) -> Self {
        Self {
            column: column.into(),
            comparison,
            threshold,
        }
    }
}

/// Share of rows satisfying a probe; 0 on an empty subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdProbability {
    pub column: String,
    pub comparison: Comparison,
    pub threshold: f64,
    pub probability: f64,
}

/// Median of a numeric column; NaN (serialized as `null`) when no values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMedian {
    pub column: String,
    pub median: f64,
    /// Summary of the same non-missing values.
    pub summary: DistributionStats,
}

/// Summary statistics of a numeric column.
///
/// Everything but `count` and `sum` is NaN when there are no values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
}

/// Frequency distribution of one categorical column plus scalar summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub column: String,
    /// Categories in canonical bin order, zero-count bins included.
    pub rows: Vec<DistributionRow>,
    /// Rows with a category (the percentage denominator).
    pub total: usize,
    /// Rows without a category.
    pub missing: usize,
    #[serde(default)]
    pub probabilities: Vec<ThresholdProbability>,
    #[serde(default)]
    pub medians: Vec<ColumnMedian>,
}

impl DistributionReport {
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.count).collect()
    }

    pub fn row(&self, label: &str) -> Option<&DistributionRow> {
        self.rows.iter().find(|r| r.label == label)
    }
}

/// Generic bin → filter → aggregate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRequest {
    #[serde(default)]
    pub bin_specs: Vec<BinSpec>,
    #[serde(default)]
    pub predicates: Vec<FilterPredicate>,
    /// Categorical column to count, usually a derived bin column.
    pub category_column: String,
    #[serde(default)]
    pub probes: Vec<ProbabilityProbe>,
    #[serde(default)]
    pub median_columns: Vec<String>,
}

/// Route path for the generic distribution endpoint.
pub const POST_DISTRIBUTION: &str = "/v1/sessions/{session_id}/distribution";
