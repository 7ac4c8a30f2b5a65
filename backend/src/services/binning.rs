//! Fixed-width binning of numeric columns into ordered, labelled categories.
//!
//! Bins are anchored at multiples of the bin width: the observed minimum is
//! snapped down and the observed maximum snapped up to the nearest multiple,
//! and every bin in between is emitted, populated or not. Bin `i` covers the
//! half-open interval `[e_i, e_{i+1})` and is labelled
//! `"{e_i:.3} to {e_{i+1} - 0.001:.3}"`. The outermost edges are closed, so
//! the minimum always lands in the first bin and a maximum sitting exactly
//! on the last edge lands in the last bin.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Column, ColumnData, Dataset};
use crate::services::error::{AnalysisError, AnalysisResult};

/// Cosmetic offset subtracted from the upper edge in bin labels.
pub const LABEL_UPPER_OFFSET: f64 = 0.001;

/// Upper bound on the number of bins one specification may generate.
pub const MAX_BINS: usize = 100_000;

/// How the edges of a binning are obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BinEdges {
    /// Edges at multiples of `width`, spanning the observed values.
    Dynamic { width: f64 },
    /// Predetermined, strictly increasing edges.
    Fixed { edges: Vec<f64> },
}

/// Binning request for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    /// Source numeric column.
    pub column: String,
    /// Name of the derived categorical column.
    pub output: String,
    pub edges: BinEdges,
}

impl BinSpec {
    /// Dynamic binning with the given width (anchor 0).
    pub fn dynamic(column: impl Into<String>, width: f64) -> AnalysisResult<Self> {
        let column = column.into();
        let spec = Self {
            output: format!("{}_Grouped", column),
            column,
            edges: BinEdges::Dynamic { width },
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Binning over predetermined edges.
    pub fn fixed(column: impl Into<String>, edges: Vec<f64>) -> AnalysisResult<Self> {
        let column = column.into();
        let spec = Self {
            output: format!("{}_Grouped", column),
            column,
            edges: BinEdges::Fixed { edges },
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Override the derived column name.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        match &self.edges {
            BinEdges::Dynamic { width } => {
                if !(width.is_finite() && *width > 0.0) {
                    return Err(AnalysisError::invalid_bin_spec(
                        &self.column,
                        format!("width must be a positive number, got {}", width),
                    ));
                }
            }
            BinEdges::Fixed { edges } => {
                if edges.len() < 2 {
                    return Err(AnalysisError::invalid_bin_spec(
                        &self.column,
                        "at least two edges are required",
                    ));
                }
                if edges.len() - 1 > MAX_BINS {
                    return Err(AnalysisError::invalid_bin_spec(
                        &self.column,
                        format!("{} bins exceed the limit of {}", edges.len() - 1, MAX_BINS),
                    ));
                }
                if edges.iter().any(|e| !e.is_finite())
                    || edges.windows(2).any(|w| w[0] >= w[1])
                {
                    return Err(AnalysisError::invalid_bin_spec(
                        &self.column,
                        "edges must be finite and strictly increasing",
                    ));
                }
            }
        }
        if self.output.is_empty() {
            return Err(AnalysisError::invalid_bin_spec(
                &self.column,
                "output column name is empty",
            ));
        }
        Ok(())
    }
}

/// Display label for the bin `[lower, upper)`.
pub fn bin_label(lower: f64, upper: f64) -> String {
    format!("{:.3} to {:.3}", lower, upper - LABEL_UPPER_OFFSET)
}

/// One half-open bin `[lower, upper)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub label: String,
}

impl Bin {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            label: bin_label(lower, upper),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value < self.upper
    }
}

/// Result of binning one column: the ordered bins and a per-row assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Binning {
    pub column: String,
    pub bins: Vec<Bin>,
    /// Index into `bins` for every row; `None` for missing values.
    pub assignments: Vec<Option<usize>>,
}

impl Binning {
    /// No bins, every row unassigned.
    pub fn empty(column: impl Into<String>, rows: usize) -> Self {
        Self {
            column: column.into(),
            bins: Vec::new(),
            assignments: vec![None; rows],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Labels in canonical (ascending edge) order.
    pub fn labels(&self) -> Vec<String> {
        self.bins.iter().map(|b| b.label.clone()).collect()
    }

    pub fn label_for_row(&self, row: usize) -> Option<&str> {
        self.assignments[row].map(|i| self.bins[i].label.as_str())
    }

    pub fn row_labels(&self) -> Vec<Option<String>> {
        (0..self.assignments.len())
            .map(|row| self.label_for_row(row).map(str::to_string))
            .collect()
    }

    /// Derived categorical column holding each row's label.
    pub fn to_column(&self, name: impl Into<String>) -> Column {
        Column::new(name, ColumnData::Category(self.row_labels()))
    }
}

/// Quotients this close to an integer are treated as that integer.
const QUOTIENT_TOLERANCE: f64 = 1e-9;

/// Decimal grid that computed edges are snapped onto when they only differ
/// from it by rounding noise.
const EDGE_GRID: f64 = 1e9;

/// `value / width`, snapped onto the nearest integer when within tolerance.
fn bin_quotient(value: f64, width: f64) -> f64 {
    let quotient = value / width;
    let nearest = quotient.round();
    if (quotient - nearest).abs() <= QUOTIENT_TOLERANCE {
        nearest
    } else {
        quotient
    }
}

/// `index * width`, with the last-bit error of the product removed.
///
/// `3.0 * 0.2` is `0.6000000000000001`; the edge must be `0.6`.
fn edge_at(index: f64, width: f64) -> f64 {
    let edge = index * width;
    let snapped = (edge * EDGE_GRID).round() / EDGE_GRID;
    if (snapped - edge).abs() <= 4.0 * f64::EPSILON * edge.abs().max(1.0) {
        snapped
    } else {
        edge
    }
}

fn dynamic_edges(spec: &BinSpec, min: f64, max: f64, width: f64) -> AnalysisResult<Vec<f64>> {
    let first = bin_quotient(min, width).floor();
    let last = bin_quotient(max, width).ceil();
    // All values on one exact multiple still get one bin.
    let steps = (last - first).max(1.0);
    if !steps.is_finite() || steps > MAX_BINS as f64 {
        return Err(AnalysisError::invalid_bin_spec(
            &spec.column,
            format!(
                "width {} over [{}, {}] exceeds the limit of {} bins",
                width, min, max, MAX_BINS
            ),
        ));
    }
    let steps = steps as usize;
    Ok((0..=steps).map(|i| edge_at(first + i as f64, width)).collect())
}

/// Index of the bin holding `value`, clamped into the outermost bins.
fn locate(edges: &[f64], value: f64) -> usize {
    let bins = edges.len() - 1;
    edges
        .partition_point(|&e| e <= value)
        .saturating_sub(1)
        .min(bins - 1)
}

/// Bin `spec.column` of `dataset`.
///
/// An absent column, or one without any finite value, yields
/// [`Binning::empty`]. A present non-numeric column is a type error.
///
/// Dynamic edges are exact multiples of the width up to rounding noise, so
/// a value such as `0.6` at width `0.2` opens the bin `"0.600 to 0.799"`.
///
/// # Errors
///
/// Besides the cases above, a dynamic binning whose observed span needs more
/// than [`MAX_BINS`] bins is rejected with
/// [`AnalysisError::InvalidBinSpec`]. A single outlier can cause this (a
/// sentinel of `99999` in a retracement column at width `0.25`), which fails
/// every report that bins the column. Clean or filter such rows before
/// upload, or bin them with [`BinEdges::Fixed`], which leaves out-of-range
/// values unbinned instead.
pub fn bin_column(dataset: &Dataset, spec: &BinSpec) -> AnalysisResult<Binning> {
    spec.validate()?;

    let Some(column) = dataset.column(&spec.column) else {
        debug!("Binning skipped: column '{}' is absent", spec.column);
        return Ok(Binning::empty(&spec.column, dataset.height()));
    };
    let values = column.as_numbers()?;

    let (min, max) = values
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .map_or((f64::NAN, f64::NAN), |range| range);
    if min.is_nan() {
        debug!("Binning skipped: column '{}' has no values", spec.column);
        return Ok(Binning::empty(&spec.column, dataset.height()));
    }

    let (edges, clamp) = match &spec.edges {
        BinEdges::Dynamic { width } => (dynamic_edges(spec, min, max, *width)?, true),
        BinEdges::Fixed { edges } => (edges.clone(), false),
    };
    let first = edges[0];
    let last = edges[edges.len() - 1];

    let assignments = values
        .iter()
        .map(|v| match v {
            Some(x) if x.is_finite() => {
                if clamp || (*x >= first && *x <= last) {
                    Some(locate(&edges, *x))
                } else {
                    None
                }
            }
            _ => None,
        })
        .collect();

    let bins: Vec<Bin> = edges.windows(2).map(|w| Bin::new(w[0], w[1])).collect();
    debug!(
        "Binned '{}' into {} bins over [{}, {}]",
        spec.column,
        bins.len(),
        first,
        last
    );

    Ok(Binning {
        column: spec.column.clone(),
        bins,
        assignments,
    })
}

/// Dataset with derived bin columns appended, plus each column's canonical label order.
#[derive(Debug, Clone, Default)]
pub struct BinnedDataset {
    pub dataset: Dataset,
    pub bin_orders: HashMap<String, Vec<String>>,
}

impl BinnedDataset {
    /// Canonical label order of a derived column; empty when unknown.
    pub fn bin_order(&self, output: &str) -> &[String] {
        self.bin_orders
            .get(output)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Apply every spec to `dataset`, appending one derived column per spec.
pub fn apply_bin_specs(dataset: &Dataset, specs: &[BinSpec]) -> AnalysisResult<BinnedDataset> {
    let mut out = dataset.clone();
    let mut bin_orders = HashMap::with_capacity(specs.len());
    for spec in specs {
        let binning = bin_column(dataset, spec)?;
        out = out.with_column(binning.to_column(&spec.output))?;
        bin_orders.insert(spec.output.clone(), binning.labels());
    }
    Ok(BinnedDataset {
        dataset: out,
        bin_orders,
    })
}
