//! Service layer: the bin → filter → aggregate pipeline.
//!
//! Everything here is synchronous and operates on an immutable [`Dataset`]
//! snapshot; sessions and transport live in `db` and `http`.
//!
//! [`Dataset`]: crate::models::Dataset

pub mod binning;
pub mod dashboard;
pub mod distributions;
pub mod error;
pub mod filter_options;
pub mod filtering;

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod dashboard_tests;

pub use binning::{apply_bin_specs, bin_column, BinEdges, BinSpec, BinnedDataset, Binning};
pub use dashboard::{build_dashboard, query_occurrences, DashboardSettings};
pub use distributions::{median, report, threshold_probability, value_distribution};
pub use error::{AnalysisError, AnalysisResult};
pub use filter_options::dashboard_options;
pub use filtering::{apply_filters, matching_rows, FilterPredicate, HalfOpenRange, Selection};
