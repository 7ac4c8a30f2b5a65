//! Error types for the bin → filter → aggregate pipeline.
//!
//! Every failure surfaced here is a data-shape or configuration mismatch between
//! the uploaded dataset and the requested analysis. Degraded inputs (missing
//! values, unparseable timestamps, empty subsets) are not errors.

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Error type for dataset, binning, filtering and aggregation operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// A predicate, projection or aggregation referenced a column the dataset does not have.
    #[error("Unknown column '{column}' (operation={operation})")]
    UnknownColumn { column: String, operation: String },

    /// A column exists but holds the wrong kind of values for the operation.
    #[error("Column '{column}' has type {actual}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Bin specification is not usable (non-positive width, unordered edges, ...).
    #[error("Invalid bin specification for '{column}': {message}")]
    InvalidBinSpec { column: String, message: String },

    /// Range predicate bounds are not comparable.
    #[error("Invalid range for '{column}': {message}")]
    InvalidRange { column: String, message: String },

    /// Columns of a dataset disagree on their height.
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A derived column would overwrite an existing one.
    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    /// Uploaded records could not be turned into a dataset.
    #[error("Ingestion error: {0}")]
    Ingest(String),
}

impl AnalysisError {
    pub fn unknown_column(column: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            operation: operation.into(),
        }
    }

    pub fn invalid_bin_spec(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidBinSpec {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn invalid_range(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRange {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Name of the column the error is about, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::UnknownColumn { column, .. }
            | Self::TypeMismatch { column, .. }
            | Self::InvalidBinSpec { column, .. }
            | Self::InvalidRange { column, .. }
            | Self::ShapeMismatch { column, .. } => Some(column),
            Self::DuplicateColumn(column) => Some(column),
            Self::Ingest(_) => None,
        }
    }
}
