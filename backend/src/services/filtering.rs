//! Conjunctive row filters over a [`Dataset`].
//!
//! A filter chain is a list of independent predicates; a row survives when it
//! passes every one of them. Predicates never look at each other, so the
//! order of the chain does not change the result.

use chrono::NaiveTime;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{Column, ColumnData, Dataset};
use crate::services::error::{AnalysisError, AnalysisResult};

/// UI choice meaning "do not filter on this field".
pub const WILDCARD: &str = "All";

/// Accepted values of a categorical field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "values", rename_all = "snake_case")]
pub enum Selection {
    /// Every row passes, including rows where the field is missing.
    #[default]
    Any,
    Equals(String),
    /// An empty set passes no rows.
    OneOf(BTreeSet<String>),
}

impl Selection {
    /// Single-choice widget value; [`WILDCARD`] maps to [`Selection::Any`].
    pub fn from_choice(choice: &str) -> Self {
        if choice == WILDCARD {
            Selection::Any
        } else {
            Selection::Equals(choice.to_string())
        }
    }

    /// Multi-choice widget value; [`WILDCARD`] anywhere in it maps to [`Selection::Any`].
    pub fn from_choices<S: AsRef<str>>(choices: &[S]) -> Self {
        if choices.iter().any(|c| c.as_ref() == WILDCARD) {
            Selection::Any
        } else {
            Selection::OneOf(choices.iter().map(|c| c.as_ref().to_string()).collect())
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Selection::Any)
    }

    /// Whether a row with categorical key `key` passes.
    pub fn matches(&self, key: Option<&str>) -> bool {
        match (self, key) {
            (Selection::Any, _) => true,
            (_, None) => false,
            (Selection::Equals(v), Some(k)) => v == k,
            (Selection::OneOf(set), Some(k)) => set.contains(k),
        }
    }
}

/// Interval `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfOpenRange<T> {
    pub low: T,
    pub high: T,
}

impl<T: PartialOrd> HalfOpenRange<T> {
    pub fn new(low: T, high: T) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: &T) -> bool {
        *value >= self.low && *value < self.high
    }

    /// True when no value can satisfy the range.
    pub fn is_empty(&self) -> bool {
        self.low >= self.high
    }
}

/// One predicate of a filter chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterPredicate {
    Categorical {
        column: String,
        selection: Selection,
    },
    NumericRange {
        column: String,
        range: HalfOpenRange<f64>,
    },
    TimeRange {
        column: String,
        range: HalfOpenRange<NaiveTime>,
    },
}

impl FilterPredicate {
    pub fn categorical(column: impl Into<String>, selection: Selection) -> Self {
        FilterPredicate::Categorical {
            column: column.into(),
            selection,
        }
    }

    pub fn numeric_range(column: impl Into<String>, low: f64, high: f64) -> Self {
        FilterPredicate::NumericRange {
            column: column.into(),
            range: HalfOpenRange::new(low, high),
        }
    }

    pub fn time_range(column: impl Into<String>, low: NaiveTime, high: NaiveTime) -> Self {
        FilterPredicate::TimeRange {
            column: column.into(),
            range: HalfOpenRange::new(low, high),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            FilterPredicate::Categorical { column, .. }
            | FilterPredicate::NumericRange { column, .. }
            | FilterPredicate::TimeRange { column, .. } => column,
        }
    }

    /// Wildcard predicates pass every row and are skipped entirely.
    pub fn is_identity(&self) -> bool {
        matches!(
            self,
            FilterPredicate::Categorical {
                selection: Selection::Any,
                ..
            }
        )
    }

    /// Resolve the column and check the predicate is applicable to it.
    fn bind<'a>(&'a self, dataset: &'a Dataset) -> AnalysisResult<Bound<'a>> {
        let column = dataset.require_column(self.column(), "filter")?;
        match self {
            FilterPredicate::Categorical { selection, .. } => {
                Ok(Bound::Categorical { column, selection })
            }
            FilterPredicate::NumericRange { range, .. } => {
                if range.low.is_nan() || range.high.is_nan() {
                    return Err(AnalysisError::invalid_range(
                        column.name(),
                        "range bounds must be numbers",
                    ));
                }
                Ok(Bound::Numeric {
                    values: column.as_numbers()?,
                    range,
                })
            }
            FilterPredicate::TimeRange { range, .. } => Ok(Bound::Time {
                values: column.as_times()?,
                range,
            }),
        }
    }
}

/// A predicate with its column resolved against one dataset.
enum Bound<'a> {
    Categorical {
        column: &'a Column,
        selection: &'a Selection,
    },
    Numeric {
        values: &'a [Option<f64>],
        range: &'a HalfOpenRange<f64>,
    },
    Time {
        values: &'a [Option<NaiveTime>],
        range: &'a HalfOpenRange<NaiveTime>,
    },
}

impl Bound<'_> {
    fn passes(&self, row: usize) -> bool {
        match self {
            Bound::Categorical { column, selection } => match column.data() {
                ColumnData::Category(values) => selection.matches(values[row].as_deref()),
                _ => selection.matches(column.text_at(row).as_deref()),
            },
            Bound::Numeric { values, range } => {
                values[row].map_or(false, |v| range.contains(&v))
            }
            Bound::Time { values, range } => values[row].map_or(false, |t| range.contains(&t)),
        }
    }
}

/// Row indices passing every predicate, in original order.
pub fn matching_rows(dataset: &Dataset, predicates: &[FilterPredicate]) -> AnalysisResult<Vec<usize>> {
    // Bind everything up front so errors do not depend on predicate order.
    let bound = predicates
        .iter()
        .filter(|p| !p.is_identity())
        .map(|p| p.bind(dataset))
        .collect::<AnalysisResult<Vec<_>>>()?;

    Ok((0..dataset.height())
        .filter(|&row| bound.iter().all(|b| b.passes(row)))
        .collect())
}

/// Apply a filter chain, returning the surviving rows with all columns.
pub fn apply_filters(dataset: &Dataset, predicates: &[FilterPredicate]) -> AnalysisResult<Dataset> {
    let rows = matching_rows(dataset, predicates)?;
    debug!(
        "Filter chain of {} predicate(s) kept {} of {} rows",
        predicates.len(),
        rows.len(),
        dataset.height()
    );
    if rows.len() == dataset.height() {
        return Ok(dataset.clone());
    }
    Ok(dataset.take(&rows))
}
