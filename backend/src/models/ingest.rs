//! Conversion of uploaded JSON records into a typed [`Dataset`].
//!
//! CSV parsing happens upstream; the backend receives an array of flat JSON
//! objects, one per trade session. Column types are decided here, once.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::dataset::{Column, ColumnData, Dataset};
use super::time::{parse_date, parse_time_of_day};
use crate::services::error::{AnalysisError, AnalysisResult};

/// Which columns carry timestamps that must be reduced to time-of-day or date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestOptions {
    #[serde(default)]
    pub time_columns: Vec<String>,
    #[serde(default)]
    pub date_columns: Vec<String>,
}

/// A cell is missing when the key is absent, `null`, or blank text.
fn present(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}

fn scalar_text(column: &str, value: &Value) -> AnalysisResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) | Value::Object(_) => Err(AnalysisError::Ingest(format!(
            "column '{}' holds a nested value",
            column
        ))),
        Value::Null => Ok(String::new()),
    }
}

/// Parse text cells with `parse`, counting the ones that fail.
fn parse_cells<T>(
    column: &str,
    cells: &[Option<&Value>],
    parse: impl Fn(&str) -> Option<T>,
) -> Vec<Option<T>> {
    let mut rejected = 0usize;
    let values: Vec<Option<T>> = cells
        .iter()
        .map(|cell| {
            let parsed = match cell {
                Some(Value::String(s)) => parse(s),
                _ => None,
            };
            if cell.is_some() && parsed.is_none() {
                rejected += 1;
            }
            parsed
        })
        .collect();
    if rejected > 0 {
        warn!(
            "{} value(s) in column '{}' could not be parsed and are treated as missing",
            rejected, column
        );
    }
    values
}

fn build_column(
    name: &str,
    cells: &[Option<&Value>],
    options: &IngestOptions,
) -> AnalysisResult<Column> {
    if options.time_columns.iter().any(|c| c == name) {
        return Ok(Column::times(name, parse_cells(name, cells, parse_time_of_day)));
    }
    if options.date_columns.iter().any(|c| c == name) {
        return Ok(Column::dates(name, parse_cells(name, cells, parse_date)));
    }

    let numeric = cells.iter().flatten().all(|v| v.is_number());
    if numeric {
        return Ok(Column::numbers(
            name,
            cells.iter().map(|cell| cell.and_then(Value::as_f64)),
        ));
    }

    let values = cells
        .iter()
        .map(|cell| cell.map(|v| scalar_text(name, v)).transpose())
        .collect::<AnalysisResult<Vec<_>>>()?;
    Ok(Column::new(name, ColumnData::Category(values)))
}

/// Build a dataset from JSON records.
///
/// Columns appear in order of first appearance across records. A column is
/// numeric when every present value is a JSON number, otherwise categorical;
/// configured time and date columns are parsed from text.
pub fn dataset_from_records(records: &[Value], options: &IngestOptions) -> AnalysisResult<Dataset> {
    let mut names: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let object = record
            .as_object()
            .ok_or_else(|| AnalysisError::Ingest(format!("record {} is not an object", i)))?;
        for key in object.keys() {
            if seen.insert(key.as_str()) {
                names.push(key.clone());
            }
        }
        rows.push(object);
    }

    let columns = names
        .iter()
        .map(|name| {
            let cells: Vec<Option<&Value>> = rows.iter().map(|row| present(row.get(name))).collect();
            build_column(name, &cells, options)
        })
        .collect::<AnalysisResult<Vec<_>>>()?;

    let dataset = Dataset::new(columns)?;
    debug!(
        "Ingested {} records into {} columns",
        dataset.height(),
        dataset.width()
    );
    Ok(dataset)
}
