//! Column-oriented, immutable dataset of trade-session records.
//!
//! A [`Dataset`] is the in-memory snapshot a session analyses. Columns are typed
//! once at ingestion time and every operation (projection, row subset, derived
//! column) returns a new dataset; nothing is mutated in place.

use chrono::{NaiveDate, NaiveTime};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::fmt;

use crate::services::error::{AnalysisError, AnalysisResult};

/// Format used for time-of-day values when rendered as text.
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Format used for dates when rendered as text.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Number,
    Category,
    Time,
    Date,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Number => "number",
            ColumnKind::Category => "category",
            ColumnKind::Time => "time",
            ColumnKind::Date => "date",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values of one column; `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Number(Vec<Option<f64>>),
    Category(Vec<Option<String>>),
    Time(Vec<Option<NaiveTime>>),
    Date(Vec<Option<NaiveDate>>),
}

impl ColumnData {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Number(_) => ColumnKind::Number,
            ColumnData::Category(_) => ColumnKind::Category,
            ColumnData::Time(_) => ColumnKind::Time,
            ColumnData::Date(_) => ColumnKind::Date,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Number(v) => v.len(),
            ColumnData::Category(v) => v.len(),
            ColumnData::Time(v) => v.len(),
            ColumnData::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Number(v) => v[row].is_none(),
            ColumnData::Category(v) => v[row].is_none(),
            ColumnData::Time(v) => v[row].is_none(),
            ColumnData::Date(v) => v[row].is_none(),
        }
    }

    /// Number of non-missing cells.
    pub fn present_count(&self) -> usize {
        (0..self.len()).filter(|&row| !self.is_missing(row)).count()
    }

    fn take(&self, indices: &[usize]) -> ColumnData {
        fn pick<T: Clone>(values: &[Option<T>], indices: &[usize]) -> Vec<Option<T>> {
            indices.iter().map(|&i| values[i].clone()).collect()
        }

        match self {
            ColumnData::Number(v) => ColumnData::Number(pick(v, indices)),
            ColumnData::Category(v) => ColumnData::Category(pick(v, indices)),
            ColumnData::Time(v) => ColumnData::Time(pick(v, indices)),
            ColumnData::Date(v) => ColumnData::Date(pick(v, indices)),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Create a column. NaN numbers are normalised to missing.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        let data = match data {
            ColumnData::Number(values) => ColumnData::Number(
                values
                    .into_iter()
                    .map(|v| v.filter(|x| !x.is_nan()))
                    .collect(),
            ),
            other => other,
        };
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn numbers<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self::new(name, ColumnData::Number(values.into_iter().collect()))
    }

    pub fn categories<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self::new(
            name,
            ColumnData::Category(values.into_iter().map(|v| v.map(Into::into)).collect()),
        )
    }

    pub fn times<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<NaiveTime>>,
    {
        Self::new(name, ColumnData::Time(values.into_iter().collect()))
    }

    pub fn dates<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<NaiveDate>>,
    {
        Self::new(name, ColumnData::Date(values.into_iter().collect()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn mismatch(&self, expected: ColumnKind) -> AnalysisError {
        AnalysisError::TypeMismatch {
            column: self.name.clone(),
            expected: expected.as_str(),
            actual: self.kind().as_str(),
        }
    }

    /// Numeric values, or a type error for any other kind of column.
    pub fn as_numbers(&self) -> AnalysisResult<&[Option<f64>]> {
        match &self.data {
            ColumnData::Number(v) => Ok(v),
            _ => Err(self.mismatch(ColumnKind::Number)),
        }
    }

    /// Time-of-day values, or a type error for any other kind of column.
    pub fn as_times(&self) -> AnalysisResult<&[Option<NaiveTime>]> {
        match &self.data {
            ColumnData::Time(v) => Ok(v),
            _ => Err(self.mismatch(ColumnKind::Time)),
        }
    }

    /// Canonical categorical key of a cell.
    ///
    /// This is the text the filter options are built from and the text
    /// categorical predicates compare against, so both always agree.
    pub fn text_at(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Number(v) => v[row].map(|x| x.to_string()),
            ColumnData::Category(v) => v[row].clone(),
            ColumnData::Time(v) => v[row].map(|t| t.format(TIME_FORMAT).to_string()),
            ColumnData::Date(v) => v[row].map(|d| d.format(DATE_FORMAT).to_string()),
        }
    }

    /// JSON rendering of a cell; missing cells become `null`.
    pub fn json_at(&self, row: usize) -> Value {
        match &self.data {
            ColumnData::Number(v) => v[row]
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            _ => self.text_at(row).map(Value::String).unwrap_or(Value::Null),
        }
    }
}

/// Immutable, column-oriented table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    height: usize,
}

impl Dataset {
    /// Build a dataset, checking that column names are unique and heights agree.
    pub fn new(columns: Vec<Column>) -> AnalysisResult<Self> {
        let height = columns.first().map(Column::len).unwrap_or(0);
        let mut index = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            if column.len() != height {
                return Err(AnalysisError::ShapeMismatch {
                    column: column.name.clone(),
                    expected: height,
                    actual: column.len(),
                });
            }
            if index.insert(column.name.clone(), i).is_some() {
                return Err(AnalysisError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self {
            columns,
            index,
            height,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    /// Look up a column, reporting an unknown column as a configuration error.
    pub fn require_column(&self, name: &str, operation: &str) -> AnalysisResult<&Column> {
        self.column(name)
            .ok_or_else(|| AnalysisError::unknown_column(name, operation))
    }

    /// Return a new dataset with `column` appended.
    pub fn with_column(&self, column: Column) -> AnalysisResult<Dataset> {
        if self.has_column(column.name()) {
            return Err(AnalysisError::DuplicateColumn(column.name.clone()));
        }
        let mut columns = self.columns.clone();
        columns.push(column);
        Dataset::new(columns)
    }

    /// Row subset in the order given by `indices`.
    pub fn take(&self, indices: &[usize]) -> Dataset {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                data: c.data.take(indices),
            })
            .collect();
        Dataset {
            columns,
            index: self.index.clone(),
            height: indices.len(),
        }
    }

    /// Projection onto `names`, in the order given.
    pub fn select(&self, names: &[&str]) -> AnalysisResult<Dataset> {
        let columns = names
            .iter()
            .map(|name| self.require_column(name, "select").cloned())
            .collect::<AnalysisResult<Vec<_>>>()?;
        Dataset::new(columns)
    }

    /// Row-oriented JSON view of the dataset.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        (0..self.height)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.json_at(row)))
                    .collect()
            })
            .collect()
    }
}
