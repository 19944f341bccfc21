//! A small columnar table keyed by column name.
//!
//! Only what the pipeline needs: typed columns of equal length, name lookup,
//! row selection and column appends. Column order is preserved.

use std::collections::HashMap;
use std::ops::Range;

use chrono::NaiveDate;

use crate::error::FeatureError;

/// Values of a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Text(Vec<String>),
    Date(Vec<NaiveDate>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Numeric(_) => "numeric",
            ColumnData::Text(_) => "text",
            ColumnData::Date(_) => "date",
        }
    }

    fn take(&self, indices: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Text(v) => ColumnData::Text(indices.iter().map(|&i| v[i].clone()).collect()),
            ColumnData::Date(v) => ColumnData::Date(indices.iter().map(|&i| v[i]).collect()),
        }
    }

    fn slice(&self, range: Range<usize>) -> ColumnData {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(v[range].to_vec()),
            ColumnData::Text(v) => ColumnData::Text(v[range].to_vec()),
            ColumnData::Date(v) => ColumnData::Date(v[range].to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, ColumnData::Numeric(values))
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(name, ColumnData::Text(values))
    }

    pub fn dates(name: impl Into<String>, values: Vec<NaiveDate>) -> Self {
        Self::new(name, ColumnData::Date(values))
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dates(&self) -> Option<&[NaiveDate]> {
        match &self.data {
            ColumnData::Date(v) => Some(v),
            _ => None,
        }
    }
}

/// Ordered, uniquely named columns of equal length.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    n_rows: usize,
}

/// The unvalidated tabular input, one row per date.
pub type RawDataset = Frame;

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.n_rows == other.n_rows && self.columns == other.columns
    }
}

impl Frame {
    /// Build a frame from columns, checking lengths and name uniqueness.
    pub fn new(columns: Vec<Column>) -> Result<Self, FeatureError> {
        let mut frame = Frame::default();
        for column in columns {
            frame.push_column(column)?;
        }
        Ok(frame)
    }

    /// Append a column at the end.
    pub fn push_column(&mut self, column: Column) -> Result<(), FeatureError> {
        if self.index.contains_key(&column.name) {
            return Err(FeatureError::data(format!("Duplicate column name `{}`.", column.name)));
        }
        let len = column.data.len();
        if self.columns.is_empty() {
            self.n_rows = len;
        } else if len != self.n_rows {
            return Err(FeatureError::data(format!(
                "Column `{}` has {len} rows, expected {}.",
                column.name, self.n_rows
            )));
        }
        self.index.insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        self.column(name).and_then(Column::as_numeric)
    }

    pub fn dates(&self, name: &str) -> Option<&[NaiveDate]> {
        self.column(name).and_then(Column::as_dates)
    }

    /// Select rows by index (in the given order; indices may repeat).
    pub fn take(&self, indices: &[usize]) -> Frame {
        Frame {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.take(indices)))
                .collect(),
            index: self.index.clone(),
            n_rows: indices.len(),
        }
    }

    /// Contiguous row range.
    pub fn slice(&self, range: Range<usize>) -> Frame {
        let n_rows = range.len();
        Frame {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.slice(range.clone())))
                .collect(),
            index: self.index.clone(),
            n_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn rejects_ragged_and_duplicate_columns() {
        let ragged = Frame::new(vec![
            Column::numeric("a", vec![1.0, 2.0]),
            Column::numeric("b", vec![1.0]),
        ]);
        assert!(matches!(ragged, Err(FeatureError::InvalidData(_))));

        let dup = Frame::new(vec![
            Column::numeric("a", vec![1.0]),
            Column::text("a", vec!["x".to_string()]),
        ]);
        assert!(matches!(dup, Err(FeatureError::InvalidData(_))));
    }

    #[test]
    fn take_and_slice_keep_columns_aligned() {
        let frame = Frame::new(vec![
            Column::dates("ds", vec![d(2020, 1, 3), d(2020, 1, 1), d(2020, 1, 2)]),
            Column::numeric("y", vec![3.0, 1.0, 2.0]),
        ])
        .unwrap();

        let sorted = frame.take(&[1, 2, 0]);
        assert_eq!(sorted.numeric("y").unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(sorted.dates("ds").unwrap()[0], d(2020, 1, 1));

        let tail = sorted.slice(1..3);
        assert_eq!(tail.n_rows(), 2);
        assert_eq!(tail.column_names(), vec!["ds", "y"]);
        assert_eq!(tail.numeric("y").unwrap(), &[2.0, 3.0]);
    }
}
