use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use super::normalize::unique_column_names;
use super::row::{CustomDbRow, index_columns};
use crate::types::RowValues;

/// One output row: normalized column name to JSON value, in column order.
pub type Record = Map<String, JsonValue>;

/// A result set from a database query
///
/// Rows share one column-name vector and one name-to-index cache.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    /// Column names shared by all rows (to avoid duplicating in each row)
    column_names: Option<Arc<Vec<String>>>,
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: None,
            column_index_cache: Arc::default(),
        }
    }

    /// Set the column names for this result set (to be shared by all rows)
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index_cache = Arc::new(index_columns(&column_names));
        self.column_names = Some(column_names);
    }

    /// Get the column names for this result set
    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Add a row to the result set. Ignored until column names are set.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        if let Some(column_names) = &self.column_names {
            self.results.push(CustomDbRow {
                column_names: column_names.clone(),
                rows: row_values,
                column_index_cache: self.column_index_cache.clone(),
            });
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Rename every column to its canonical form; rows and values are untouched.
    ///
    /// Names that would collide after normalization are made distinct so no
    /// cell is lost when rows become records.
    #[must_use]
    pub fn normalize_columns(self) -> ResultSet {
        let Some(names) = self.column_names.clone() else {
            return self;
        };
        let normalized = unique_column_names(names.as_slice());
        let mut out = ResultSet::with_capacity(self.results.len());
        out.set_column_names(Arc::new(normalized));
        for row in self.results {
            out.add_row_values(row.rows);
        }
        out
    }

    #[must_use]
    pub fn to_records(&self) -> Vec<Record> {
        self.results.iter().map(CustomDbRow::to_record).collect()
    }
}

/// Execution output handed back to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutput {
    pub status: &'static str,
    pub data: Vec<Record>,
}

impl QueryOutput {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            status: "ok",
            data: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_result_set(result_set: &ResultSet) -> Self {
        Self {
            status: "ok",
            data: result_set.to_records(),
        }
    }
}
