//! Tabular Record Container
//!
//! Provides the shared row/column table that the feature transformer and
//! dataset builder operate on.

mod table;

pub use table::RecordSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single cell in a record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Numeric cell
    Number(f64),
    /// Categorical/text cell
    Text(String),
}

impl Value {
    /// Numeric view of the cell, if it is numeric
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    /// Text view of the cell, if it is categorical
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Text(s) => Some(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Errors from record set operations
#[derive(Debug, Clone, Error)]
pub enum RecordSetError {
    /// Column declared twice
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// Column not present in the set
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Row does not match the declared column count
    #[error("row has {actual} cells, expected {expected}")]
    RowLength { expected: usize, actual: usize },

    /// Column being attached has the wrong number of cells
    #[error("column {column} has {actual} cells, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Two record sets disagree on their column sets
    #[error("column sets disagree: {0}")]
    ColumnSetMismatch(String),

    /// Row index past the end of the set
    #[error("row index {0} out of bounds")]
    RowOutOfBounds(usize),

    /// JSON value that cannot be represented as a cell
    #[error("unsupported value in column {column}, record {row}")]
    UnsupportedValue { column: String, row: usize },
}
