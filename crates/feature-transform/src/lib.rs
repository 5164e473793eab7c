//! Feature Transformer
//!
//! Applies numerical standardization and categorical one-hot encoding to a
//! record set under fixed, externally loaded schemas. The same schemas are
//! used by the offline training path and the online serving path, so
//! identical input rows must produce bit-identical transformed output from
//! either call site.

mod categorical;
mod numeric;
mod transform;

pub use categorical::{CategoricalField, CategoricalSchema};
pub use numeric::{FieldStats, NumericScalingSchema};
pub use transform::{encode, scale, transform, validate_columns};

use record_set::RecordSetError;
use thiserror::Error;

/// Errors during feature transformation
#[derive(Debug, Error)]
pub enum TransformError {
    /// A schema-scheduled field is absent from the record set
    #[error("schema field {field} is absent from the record set")]
    SchemaMismatch { field: String },

    /// Standard deviation of zero (or non-finite stats) at schema
    /// construction time
    #[error("degenerate standard deviation for numeric field {field}")]
    DegenerateScale { field: String },

    /// Text cell in a field scheduled for numeric scaling
    #[error("non-numeric value in field {field} at row {row}")]
    NonNumericValue { field: String, row: usize },

    /// Schema fit over a record set with no rows
    #[error("record set has no rows")]
    EmptyRecordSet,

    /// Malformed categorical schema definition
    #[error("invalid categorical schema: {0}")]
    InvalidCategoricalSchema(String),

    /// Underlying record set failure (e.g. indicator column name clash)
    #[error(transparent)]
    Record(#[from] RecordSetError),

    /// Schema file could not be read or written
    #[error("schema file error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema file is not valid JSON
    #[error("schema file parse error: {0}")]
    Json(#[from] serde_json::Error),
}
