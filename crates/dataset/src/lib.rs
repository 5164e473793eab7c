//! Dataset Builder
//!
//! Loads raw tabular files, splits them into train/validation partitions
//! with a seeded shuffle, derives scaling statistics from the training
//! partition only, and packages the transformed partitions into indexable
//! (features, label) pairs.

mod builder;
mod dataset;
mod loader;

pub use builder::{split_indices, DatasetBuilder, SplitConfig, TrainValidation};
pub use dataset::Dataset;
pub use loader::{load_csv, load_csv_reader};

use feature_transform::TransformError;
use thiserror::Error;

/// Errors during dataset construction
#[derive(Debug, Error)]
pub enum DatasetError {
    /// No source files were given
    #[error("no source files given")]
    EmptySourceList,

    /// The label column is absent from a source
    #[error("label column {column} is missing from {source_path}")]
    LabelColumnMissing { column: String, source_path: String },

    /// Concatenated sources disagree on their column sets
    #[error("sources disagree on columns: {0}")]
    SchemaMismatch(String),

    /// Validation fraction outside (0, 1)
    #[error("validation fraction {0} is outside (0, 1)")]
    InvalidFraction(f64),

    /// The label column holds a non-numeric value
    #[error("label column {column} has non-numeric values")]
    NonNumericLabel { column: String },

    /// A feature column still holds text after transformation
    #[error("feature column {column} is non-numeric after transformation at row {row}")]
    NonNumericFeature { column: String, row: usize },

    /// Feature transformation failed
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Underlying record set failure
    #[error(transparent)]
    Record(#[from] record_set::RecordSetError),

    /// A source file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A source file is not valid CSV
    #[error("failed to parse {path}: {source}")]
    Csv { path: String, source: csv::Error },
}
