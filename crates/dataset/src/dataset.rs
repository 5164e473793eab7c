//! Indexable (features, label) Dataset

use ndarray::{Array1, Array2, ArrayView1};

/// Indexed collection of (feature-vector, label) pairs ready for model
/// consumption, with a declared feature-column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Array1<f64>,
    feature_columns: Vec<String>,
    label_column: String,
}

impl Dataset {
    /// Assemble a dataset; panics are avoided by construction going
    /// through the builder, which guarantees matching shapes
    pub(crate) fn new(
        features: Array2<f64>,
        labels: Array1<f64>,
        feature_columns: Vec<String>,
        label_column: String,
    ) -> Self {
        debug_assert_eq!(features.nrows(), labels.len());
        debug_assert_eq!(features.ncols(), feature_columns.len());
        Self {
            features,
            labels,
            feature_columns,
            label_column,
        }
    }

    /// Number of (features, label) pairs
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the dataset holds no pairs
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Width of each feature vector
    pub fn feature_dim(&self) -> usize {
        self.features.ncols()
    }

    /// One (feature-vector, label) pair
    pub fn get(&self, idx: usize) -> Option<(ArrayView1<'_, f64>, f64)> {
        if idx >= self.len() {
            return None;
        }
        Some((self.features.row(idx), self.labels[idx]))
    }

    /// Full feature matrix, rows in partition order
    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    /// Label vector, aligned with the feature rows
    pub fn labels(&self) -> &Array1<f64> {
        &self.labels
    }

    /// Feature column names, in matrix column order
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Name of the label column
    pub fn label_column(&self) -> &str {
        &self.label_column
    }
}
