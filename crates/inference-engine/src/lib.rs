//! Churn Model Inference
//!
//! Runs the externally trained churn model (ONNX via tract) over
//! preprocessed feature matrices and reduces its continuous output to
//! binary decisions.

mod engine;

pub use engine::ChurnModel;

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected} features, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
}
