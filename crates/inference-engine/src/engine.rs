//! Churn Model Implementation

use crate::InferenceError;
use ndarray::Array2;
use tract_onnx::prelude::*;
use tracing::{debug, info, warn};

type RunnablePlan = RunnableModel<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// Decision threshold on the model's continuous output
const DECISION_THRESHOLD: f64 = 0.5;

/// Opaque churn model artifact.
///
/// Loads an ONNX model when the artifact exists; otherwise falls back to a
/// deterministic mock scorer so the serving path can be exercised before a
/// trained artifact is available.
pub struct ChurnModel {
    /// Model artifact path
    model_path: String,
    /// Compiled inference plan, once loaded
    plan: Option<RunnablePlan>,
    /// Whether load() has run
    loaded: bool,
    /// Mock mode (no artifact on disk)
    mock_mode: bool,
    /// Expected feature dimension, when known
    feature_dim: Option<usize>,
}

impl ChurnModel {
    /// Create a model wrapper for the given artifact path
    pub fn new(model_path: &str) -> Self {
        let mock_mode = !std::path::Path::new(model_path).exists();
        if mock_mode {
            warn!(
                "Model artifact {} not found; running with mock scorer",
                model_path
            );
        } else {
            info!("Creating churn model from artifact: {}", model_path);
        }
        Self {
            model_path: model_path.to_string(),
            plan: None,
            loaded: false,
            mock_mode,
            feature_dim: None,
        }
    }

    /// Create a mock model for testing
    pub fn mock() -> Self {
        info!("Creating mock churn model");
        Self {
            model_path: "mock".to_string(),
            plan: None,
            loaded: true,
            mock_mode: true,
            feature_dim: None,
        }
    }

    /// Declare the feature dimension the transform pipeline produces
    pub fn with_feature_dim(mut self, dim: usize) -> Self {
        self.feature_dim = Some(dim);
        self
    }

    /// Load the ONNX artifact
    pub fn load(&mut self) -> Result<(), InferenceError> {
        if self.mock_mode {
            debug!("Mock mode: skipping model load");
            self.loaded = true;
            return Ok(());
        }

        let plan = tract_onnx::onnx()
            .model_for_path(&self.model_path)
            .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?
            .into_optimized()
            .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?
            .into_runnable()
            .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;

        self.plan = Some(plan);
        self.loaded = true;
        info!("Model loaded successfully");
        Ok(())
    }

    /// Continuous model output, one score per row
    pub async fn score(&self, features: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        if !self.loaded {
            return Err(InferenceError::ModelLoadError(
                "Model not loaded".to_string(),
            ));
        }
        if let Some(expected) = self.feature_dim {
            if features.ncols() != expected {
                return Err(InferenceError::InvalidInputShape {
                    expected,
                    actual: features.ncols(),
                });
            }
        }

        let start = std::time::Instant::now();
        let scores = match &self.plan {
            Some(plan) => self.run_plan(plan, features)?,
            None => self.mock_score(features),
        };
        debug!(
            rows = features.nrows(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Inference completed"
        );
        Ok(scores)
    }

    /// Binary churn decisions: threshold 0.5 on the continuous output
    pub async fn predict(&self, features: &Array2<f64>) -> Result<Vec<u8>, InferenceError> {
        let scores = self.score(features).await?;
        Ok(scores
            .into_iter()
            .map(|s| u8::from(s >= DECISION_THRESHOLD))
            .collect())
    }

    fn run_plan(
        &self,
        plan: &RunnablePlan,
        features: &Array2<f64>,
    ) -> Result<Vec<f64>, InferenceError> {
        let flat: Vec<f32> = features.iter().map(|v| *v as f32).collect();
        let input = tract_ndarray::Array2::from_shape_vec(
            (features.nrows(), features.ncols()),
            flat,
        )
        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
        .into_tensor();

        let outputs = plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        extract_scores(&outputs)
    }

    /// Deterministic stand-in scorer: logistic over the row mean
    fn mock_score(&self, features: &Array2<f64>) -> Vec<f64> {
        features
            .rows()
            .into_iter()
            .map(|row| {
                let mean = if row.is_empty() {
                    0.0
                } else {
                    row.sum() / row.len() as f64
                };
                1.0 / (1.0 + (-mean).exp())
            })
            .collect()
    }

    /// Whether the model is ready to score
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Artifact path
    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    /// Declared feature dimension, if any
    pub fn feature_dim(&self) -> Option<usize> {
        self.feature_dim
    }
}

/// Scores from the model's first output tensor; a model that yields no
/// outputs is an inference failure, not a panic
fn extract_scores(outputs: &[TValue]) -> Result<Vec<f64>, InferenceError> {
    let output = outputs.first().ok_or_else(|| {
        InferenceError::InferenceFailed("model produced no outputs".to_string())
    })?;
    let view = output
        .to_array_view::<f32>()
        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
    Ok(view.iter().map(|v| *v as f64).collect())
}
