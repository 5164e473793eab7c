//! Churn Prediction API Server
//!
//! REST serving surface: accepts batches of raw records, preprocesses them
//! with the shared schemas, and returns one binary churn decision per
//! record.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
    routing::{get, post},
    Json, Router,
};
use axum::extract::State;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod routes;

pub use crate::config::ApiConfig;

use feature_transform::{CategoricalSchema, NumericScalingSchema, TransformError};
use inference_engine::ChurnModel;

/// Application state shared across handlers.
///
/// Schemas and model are built once at startup and never mutated, so
/// handlers share them read-only.
pub struct AppState {
    /// Standardization statistics, identical to the training run's
    pub numeric: NumericScalingSchema,
    /// One-hot expansion layout shared with training
    pub categorical: CategoricalSchema,
    /// The opaque model artifact
    pub model: ChurnModel,
    /// Training feature-column order; the serving matrix is rebuilt in
    /// this order regardless of client key order
    pub feature_order: Option<Vec<String>>,
    /// Label column dropped from serving input when clients echo it
    pub label_column: String,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Load schemas and model per the given configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let numeric = NumericScalingSchema::from_json_file(&config.numscale_path)?;
        let categorical = CategoricalSchema::from_json_file(&config.categories_path)?;

        let feature_order = match std::fs::read_to_string(&config.feature_order_path) {
            Ok(raw) => Some(
                serde_json::from_str::<Vec<String>>(&raw)
                    .map_err(|e| ApiError::Startup(format!("feature order file: {e}")))?,
            ),
            Err(_) => {
                warn!(
                    "Feature order file {} not found; using request column order",
                    config.feature_order_path
                );
                None
            }
        };

        let feature_dim = numeric.len() + categorical.expanded_width();
        let mut model = ChurnModel::new(&config.model_path).with_feature_dim(feature_dim);
        model
            .load()
            .map_err(|e| ApiError::Startup(e.to_string()))?;

        Ok(Self {
            numeric,
            categorical,
            model,
            feature_order,
            label_column: config.label_column.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        })
    }
}

/// Errors surfaced by the API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request carried no records
    #[error("empty record batch")]
    EmptyBatch,

    /// Records could not be assembled into a table
    #[error("malformed records: {0}")]
    BadRecords(String),

    /// Preprocessing rejected the batch
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Model failure
    #[error(transparent)]
    Inference(#[from] inference_engine::InferenceError),

    /// Startup failure (schema/model loading)
    #[error("startup failed: {0}")]
    Startup(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::EmptyBatch => StatusCode::BAD_REQUEST,
            ApiError::BadRecords(_) | ApiError::Transform(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(_) | ApiError::Startup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ResponseJson(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_loaded: bool,
    pub feature_dim: Option<usize>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/predict", post(routes::predict::predict))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model_loaded: state.model.is_loaded(),
        feature_dim: state.model.feature_dim(),
    })
}

/// Initialize logging
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Run the server
pub async fn run_server(config: ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = create_router(state);

    info!("Starting churn API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
