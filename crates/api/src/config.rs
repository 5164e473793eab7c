//! API Configuration

use serde::Deserialize;

/// Server configuration, from defaults plus `CHURN_API_*` environment
/// overrides
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Bind address
    pub bind_addr: String,
    /// Path to the shared `numscale.json` scaling schema
    pub numscale_path: String,
    /// Path to the shared categorical schema
    pub categories_path: String,
    /// Path to the training feature-column order
    pub feature_order_path: String,
    /// Path to the model artifact
    pub model_path: String,
    /// Label column serving clients may echo; dropped before transform
    pub label_column: String,
}

impl ApiConfig {
    /// Load configuration from defaults and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("numscale_path", "config/numscale.json")?
            .set_default("categories_path", "config/categories.json")?
            .set_default("feature_order_path", "config/feature_columns.json")?
            .set_default("model_path", "model/churn.onnx")?
            .set_default("label_column", "churn")?
            .add_source(config::Environment::with_prefix("CHURN_API"))
            .build()?
            .try_deserialize()
    }
}
