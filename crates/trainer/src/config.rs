//! Trainer Configuration

use serde::Deserialize;

/// Training run configuration, from defaults plus `CHURN_TRAINER_*`
/// environment overrides
#[derive(Debug, Clone, Deserialize)]
pub struct TrainerConfig {
    /// Directory the raw CSV sources live in (or are synced into)
    pub data_root: String,
    /// Remote store root to sync from before building; skipped when unset
    #[serde(default)]
    pub store_root: Option<String>,
    /// Previous commit for a diff-based sync; full sync when unset
    #[serde(default)]
    pub since_commit: Option<String>,
    /// Path to the shared categorical schema
    pub categories_path: String,
    /// Where the fitted scaling schema is written for distribution
    pub numscale_out: String,
    /// Where the training feature-column order is written for serving
    pub features_out: String,
    /// Fraction of rows held out for validation
    pub validation_fraction: f64,
    /// Split seed
    pub seed: u64,
    /// Label column name
    pub label_column: String,
}

impl TrainerConfig {
    /// Load configuration from defaults and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("data_root", "data")?
            .set_default("categories_path", "config/categories.json")?
            .set_default("numscale_out", "config/numscale.json")?
            .set_default("features_out", "config/feature_columns.json")?
            .set_default("validation_fraction", 0.2)?
            .set_default("seed", 42)?
            .set_default("label_column", "churn")?
            .add_source(config::Environment::with_prefix("CHURN_TRAINER"))
            .build()?
            .try_deserialize()
    }
}
