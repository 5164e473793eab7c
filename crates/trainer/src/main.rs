//! Churn Trainer - Main Entry Point
//!
//! Syncs raw CSVs from the data repository, builds train/validation
//! datasets, and exports the fitted scaling schema for the serving fleet.

mod config;

use anyhow::Context;
use crate::config::TrainerConfig;
use data_sync::{sync_to, LocalStore};
use dataset::{DatasetBuilder, SplitConfig};
use feature_transform::CategoricalSchema;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("=== Churn Trainer v{} ===", env!("CARGO_PKG_VERSION"));

    let config = TrainerConfig::load().context("loading trainer configuration")?;
    let data_root = PathBuf::from(&config.data_root);

    if let Some(store_root) = &config.store_root {
        let store = LocalStore::new(store_root);
        let written = sync_to(&store, &data_root, config.since_commit.as_deref())
            .await
            .context("syncing data repository")?;
        info!(files = written.len(), "Data repository synced");
    }

    let sources = collect_csv_sources(&data_root)
        .with_context(|| format!("scanning {} for CSV sources", data_root.display()))?;
    info!(sources = sources.len(), "Collected raw sources");

    let categorical = CategoricalSchema::from_json_file(&config.categories_path)
        .context("loading categorical schema")?;
    let split = SplitConfig {
        validation_fraction: config.validation_fraction,
        seed: config.seed,
        label_column: config.label_column.clone(),
    };

    let built = DatasetBuilder::new(categorical)
        .with_split(split)
        .build(&sources)
        .context("building datasets")?;

    info!(
        train_rows = built.train.len(),
        validation_rows = built.validation.len(),
        feature_dim = built.train.feature_dim(),
        "Datasets ready"
    );

    if let Some(parent) = Path::new(&config.numscale_out).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    built
        .scaling_schema
        .to_json_file(&config.numscale_out)
        .context("writing scaling schema")?;
    info!("Wrote scaling schema to {}", config.numscale_out);

    // Serving rebuilds the matrix in this exact column order, independent
    // of the key order clients send.
    let features_out = Path::new(&config.features_out);
    if let Some(parent) = features_out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let feature_order = serde_json::to_string_pretty(built.train.feature_columns())
        .context("serializing feature order")?;
    std::fs::write(features_out, feature_order)
        .with_context(|| format!("writing {}", features_out.display()))?;
    info!("Wrote feature column order to {}", config.features_out);

    Ok(())
}

/// All `.csv` files under `root`, recursively, in sorted order
fn collect_csv_sources(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "csv") {
                sources.push(path);
            }
        }
    }
    sources.sort();
    Ok(sources)
}
