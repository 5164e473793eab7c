//! Prediction Route

use axum::{extract::State, Json};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::{ApiError, AppState};
use feature_transform::transform;
use record_set::RecordSet;

/// Batch of raw records to score.
///
/// Field order of the first record fixes the table's column order.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub records: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// One binary decision per input record, in request order
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predictions: Vec<u8>,
    pub count: usize,
}

/// Score a batch of raw records
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    if request.records.is_empty() {
        return Err(ApiError::EmptyBatch);
    }

    let mut records =
        RecordSet::from_records(&request.records).map_err(|e| ApiError::BadRecords(e.to_string()))?;

    // Clients replaying training rows may include the label; it is not a
    // feature, so drop it before transforming.
    if records.has_column(&state.label_column) {
        records
            .remove_column(&state.label_column)
            .map_err(|e| ApiError::BadRecords(e.to_string()))?;
    }

    let transformed = transform(records, &state.numeric, &state.categorical)?;
    let features = to_matrix(&transformed, state.feature_order.as_deref())?;

    let predictions = state.model.predict(&features).await?;
    info!(count = predictions.len(), "Scored record batch");

    Ok(Json(PredictResponse {
        count: predictions.len(),
        predictions,
    }))
}

/// Dense feature matrix from a fully transformed record set.
///
/// When a training feature order is given, matrix columns follow it so the
/// model always sees the layout it was trained on; otherwise the transformed
/// set's own column order is used.
fn to_matrix(records: &RecordSet, order: Option<&[String]>) -> Result<Array2<f64>, ApiError> {
    let columns: Vec<String> = match order {
        Some(order) => order.to_vec(),
        None => records.columns().to_vec(),
    };
    let mut matrix = Array2::zeros((records.num_rows(), columns.len()));
    for (j, column) in columns.iter().enumerate() {
        let values = records.numeric_column(column).ok_or_else(|| {
            ApiError::BadRecords(format!(
                "column {column} is missing or non-numeric after preprocessing"
            ))
        })?;
        for (i, v) in values.into_iter().enumerate() {
            matrix[[i, j]] = v;
        }
    }
    Ok(matrix)
}
