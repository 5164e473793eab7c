//! Scale / Encode / Transform Operations

use crate::{CategoricalSchema, NumericScalingSchema, TransformError};
use record_set::{RecordSet, Value};
use tracing::debug;

/// Check that every schema-scheduled field is present before transforming.
///
/// Malformed input is rejected here with a typed error instead of failing
/// deep inside the numeric code.
pub fn validate_columns(
    records: &RecordSet,
    numeric: &NumericScalingSchema,
    categorical: &CategoricalSchema,
) -> Result<(), TransformError> {
    for (field, _) in numeric.fields() {
        if !records.has_column(field) {
            return Err(TransformError::SchemaMismatch {
                field: field.to_string(),
            });
        }
    }
    for field in categorical.fields() {
        if !records.has_column(&field.name) {
            return Err(TransformError::SchemaMismatch {
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

/// Standardize every scheduled numeric field in place: `(v - mean) / std`.
///
/// Must be applied exactly once per record set; repeated application would
/// scale already-scaled values.
pub fn scale(
    mut records: RecordSet,
    schema: &NumericScalingSchema,
) -> Result<RecordSet, TransformError> {
    for (field, stats) in schema.fields() {
        let Some(cells) = records.column_mut(field) else {
            return Err(TransformError::SchemaMismatch {
                field: field.to_string(),
            });
        };
        for (row, cell) in cells.enumerate() {
            let v = cell.as_number().ok_or_else(|| TransformError::NonNumericValue {
                field: field.to_string(),
                row,
            })?;
            *cell = Value::Number((v - stats.mean) / stats.std);
        }
    }
    Ok(records)
}

/// Expand every scheduled categorical field into indicator columns.
///
/// Each field is replaced by one `{field}_{value}` column per allowed
/// value, in schema value order; expansion blocks are appended after the
/// passthrough columns in schema field order. A value outside the allowed
/// list yields an all-zero block rather than an error.
pub fn encode(
    mut records: RecordSet,
    schema: &CategoricalSchema,
) -> Result<RecordSet, TransformError> {
    for field in schema.fields() {
        let raw = records
            .remove_column(&field.name)
            .map_err(|_| TransformError::SchemaMismatch {
                field: field.name.clone(),
            })?;

        for value in &field.values {
            let indicators = raw
                .iter()
                .map(|cell| {
                    let hit = cell.as_text() == Some(value.as_str());
                    Value::Number(if hit { 1.0 } else { 0.0 })
                })
                .collect();
            records.push_column(format!("{}_{}", field.name, value), indicators)?;
        }
    }
    Ok(records)
}

/// Full preprocessing contract: validate, scale, then encode.
///
/// Deterministic under fixed schemas; the training and serving paths both
/// call this and nothing else.
pub fn transform(
    records: RecordSet,
    numeric: &NumericScalingSchema,
    categorical: &CategoricalSchema,
) -> Result<RecordSet, TransformError> {
    validate_columns(&records, numeric, categorical)?;
    debug!(
        rows = records.num_rows(),
        numeric_fields = numeric.len(),
        categorical_fields = categorical.len(),
        "Transforming record set"
    );
    encode(scale(records, numeric)?, categorical)
}
