//! Numeric Scaling Schema

use crate::TransformError;
use record_set::RecordSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Standardization statistics for one numeric field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Mean of the reference training set
    pub mean: f64,
    /// Standard deviation of the reference training set
    pub std: f64,
}

/// Per-field (mean, std) mapping used for standardization.
///
/// Computed once from a reference training set, then distributed verbatim
/// (`numscale.json`) to every serving instance. Immutable after
/// construction; a zero or non-finite standard deviation is rejected here
/// rather than surfacing later as NaN features.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericScalingSchema {
    fields: BTreeMap<String, FieldStats>,
}

impl NumericScalingSchema {
    /// Build a schema from precomputed statistics
    pub fn from_stats(fields: BTreeMap<String, FieldStats>) -> Result<Self, TransformError> {
        for (field, stats) in &fields {
            if stats.std == 0.0 || !stats.std.is_finite() || !stats.mean.is_finite() {
                return Err(TransformError::DegenerateScale {
                    field: field.clone(),
                });
            }
        }
        Ok(Self { fields })
    }

    /// Derive statistics from a reference record set.
    ///
    /// Every fully-numeric column is included except those named in
    /// `exclude` (the label column). Fails with `DegenerateScale` if any
    /// included column has zero variance.
    pub fn fit(records: &RecordSet, exclude: &[&str]) -> Result<Self, TransformError> {
        if records.is_empty() {
            return Err(TransformError::EmptyRecordSet);
        }

        let mut fields = BTreeMap::new();
        for column in records.columns() {
            if exclude.contains(&column.as_str()) {
                continue;
            }
            let Some(values) = records.numeric_column(column) else {
                continue;
            };

            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();

            if std == 0.0 {
                return Err(TransformError::DegenerateScale {
                    field: column.clone(),
                });
            }
            fields.insert(column.clone(), FieldStats { mean, std });
        }

        debug!("Fitted scaling schema over {} numeric fields", fields.len());
        Self::from_stats(fields)
    }

    /// Load the shared `numscale.json` mapping `{field: {"mean": f, "std": f}}`
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TransformError> {
        let raw = std::fs::read_to_string(path)?;
        let fields: BTreeMap<String, FieldStats> = serde_json::from_str(&raw)?;
        Self::from_stats(fields)
    }

    /// Write the schema in the shared `numscale.json` format
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), TransformError> {
        let raw = serde_json::to_string_pretty(&self.fields)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Statistics for one field
    pub fn get(&self, field: &str) -> Option<&FieldStats> {
        self.fields.get(field)
    }

    /// Iterate fields with their statistics
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldStats)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields in the schema
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema covers no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransformError;
    use record_set::Value;

    fn stats(mean: f64, std: f64) -> FieldStats {
        FieldStats { mean, std }
    }

    #[test]
    fn test_from_stats_rejects_zero_std() {
        let mut fields = BTreeMap::new();
        fields.insert("age".to_string(), stats(30.0, 0.0));
        let result = NumericScalingSchema::from_stats(fields);
        assert!(matches!(
            result,
            Err(TransformError::DegenerateScale { field }) if field == "age"
        ));
    }

    #[test]
    fn test_from_stats_rejects_non_finite() {
        let mut fields = BTreeMap::new();
        fields.insert("age".to_string(), stats(f64::NAN, 1.0));
        assert!(NumericScalingSchema::from_stats(fields).is_err());
    }

    #[test]
    fn test_fit_excludes_label_and_text_columns() {
        let mut records = RecordSet::new(vec![
            "age".to_string(),
            "asl_flag".to_string(),
            "churn".to_string(),
        ])
        .unwrap();
        records
            .push_row(vec![
                Value::Number(20.0),
                Value::Text("Y".into()),
                Value::Number(0.0),
            ])
            .unwrap();
        records
            .push_row(vec![
                Value::Number(40.0),
                Value::Text("N".into()),
                Value::Number(1.0),
            ])
            .unwrap();

        let schema = NumericScalingSchema::fit(&records, &["churn"]).unwrap();
        assert_eq!(schema.len(), 1);
        let age = schema.get("age").unwrap();
        assert_eq!(age.mean, 30.0);
        assert_eq!(age.std, 10.0);
    }

    #[test]
    fn test_fit_rejects_constant_column() {
        let mut records = RecordSet::new(vec!["flat".to_string()]).unwrap();
        records.push_row(vec![Value::Number(5.0)]).unwrap();
        records.push_row(vec![Value::Number(5.0)]).unwrap();

        let result = NumericScalingSchema::fit(&records, &[]);
        assert!(matches!(
            result,
            Err(TransformError::DegenerateScale { field }) if field == "flat"
        ));
    }

    #[test]
    fn test_fit_rejects_empty_record_set() {
        let records = RecordSet::new(vec!["age".to_string()]).unwrap();
        assert!(matches!(
            NumericScalingSchema::fit(&records, &[]),
            Err(TransformError::EmptyRecordSet)
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let mut fields = BTreeMap::new();
        fields.insert("age".to_string(), stats(30.0, 10.0));
        let schema = NumericScalingSchema::from_stats(fields).unwrap();

        let path = std::env::temp_dir().join(format!("numscale-{}.json", std::process::id()));
        schema.to_json_file(&path).unwrap();
        let loaded = NumericScalingSchema::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(schema, loaded);
    }
}
