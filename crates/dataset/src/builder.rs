//! Train/Validation Dataset Construction

use crate::{load_csv, Dataset, DatasetError};
use feature_transform::{transform, CategoricalSchema, NumericScalingSchema};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use record_set::RecordSet;
use std::path::Path;
use tracing::info;

/// Split parameters for the train/validation partitioning
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Fraction of rows assigned to the validation partition
    pub validation_fraction: f64,
    /// Seed for the partition shuffle; fixed by default for reproducibility
    pub seed: u64,
    /// Name of the label column
    pub label_column: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            validation_fraction: 0.2,
            seed: 42,
            label_column: "churn".to_string(),
        }
    }
}

/// Output of a dataset build.
///
/// Carries the scaling schema fitted on the training partition so the
/// trainer can distribute it verbatim to serving instances.
#[derive(Debug)]
pub struct TrainValidation {
    pub train: Dataset,
    pub validation: Dataset,
    pub scaling_schema: NumericScalingSchema,
}

/// Builds train and validation datasets from raw tabular sources
pub struct DatasetBuilder {
    categorical: CategoricalSchema,
    split: SplitConfig,
}

impl DatasetBuilder {
    /// Create a builder with the given categorical schema and default split
    pub fn new(categorical: CategoricalSchema) -> Self {
        Self {
            categorical,
            split: SplitConfig::default(),
        }
    }

    /// Override the split parameters
    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    /// Load, concatenate, split, and transform the given CSV sources
    pub fn build(&self, sources: &[impl AsRef<Path>]) -> Result<TrainValidation, DatasetError> {
        if sources.is_empty() {
            return Err(DatasetError::EmptySourceList);
        }

        let mut merged: Option<RecordSet> = None;
        for source in sources {
            let path = source.as_ref();
            let records = load_csv(path)?;
            if !records.has_column(&self.split.label_column) {
                return Err(DatasetError::LabelColumnMissing {
                    column: self.split.label_column.clone(),
                    source_path: path.display().to_string(),
                });
            }
            match merged.as_mut() {
                None => merged = Some(records),
                Some(acc) => acc
                    .append(records)
                    .map_err(|e| DatasetError::SchemaMismatch(e.to_string()))?,
            }
        }

        // sources is non-empty, so merged is populated
        let merged = merged.ok_or(DatasetError::EmptySourceList)?;
        self.build_records(merged)
    }

    /// Split and transform an already-loaded record set.
    ///
    /// Scaling statistics are derived from the training partition only and
    /// reused for the validation partition, never recomputed from it.
    pub fn build_records(&self, records: RecordSet) -> Result<TrainValidation, DatasetError> {
        let (train_idx, validation_idx) = split_indices(records.num_rows(), &self.split)?;
        let train = records.take_rows(&train_idx)?;
        let validation = records.take_rows(&validation_idx)?;

        let scaling_schema =
            NumericScalingSchema::fit(&train, &[self.split.label_column.as_str()])?;

        let train = transform(train, &scaling_schema, &self.categorical)?;
        let validation = transform(validation, &scaling_schema, &self.categorical)?;

        let result = TrainValidation {
            train: package(train, &self.split.label_column)?,
            validation: package(validation, &self.split.label_column)?,
            scaling_schema,
        };
        info!(
            train_rows = result.train.len(),
            validation_rows = result.validation.len(),
            feature_dim = result.train.feature_dim(),
            "Built train/validation datasets"
        );
        Ok(result)
    }
}

/// Seeded partition of `0..num_rows` into (train, validation) indices.
///
/// Validation takes `round(num_rows * fraction)` rows; the same seed always
/// produces the same membership.
pub fn split_indices(
    num_rows: usize,
    config: &SplitConfig,
) -> Result<(Vec<usize>, Vec<usize>), DatasetError> {
    if !(config.validation_fraction > 0.0 && config.validation_fraction < 1.0) {
        return Err(DatasetError::InvalidFraction(config.validation_fraction));
    }

    let mut indices: Vec<usize> = (0..num_rows).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);

    let validation_len = (num_rows as f64 * config.validation_fraction).round() as usize;
    let validation = indices.split_off(indices.len() - validation_len.min(num_rows));
    Ok((indices, validation))
}

fn package(records: RecordSet, label_column: &str) -> Result<Dataset, DatasetError> {
    let labels = records
        .numeric_column(label_column)
        .ok_or_else(|| DatasetError::NonNumericLabel {
            column: label_column.to_string(),
        })?;

    let feature_columns: Vec<String> = records
        .columns()
        .iter()
        .filter(|c| c.as_str() != label_column)
        .cloned()
        .collect();

    let mut features = Array2::zeros((records.num_rows(), feature_columns.len()));
    for (j, column) in feature_columns.iter().enumerate() {
        match records.numeric_column(column) {
            Some(values) => {
                for (i, v) in values.into_iter().enumerate() {
                    features[[i, j]] = v;
                }
            }
            None => {
                let row = records
                    .column(column)
                    .and_then(|cells| cells.iter().position(|c| c.as_number().is_none()))
                    .unwrap_or(0);
                return Err(DatasetError::NonNumericFeature {
                    column: column.clone(),
                    row,
                });
            }
        }
    }

    Ok(Dataset::new(
        features,
        Array1::from(labels),
        feature_columns,
        label_column.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_transform::CategoricalField;
    use record_set::Value;
    use std::io::Write;

    fn categorical() -> CategoricalSchema {
        CategoricalSchema::new(vec![CategoricalField {
            name: "asl_flag".to_string(),
            values: vec!["N".to_string(), "Y".to_string()],
        }])
        .unwrap()
    }

    fn sample_records(rows: usize) -> RecordSet {
        let mut records = RecordSet::new(vec![
            "age".to_string(),
            "asl_flag".to_string(),
            "churn".to_string(),
        ])
        .unwrap();
        for i in 0..rows {
            records
                .push_row(vec![
                    Value::Number(20.0 + i as f64),
                    Value::Text(if i % 2 == 0 { "Y".into() } else { "N".into() }),
                    Value::Number((i % 2) as f64),
                ])
                .unwrap();
        }
        records
    }

    fn write_csv(dir: &Path, name: &str, rows: std::ops::Range<usize>) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "age,asl_flag,churn").unwrap();
        for i in rows {
            writeln!(file, "{},{},{}", 20 + i, if i % 2 == 0 { "Y" } else { "N" }, i % 2).unwrap();
        }
        path
    }

    fn temp_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("dataset-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_split_sizes_and_reproducibility() {
        let config = SplitConfig::default();
        let (train, validation) = split_indices(100, &config).unwrap();
        assert_eq!(train.len(), 80);
        assert_eq!(validation.len(), 20);

        let (train_again, validation_again) = split_indices(100, &config).unwrap();
        assert_eq!(train, train_again);
        assert_eq!(validation, validation_again);

        let other_seed = SplitConfig {
            seed: 7,
            ..SplitConfig::default()
        };
        let (_, other_validation) = split_indices(100, &other_seed).unwrap();
        assert_ne!(validation, other_validation);
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        let config = SplitConfig {
            validation_fraction: 1.5,
            ..SplitConfig::default()
        };
        assert!(matches!(
            split_indices(10, &config),
            Err(DatasetError::InvalidFraction(_))
        ));
    }

    #[test]
    fn test_build_from_two_files() {
        let dir = temp_dir();
        let a = write_csv(&dir, "a.csv", 0..60);
        let b = write_csv(&dir, "b.csv", 60..100);

        let builder = DatasetBuilder::new(categorical());
        let built = builder.build(&[&a, &b]).unwrap();

        assert_eq!(built.train.len(), 80);
        assert_eq!(built.validation.len(), 20);
        // age scaled + two indicator columns; churn is the label
        assert_eq!(
            built.train.feature_columns(),
            &["age", "asl_flag_N", "asl_flag_Y"]
        );
        assert_eq!(built.train.label_column(), "churn");

        // Same seed, same membership
        let again = builder.build(&[&a, &b]).unwrap();
        assert_eq!(built.train.labels(), again.train.labels());
        assert_eq!(built.scaling_schema, again.scaling_schema);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_source_list() {
        let builder = DatasetBuilder::new(categorical());
        let sources: [&Path; 0] = [];
        assert!(matches!(
            builder.build(&sources),
            Err(DatasetError::EmptySourceList)
        ));
    }

    #[test]
    fn test_label_column_missing() {
        let dir = temp_dir();
        let path = dir.join("nolabel.csv");
        std::fs::write(&path, "age,asl_flag\n30,Y\n").unwrap();

        let builder = DatasetBuilder::new(categorical());
        assert!(matches!(
            builder.build(&[&path]),
            Err(DatasetError::LabelColumnMissing { .. })
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_sources_must_share_columns() {
        let dir = temp_dir();
        let a = write_csv(&dir, "a.csv", 0..5);
        let other = dir.join("other.csv");
        std::fs::write(&other, "age,state,churn\n30,OH,0\n").unwrap();

        let builder = DatasetBuilder::new(categorical());
        assert!(matches!(
            builder.build(&[&a, &other]),
            Err(DatasetError::SchemaMismatch(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_validation_rows_do_not_affect_scaling_schema() {
        let config = SplitConfig::default();
        let records = sample_records(100);

        let builder = DatasetBuilder::new(categorical());
        let baseline = builder.build_records(records.clone()).unwrap();

        // Perturb only rows that land in the validation partition
        let (_, validation_idx) = split_indices(100, &config).unwrap();
        let validation_set: std::collections::HashSet<usize> =
            validation_idx.iter().copied().collect();
        let mut perturbed = records;
        if let Some(cells) = perturbed.column_mut("age") {
            for (row, cell) in cells.enumerate() {
                if validation_set.contains(&row) {
                    *cell = Value::Number(9_999.0);
                }
            }
        }
        let shifted = builder.build_records(perturbed).unwrap();

        assert_eq!(baseline.scaling_schema, shifted.scaling_schema);
    }

    #[test]
    fn test_degenerate_training_column_aborts_build() {
        let mut records = RecordSet::new(vec![
            "flat".to_string(),
            "asl_flag".to_string(),
            "churn".to_string(),
        ])
        .unwrap();
        for i in 0..50 {
            records
                .push_row(vec![
                    Value::Number(1.0),
                    Value::Text("Y".into()),
                    Value::Number((i % 2) as f64),
                ])
                .unwrap();
        }

        let builder = DatasetBuilder::new(categorical());
        let result = builder.build_records(records);
        assert!(matches!(
            result,
            Err(DatasetError::Transform(
                feature_transform::TransformError::DegenerateScale { .. }
            ))
        ));
    }

    proptest::proptest! {
        #[test]
        fn prop_split_partitions_are_disjoint_and_exhaustive(
            num_rows in 1usize..500,
            fraction in 0.01f64..0.99,
            seed in proptest::num::u64::ANY,
        ) {
            let config = SplitConfig {
                validation_fraction: fraction,
                seed,
                label_column: "churn".to_string(),
            };
            let (train, validation) = split_indices(num_rows, &config).unwrap();

            proptest::prop_assert_eq!(train.len() + validation.len(), num_rows);
            let mut all: Vec<usize> = train.iter().chain(&validation).copied().collect();
            all.sort_unstable();
            let expected: Vec<usize> = (0..num_rows).collect();
            proptest::prop_assert_eq!(all, expected);
        }
    }

    #[test]
    fn test_scaled_features_use_training_statistics() {
        let records = sample_records(100);
        let builder = DatasetBuilder::new(categorical());
        let built = builder.build_records(records.clone()).unwrap();

        // Reconstruct the expected scaled value of the first validation row
        let (_, validation_idx) = split_indices(100, &SplitConfig::default()).unwrap();
        let first = validation_idx[0];
        let raw_age = records.value(first, "age").unwrap().as_number().unwrap();
        let stats = built.scaling_schema.get("age").unwrap();
        let expected = (raw_age - stats.mean) / stats.std;

        let (features, _) = built.validation.get(0).unwrap();
        assert!((features[0] - expected).abs() < 1e-12);
    }
}
