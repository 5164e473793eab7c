//! Categorical Schema

use crate::TransformError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One categorical field with its fixed, ordered list of allowed values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalField {
    /// Field name in the record set
    pub name: String,
    /// Allowed values, in indicator-column order
    pub values: Vec<String>,
}

/// Ordered mapping from categorical field to its allowed values.
///
/// Hand-specified rather than learned, loaded once per process, and shared
/// by training and serving so the indicator-column layout never drifts
/// between the two. Field order and value order are both significant: they
/// fix the expanded column order of every transform.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSchema {
    fields: Vec<CategoricalField>,
}

impl CategoricalSchema {
    /// Build a schema from ordered field definitions
    pub fn new(fields: Vec<CategoricalField>) -> Result<Self, TransformError> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(TransformError::InvalidCategoricalSchema(format!(
                    "field {} declared twice",
                    field.name
                )));
            }
            if field.values.is_empty() {
                return Err(TransformError::InvalidCategoricalSchema(format!(
                    "field {} has no allowed values",
                    field.name
                )));
            }
            for (j, value) in field.values.iter().enumerate() {
                if field.values[..j].contains(value) {
                    return Err(TransformError::InvalidCategoricalSchema(format!(
                        "field {} lists value {} twice",
                        field.name, value
                    )));
                }
            }
        }
        Ok(Self { fields })
    }

    /// Load from a JSON object `{field: [value, ...], ...}`.
    ///
    /// Document order of the object fixes field order.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TransformError> {
        let raw = std::fs::read_to_string(path)?;
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)?;

        let mut fields = Vec::with_capacity(object.len());
        for (name, values) in object {
            let values: Vec<String> = serde_json::from_value(values)?;
            fields.push(CategoricalField { name, values });
        }
        Self::new(fields)
    }

    /// Write the schema as `{field: [value, ...], ...}` in field order
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), TransformError> {
        let mut object = serde_json::Map::new();
        for field in &self.fields {
            object.insert(
                field.name.clone(),
                serde_json::to_value(&field.values)?,
            );
        }
        let raw = serde_json::to_string_pretty(&object)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Scheduled fields in declaration order
    pub fn fields(&self) -> &[CategoricalField] {
        &self.fields
    }

    /// Number of indicator columns the schema expands to
    pub fn expanded_width(&self) -> usize {
        self.fields.iter().map(|f| f.values.len()).sum()
    }

    /// Number of scheduled fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are scheduled
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, values: &[&str]) -> CategoricalField {
        CategoricalField {
            name: name.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_rejects_duplicate_field() {
        let result = CategoricalSchema::new(vec![
            field("asl_flag", &["N", "Y"]),
            field("asl_flag", &["Y", "N"]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_duplicate_value() {
        let result = CategoricalSchema::new(vec![field("kid0_2", &["U", "U"])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_empty_value_list() {
        let result = CategoricalSchema::new(vec![field("marital", &[])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_expanded_width() {
        let schema = CategoricalSchema::new(vec![
            field("new_cell", &["U", "Y", "N"]),
            field("asl_flag", &["N", "Y"]),
        ])
        .unwrap();
        assert_eq!(schema.expanded_width(), 5);
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let schema = CategoricalSchema::new(vec![
            field("new_cell", &["U", "Y", "N"]),
            field("asl_flag", &["N", "Y"]),
            field("refurb_new", &["N", "R"]),
        ])
        .unwrap();

        let path = std::env::temp_dir().join(format!("categories-{}.json", std::process::id()));
        schema.to_json_file(&path).unwrap();
        let loaded = CategoricalSchema::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(schema, loaded);
    }
}
