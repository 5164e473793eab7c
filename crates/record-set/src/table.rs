//! Record Set Implementation

use crate::{RecordSetError, Value};
use serde::{Deserialize, Serialize};

/// Tabular collection of rows sharing a schema.
///
/// Column order is significant and preserved by every operation; each row
/// holds exactly one cell per declared column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RecordSet {
    /// Create an empty record set with the given column order
    pub fn new(columns: Vec<String>) -> Result<Self, RecordSetError> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(RecordSetError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Build a record set from JSON objects, one per record.
    ///
    /// The first record fixes the column order; every later record must
    /// carry exactly the same fields.
    pub fn from_records(
        records: &[serde_json::Map<String, serde_json::Value>],
    ) -> Result<Self, RecordSetError> {
        let columns: Vec<String> = match records.first() {
            Some(first) => first.keys().cloned().collect(),
            None => Vec::new(),
        };
        let mut set = Self::new(columns)?;

        for (row_no, record) in records.iter().enumerate() {
            if record.len() != set.columns.len() {
                return Err(RecordSetError::RowLength {
                    expected: set.columns.len(),
                    actual: record.len(),
                });
            }
            let mut row = Vec::with_capacity(set.columns.len());
            for column in &set.columns {
                let cell = record
                    .get(column)
                    .ok_or_else(|| RecordSetError::UnknownColumn(column.clone()))?;
                row.push(convert_json(cell, column, row_no)?);
            }
            set.rows.push(row);
        }
        Ok(set)
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether the set has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether a column is present
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row matching the declared columns
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), RecordSetError> {
        if row.len() != self.columns.len() {
            return Err(RecordSetError::RowLength {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Cell at (row, column name)
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Full row as a slice of cells
    pub fn row(&self, row: usize) -> Option<&[Value]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    /// All cells of a column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Numeric view of a column; `None` if the column is missing or any
    /// cell is non-numeric
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        self.rows.iter().map(|r| r[idx].as_number()).collect()
    }

    /// Mutable iterator over one column's cells, in row order
    pub fn column_mut(&mut self, name: &str) -> Option<impl Iterator<Item = &mut Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter_mut().map(move |r| &mut r[idx]))
    }

    /// Row-wise union with another record set.
    ///
    /// The other set must carry exactly the same column set; its rows are
    /// re-ordered to this set's column order if needed.
    pub fn append(&mut self, other: RecordSet) -> Result<(), RecordSetError> {
        if self.columns.len() != other.columns.len() {
            return Err(RecordSetError::ColumnSetMismatch(format!(
                "{} columns vs {}",
                self.columns.len(),
                other.columns.len()
            )));
        }
        let mapping: Vec<usize> = self
            .columns
            .iter()
            .map(|c| {
                other
                    .column_index(c)
                    .ok_or_else(|| RecordSetError::ColumnSetMismatch(format!("missing column {c}")))
            })
            .collect::<Result<_, _>>()?;

        let identity = mapping.iter().enumerate().all(|(i, &j)| i == j);
        if identity {
            self.rows.extend(other.rows);
        } else {
            for row in other.rows {
                self.rows
                    .push(mapping.iter().map(|&j| row[j].clone()).collect());
            }
        }
        Ok(())
    }

    /// New record set holding the given rows, densely re-indexed from 0
    pub fn take_rows(&self, indices: &[usize]) -> Result<RecordSet, RecordSetError> {
        let mut rows = Vec::with_capacity(indices.len());
        for &i in indices {
            let row = self
                .rows
                .get(i)
                .ok_or(RecordSetError::RowOutOfBounds(i))?;
            rows.push(row.clone());
        }
        Ok(RecordSet {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Remove a column, returning its cells in row order
    pub fn remove_column(&mut self, name: &str) -> Result<Vec<Value>, RecordSetError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| RecordSetError::UnknownColumn(name.to_string()))?;
        self.columns.remove(idx);
        Ok(self.rows.iter_mut().map(|r| r.remove(idx)).collect())
    }

    /// Attach a new column at the end
    pub fn push_column(&mut self, name: String, values: Vec<Value>) -> Result<(), RecordSetError> {
        if self.columns.contains(&name) {
            return Err(RecordSetError::DuplicateColumn(name));
        }
        if values.len() != self.rows.len() {
            return Err(RecordSetError::ColumnLength {
                column: name,
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        self.columns.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }
}

fn convert_json(
    cell: &serde_json::Value,
    column: &str,
    row: usize,
) -> Result<Value, RecordSetError> {
    match cell {
        serde_json::Value::Number(n) => {
            n.as_f64()
                .map(Value::Number)
                .ok_or_else(|| RecordSetError::UnsupportedValue {
                    column: column.to_string(),
                    row,
                })
        }
        serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
        _ => Err(RecordSetError::UnsupportedValue {
            column: column.to_string(),
            row,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordSet {
        let mut set = RecordSet::new(vec!["age".to_string(), "area".to_string()]).unwrap();
        set.push_row(vec![Value::Number(30.0), Value::Text("OHIO AREA".into())])
            .unwrap();
        set.push_row(vec![Value::Number(40.0), Value::Text("DALLAS AREA".into())])
            .unwrap();
        set
    }

    #[test]
    fn test_construction_rejects_duplicate_columns() {
        let result = RecordSet::new(vec!["a".to_string(), "a".to_string()]);
        assert!(matches!(result, Err(RecordSetError::DuplicateColumn(_))));
    }

    #[test]
    fn test_push_row_length_check() {
        let mut set = sample();
        let result = set.push_row(vec![Value::Number(1.0)]);
        assert!(matches!(result, Err(RecordSetError::RowLength { .. })));
    }

    #[test]
    fn test_numeric_column() {
        let set = sample();
        assert_eq!(set.numeric_column("age"), Some(vec![30.0, 40.0]));
        assert_eq!(set.numeric_column("area"), None);
        assert_eq!(set.numeric_column("missing"), None);
    }

    #[test]
    fn test_append_reorders_columns() {
        let mut set = sample();
        let mut other = RecordSet::new(vec!["area".to_string(), "age".to_string()]).unwrap();
        other
            .push_row(vec![Value::Text("OHIO AREA".into()), Value::Number(50.0)])
            .unwrap();
        set.append(other).unwrap();

        assert_eq!(set.num_rows(), 3);
        assert_eq!(set.value(2, "age"), Some(&Value::Number(50.0)));
    }

    #[test]
    fn test_append_rejects_disagreeing_columns() {
        let mut set = sample();
        let other = RecordSet::new(vec!["age".to_string(), "state".to_string()]).unwrap();
        let result = set.append(other);
        assert!(matches!(result, Err(RecordSetError::ColumnSetMismatch(_))));
    }

    #[test]
    fn test_take_rows_reindexes() {
        let set = sample();
        let taken = set.take_rows(&[1]).unwrap();
        assert_eq!(taken.num_rows(), 1);
        assert_eq!(taken.value(0, "age"), Some(&Value::Number(40.0)));
        assert!(set.take_rows(&[5]).is_err());
    }

    #[test]
    fn test_remove_and_push_column() {
        let mut set = sample();
        let removed = set.remove_column("area").unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!set.has_column("area"));

        set.push_column(
            "area_OHIO AREA".to_string(),
            vec![Value::Number(1.0), Value::Number(0.0)],
        )
        .unwrap();
        assert_eq!(set.columns(), &["age", "area_OHIO AREA"]);
    }

    #[test]
    fn test_from_records_keeps_first_record_order() {
        let json = r#"[
            {"age": 30, "asl_flag": "Y"},
            {"age": 41.5, "asl_flag": "N"}
        ]"#;
        let records: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(json).unwrap();
        let set = RecordSet::from_records(&records).unwrap();

        assert_eq!(set.columns(), &["age", "asl_flag"]);
        assert_eq!(set.value(1, "age"), Some(&Value::Number(41.5)));
        assert_eq!(set.value(0, "asl_flag"), Some(&Value::Text("Y".into())));
    }

    #[test]
    fn test_from_records_rejects_nested_values() {
        let json = r#"[{"age": [1, 2]}]"#;
        let records: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(json).unwrap();
        let result = RecordSet::from_records(&records);
        assert!(matches!(
            result,
            Err(RecordSetError::UnsupportedValue { .. })
        ));
    }
}
