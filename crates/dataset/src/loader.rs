//! CSV Source Loading

use crate::DatasetError;
use record_set::{RecordSet, Value};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Load one CSV file into a record set.
///
/// The header row fixes the column order; each cell becomes a numeric
/// value when it parses as one, otherwise a text value.
pub fn load_csv(path: impl AsRef<Path>) -> Result<RecordSet, DatasetError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records = load_csv_reader(file, &path.display().to_string())?;
    debug!(
        path = %path.display(),
        rows = records.num_rows(),
        columns = records.columns().len(),
        "Loaded CSV source"
    );
    Ok(records)
}

/// Load CSV content from any reader (e.g. bytes fetched from a remote
/// store); `name` is used in error messages only.
pub fn load_csv_reader(reader: impl Read, name: &str) -> Result<RecordSet, DatasetError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| DatasetError::Csv {
            path: name.to_string(),
            source,
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut records = RecordSet::new(headers)
        .map_err(|e| DatasetError::SchemaMismatch(e.to_string()))?;

    for record in csv_reader.records() {
        let record = record.map_err(|source| DatasetError::Csv {
            path: name.to_string(),
            source,
        })?;
        let row = record.iter().map(parse_cell).collect();
        records
            .push_row(row)
            .map_err(|e| DatasetError::SchemaMismatch(e.to_string()))?;
    }
    Ok(records)
}

fn parse_cell(raw: &str) -> Value {
    match raw.parse::<f64>() {
        Ok(n) => Value::Number(n),
        Err(_) => Value::Text(raw.to_string()),
    }
}
