// Flat tabular projection of snapshot records.

use brightdata_client::SnapshotRecord;
use serde_json::Value;

use super::WriteError;

/// Column set: the first record's keys, in order.
pub fn header(records: &[SnapshotRecord]) -> Vec<&str> {
    records
        .first()
        .map(|first| first.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Render one cell. Strings verbatim, null or missing as empty, nested values as compact JSON.
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// CSV bytes with a header row. Empty input gives empty output.
pub fn to_csv(records: &[SnapshotRecord]) -> Result<Vec<u8>, WriteError> {
    let columns = header(records);
    if columns.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|key| cell(record.get(*key))))?;
    }
    writer.into_inner().map_err(|e| WriteError::Io(e.into_error()))
}
