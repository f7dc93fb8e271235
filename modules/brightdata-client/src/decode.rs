// Lenient body decoding. The snapshot endpoint sometimes answers with
// newline-delimited JSON or with a JSON object wrapped in stray text.

use serde_json::Value;

use crate::error::{BrightDataError, Result};

/// Decode a response body: whole JSON, else NDJSON lines, else the outermost `{...}` slice.
pub fn decode_body(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    if let Some(lines) = decode_lines(trimmed) {
        return Ok(Value::Array(lines));
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return serde_json::from_str(&trimmed[start..=end]).map_err(Into::into);
        }
    }

    Err(BrightDataError::Parse(format!(
        "body is not JSON ({} bytes)",
        text.len()
    )))
}

fn decode_lines(text: &str) -> Option<Vec<Value>> {
    let mut values = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        values.push(serde_json::from_str::<Value>(line).ok()?);
    }
    (values.len() > 1).then_some(values)
}
