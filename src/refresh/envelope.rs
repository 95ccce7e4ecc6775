use serde_json::Value as JsonValue;

use crate::core::{EngineError, Record, Result};

const ENVELOPE_KEYS: [&str; 2] = ["items", "orders"];

/// Extract the record list from a list-endpoint response.
///
/// Accepts a bare array or an object wrapping the array under `items` or
/// `orders`.
pub fn records_from_response(body: JsonValue) -> Result<Vec<Record>> {
    match body {
        JsonValue::Array(items) => Ok(items.into_iter().map(Record::new).collect()),
        JsonValue::Object(mut map) => {
            for key in ENVELOPE_KEYS {
                if let Some(JsonValue::Array(items)) = map.remove(key) {
                    return Ok(items.into_iter().map(Record::new).collect());
                }
            }
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            Err(EngineError::UnexpectedResponse(format!(
                "object without an items/orders array (keys: {})",
                keys.join(", ")
            )))
        }
        other => Err(EngineError::UnexpectedResponse(format!(
            "expected an array or envelope, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
