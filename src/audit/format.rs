//! Value canonicalization for audit comparison and display
//!
//! Two values are considered equal for auditing purposes when their
//! formatted forms are equal, so `5` and `"5"` do not produce an entry.

use serde_json::Value;

/// Marker used for null, missing and empty-string values
pub const EMPTY_MARKER: &str = "(empty)";

/// Canonicalize a value for comparison and display
///
/// - `null` and `""` become [`EMPTY_MARKER`]
/// - booleans become `Yes` / `No`
/// - arrays and objects become compact JSON (object keys are sorted)
/// - numbers and strings are rendered as-is
pub fn format_for_display(value: &Value) -> String {
    match value {
        Value::Null => EMPTY_MARKER.to_string(),
        Value::String(s) if s.is_empty() => EMPTY_MARKER.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| EMPTY_MARKER.to_string())
        }
    }
}
