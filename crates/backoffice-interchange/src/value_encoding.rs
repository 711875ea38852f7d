//! Text encoding of cell values for export
//!
//! Every value has a text form, so a single odd cell never stops an export.

use backoffice_core::CellValue;

/// Text written to an export field for `value`.
///
/// - null is empty
/// - dates and timestamps are ISO 8601
/// - lists are their stringified items joined with `", "`
/// - JSON objects are compact JSON, or their `Display` form if that fails
pub fn stringify_value(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Text(s) => s.clone(),
        CellValue::Bool(_) | CellValue::Int(_) | CellValue::Float(_) => value.to_string(),
        CellValue::Date(_) | CellValue::DateTime(_) | CellValue::Timestamp(_) => {
            value.to_iso_string().unwrap_or_else(|| value.to_string())
        }
        CellValue::List(items) => items
            .iter()
            .map(stringify_value)
            .collect::<Vec<_>>()
            .join(", "),
        CellValue::Json(json) => stringify_json(json),
    }
}

fn stringify_json(json: &serde_json::Value) -> String {
    match json {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(stringify_json)
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Object(_) => {
            serde_json::to_string(json).unwrap_or_else(|_| json.to_string())
        }
    }
}
