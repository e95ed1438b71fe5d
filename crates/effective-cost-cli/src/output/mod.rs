pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a serialised `RateResult` (`{"status": "found", "rate": "1.963"}`)
/// as text. Returns None for any other shape.
pub fn describe_rate(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    match map.get("status")?.as_str()? {
        "found" => map.get("rate").map(|r| format!("{}%", scalar(r))),
        "not_found" => Some("not found".to_string()),
        _ => None,
    }
}

/// Render a scalar cell, falling back to compact JSON for nested values.
pub fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => describe_rate(value).unwrap_or_else(|| serde_json::to_string(value).unwrap_or_default()),
    }
}
