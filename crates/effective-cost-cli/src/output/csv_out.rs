use serde_json::{Map, Value};
use std::io;

use super::scalar;

/// Write output as CSV to stdout.
///
/// Scalar result fields become `field,value` rows; a dated `schedule`
/// follows as its own header and rows.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in map {
                if key == "schedule" {
                    continue;
                }
                let _ = wtr.write_record([key.as_str(), &scalar(val)]);
            }
            if let Some(Value::Array(rows)) = map.get("schedule") {
                write_rows(&mut wtr, rows);
            }
        }
        Value::Array(rows) => write_rows(&mut wtr, rows),
        _ => {
            let _ = wtr.write_record([scalar(result)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for row in rows.iter().filter_map(Value::as_object) {
        let _ = wtr.write_record(cells(row, &headers));
    }
}

fn cells(row: &Map<String, Value>, headers: &[&str]) -> Vec<String> {
    headers
        .iter()
        .map(|h| row.get(*h).map(scalar).unwrap_or_default())
        .collect()
}
