use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::scalar;

/// Format output as tables: result fields first, then the dated schedule,
/// warnings and methodology.
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{}", scalar(value));
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => print_result(result),
        Some(other) => println!("{}", scalar(other)),
        None => print_fields(envelope),
    }

    if let Some(Value::Object(search)) = envelope.get("search") {
        println!();
        print_fields(search);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_result(result: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in result {
        if key == "schedule" {
            continue;
        }
        builder.push_record([key.as_str(), &cell(val)]);
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Array(schedule)) = result.get("schedule") {
        if !schedule.is_empty() {
            println!("\nSchedule:");
            print_schedule(schedule);
        }
    }
}

fn print_schedule(rows: &[Value]) {
    let mut builder = Builder::default();
    builder.push_record(["#", "Due date", "Days", "Year fraction"]);
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            ["index", "due_date", "days", "year_fraction"]
                .map(|k| row.get(k).map(scalar).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &cell(val)]);
    }
    println!("{}", Table::from(builder));
}

/// Search outcomes render as `outcome (k=v, ...)`; everything else as a scalar.
fn cell(value: &Value) -> String {
    if let Value::Object(map) = value {
        if let Some(Value::String(outcome)) = map.get("outcome") {
            let details: Vec<String> = map
                .iter()
                .filter(|(k, _)| k.as_str() != "outcome")
                .map(|(k, v)| format!("{}={}", k, scalar(v)))
                .collect();
            return format!("{} ({})", outcome, details.join(", "));
        }
    }
    scalar(value)
}
