use serde_json::Value;

use super::{describe_rate, scalar};

/// Rate fields printed by `--output minimal`, in order.
const RATE_KEYS: [&str; 2] = ["monthly", "annual"];

/// Print just the rates: a bare value for single-rate output, or one
/// `label: value` line per rate for the full report.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(rate) = describe_rate(result) {
        println!("{}", rate);
        return;
    }

    if let Value::Object(map) = result {
        let mut printed = false;
        for key in RATE_KEYS {
            if let Some(rate) = map.get(key).and_then(describe_rate) {
                println!("{}: {}", key, rate);
                printed = true;
            }
        }
        if printed {
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar(val));
            return;
        }
    }

    println!("{}", scalar(result));
}
