use serde_json::Value;
use std::io::{self, Read};

use super::InputFormat;

/// Read a JSON or YAML document from stdin when input is piped.
/// Returns None if stdin is a TTY or carries no data.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = super::parse(trimmed, InputFormat::sniff(trimmed))?;
    Ok(Some(value))
}
