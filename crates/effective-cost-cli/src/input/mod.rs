pub mod file;
pub mod stdin;

use serde_json::Value;

/// Input document formats accepted from files and stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    /// Pick a format from a file extension; anything but `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                InputFormat::Yaml
            }
            _ => InputFormat::Json,
        }
    }

    /// Guess the format of piped text: JSON documents start with `{` or `[`.
    pub fn sniff(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('{') | Some('[') => InputFormat::Json,
            _ => InputFormat::Yaml,
        }
    }
}

/// Parse a document into a generic JSON value.
pub fn parse(text: &str, format: InputFormat) -> Result<Value, Box<dyn std::error::Error>> {
    let value = match format {
        InputFormat::Json => serde_json::from_str(text)?,
        InputFormat::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(value)
}
