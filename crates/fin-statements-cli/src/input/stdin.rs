use serde_json::Value;
use std::io::{self, Read};

/// Attempt to read a JSON or YAML document from stdin if data is being piped.
/// Returns None if stdin is a TTY (interactive) or empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_document(&buffer)
}

/// Parse a piped document. Blank input yields None.
pub fn parse_document(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // JSON is a subset of YAML, but JSON errors are clearer, so try it first
    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(_) => serde_yaml::from_str(trimmed)
            .map_err(|e| format!("stdin is neither valid JSON nor YAML: {e}"))?,
    };
    Ok(Some(value))
}
