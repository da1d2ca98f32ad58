use log::debug;
use serde_json::Value;
use std::io::{self, Read};

/// Read piped JSON from stdin.
/// Returns None when stdin is a terminal or the pipe is empty, so callers
/// fall back to command-line flags.
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

    debug!("read {} bytes of JSON from stdin", trimmed.len());
    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| format!("Failed to parse stdin JSON: {e}"))?;
    Ok(Some(value))
}
