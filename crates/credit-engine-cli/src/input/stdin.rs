use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialise piped stdin into a typed input struct.
///
/// Returns `None` when stdin is an interactive terminal or carries no data.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Invalid input on stdin at line {}, column {}: {}", e.line(), e.column(), e))?;
    Ok(Some(value))
}
