use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON file and deserialise it into a typed input struct.
///
/// Parse failures report the line and column so malformed curve or
/// scenario matrices can be located quickly.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    serde_json::from_str(&contents).map_err(|e| {
        format!(
            "Invalid input in '{}' at line {}, column {}: {}",
            canonical.display(),
            e.line(),
            e.column(),
            e
        )
        .into()
    })
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.is_file() {
        let reason = if canonical.exists() { "Not a file" } else { "File not found" };
        return Err(format!("{}: {}", reason, canonical.display()).into());
    }

    Ok(canonical)
}
