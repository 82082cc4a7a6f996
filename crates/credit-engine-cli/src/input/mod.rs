pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;
use std::error::Error;
use tracing::debug;

/// Load a command's JSON input from `--input <path>` or, failing that, piped stdin.
pub fn load<T: DeserializeOwned>(path: Option<&str>, command: &str) -> Result<T, Box<dyn Error>> {
    if let Some(path) = path {
        debug!(command, path, "reading input file");
        return file::read_json(path);
    }
    debug!(command, "reading input from stdin");
    match stdin::read_stdin()? {
        Some(value) => Ok(value),
        None => Err(format!("--input <file.json> or stdin required for {command}").into()),
    }
}
