//! Request input for CLI commands.
//!
//! Requests are [`HiveSignals`] JSON documents read from a file or stdin.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::core::HiveSignals;
use crate::error::{AdvisorError, Result};
use crate::util::{read_to_string_with_limit, MAX_REQUEST_SIZE};

/// Where a request document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `None` or `-` means stdin.
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            Some(path) if path != Path::new("-") => InputSource::File(path.to_path_buf()),
            _ => InputSource::Stdin,
        }
    }

    /// Read and parse the request.
    pub fn read_signals(&self) -> Result<HiveSignals> {
        let content = match self {
            InputSource::File(path) => read_to_string_with_limit(path, MAX_REQUEST_SIZE)?,
            InputSource::Stdin => read_stdin_limited(MAX_REQUEST_SIZE)?,
        };
        parse_signals(&content)
    }
}

fn read_stdin_limited(max_size: u64) -> Result<String> {
    read_limited(io::stdin().lock(), max_size)
}

/// Read at most `max_size` bytes of UTF-8. Unreadable or oversized input is
/// a malformed request.
fn read_limited(reader: impl Read, max_size: u64) -> Result<String> {
    let mut content = String::new();
    reader
        .take(max_size + 1)
        .read_to_string(&mut content)
        .map_err(|e| AdvisorError::shape(format!("request could not be read: {}", e)))?;
    if content.len() as u64 > max_size {
        return Err(AdvisorError::shape(format!(
            "request exceeds {} bytes",
            max_size
        )));
    }
    Ok(content)
}

/// Parse a request document. An empty document is the all-defaults request.
pub fn parse_signals(content: &str) -> Result<HiveSignals> {
    if content.trim().is_empty() {
        return Ok(HiveSignals::default());
    }
    serde_json::from_str(content)
        .map_err(|e| AdvisorError::shape(format!("request is not valid JSON: {}", e)))
}
