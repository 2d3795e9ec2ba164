//! Utility functions for hive-advisor.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{AdvisorError, Result};

/// Maximum policy artifact size that will be read into memory (64 MB).
pub const MAX_ARTIFACT_SIZE: u64 = 64 * 1024 * 1024;

/// Maximum request file size (1 MB).
pub const MAX_REQUEST_SIZE: u64 = 1024 * 1024;

/// Read a file into a string, refusing files larger than `max_size` bytes.
///
/// # Errors
///
/// Returns a storage error if the file cannot be read or exceeds `max_size`.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| AdvisorError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(AdvisorError::storage(
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file is too large ({} bytes, max {} bytes)", size, max_size),
            ),
        ));
    }

    fs::read_to_string(path).map_err(|e| AdvisorError::storage(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_read_within_limit() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("small.json");
        fs::write(&path, "{}").unwrap();

        assert_eq!(read_to_string_with_limit(&path, 100).unwrap(), "{}");
    }

    #[test]
    fn test_read_nonexistent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.json");

        let err = read_to_string_with_limit(&path, 100).unwrap_err();
        assert!(matches!(err, AdvisorError::Storage { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_read_exceeds_limit() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("large.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(&[b'x'; 1000]).unwrap();

        let err = read_to_string_with_limit(&path, 500).unwrap_err().to_string();
        assert!(err.contains("too large"));
        assert!(err.contains("1000 bytes"));
        assert!(err.contains("max 500 bytes"));
    }

    #[test]
    fn test_read_at_boundary() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("boundary.json");
        fs::write(&path, "x".repeat(100)).unwrap();

        assert!(read_to_string_with_limit(&path, 100).is_ok());
        assert!(read_to_string_with_limit(&path, 99).is_err());
    }
}
