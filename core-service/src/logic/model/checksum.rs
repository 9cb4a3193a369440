//! Model file checksum
//!
//! SHA-256 of the artifact on disk, optionally pinned through config.

use std::path::Path;
use sha2::{Digest, Sha256};

use super::inference::ModelLoadError;

/// Hex-encoded SHA-256 of a file
pub fn sha256_file(path: &Path) -> Result<String, ModelLoadError> {
    let bytes = std::fs::read(path).map_err(|source| ModelLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(sha256_bytes(&bytes))
}

pub fn sha256_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Compute the digest and compare it with the pinned one, if any.
/// Returns the actual digest.
pub fn verify_checksum(path: &Path, expected: Option<&str>) -> Result<String, ModelLoadError> {
    let actual = sha256_file(path)?;

    if let Some(expected) = expected {
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(ModelLoadError::ChecksumMismatch {
                path: path.display().to_string(),
                expected: expected.to_lowercase(),
                actual,
            });
        }
    }

    Ok(actual)
}
