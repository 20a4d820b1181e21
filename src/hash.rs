//! BLAKE3 hashing utilities for generated file comparison
//!
//! Support files are only rewritten when their computed contents differ from
//! what is already on disk, so downstream builds see stable timestamps.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;

use crate::error::{PodgenError, Result};

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate BLAKE3 hash of a file
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| PodgenError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| PodgenError::FileReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex()))
}

/// Calculate BLAKE3 hash of in-memory contents
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex())
}

/// Returns true when the file at `path` already holds exactly `contents`.
///
/// A missing file never matches.
pub fn file_matches_contents(path: &Path, contents: &[u8]) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    Ok(hash_file(path)? == hash_bytes(contents))
}
