//! SHA-256 helpers.
//!
//! Hashes are lowercase hex so they compare equal to the document hashes the
//! reader records.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a byte slice
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hex-encoded SHA-256 of a string's UTF-8 bytes
pub fn hash_string(input: &str) -> String {
    hash_bytes(input.as_bytes())
}
