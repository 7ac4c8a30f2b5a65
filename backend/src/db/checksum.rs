//! Checksums identifying uploaded datasets.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Calculate SHA-256 checksum of text content, hex encoded.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Checksum of uploaded records in their compact JSON rendering.
pub fn records_checksum(records: &[Value]) -> Result<String, serde_json::Error> {
    let content = serde_json::to_string(records)?;
    Ok(calculate_checksum(&content))
}
