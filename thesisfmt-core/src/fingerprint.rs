// Content hashes recorded in the report envelope

use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};

/// SHA-256 of the whole package, hex encoded
pub fn calculate_package_hash(package_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(package_bytes);
    format!("{:x}", hasher.finalize())
}

/// SHA-256 of the JSON form of any serializable configuration
pub fn calculate_config_hash<T: serde::Serialize>(config: &T) -> Result<String> {
    let config_json = serde_json::to_string(config)
        .map_err(|e| anyhow!("Failed to serialize config for hashing: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
