//! Recipients manifest: one key ID per line in a file at the store root.
//!
//! Blank lines and `#` comments are ignored on read.

use std::path::Path;

use tracing::warn;

use super::fs;
use crate::core::types::KeyId;
use crate::error::{Result, StoreError};

/// Parse manifest text into an ordered, duplicate-free ID list.
pub fn parse(path: &Path, text: &str) -> Result<Vec<KeyId>> {
    let mut ids: Vec<KeyId> = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.contains(char::is_whitespace) {
            return Err(StoreError::Manifest {
                path: path.to_path_buf(),
                reason: format!("line {}: key IDs cannot contain whitespace", n + 1),
            }
            .into());
        }
        if ids.iter().any(|id| id == line) {
            warn!(path = %path.display(), id = line, "duplicate recipient in manifest, ignoring");
            continue;
        }
        ids.push(line.to_string());
    }
    Ok(ids)
}

/// Load the manifest; a missing file is an empty set.
pub fn load(path: &Path) -> Result<Vec<KeyId>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|_| StoreError::Manifest {
        path: path.to_path_buf(),
        reason: "not valid UTF-8".to_string(),
    })?;
    parse(path, &text)
}

/// Atomically persist `ids`.
pub fn save(path: &Path, ids: &[KeyId]) -> Result<()> {
    let mut text = ids.join("\n");
    text.push('\n');
    fs::write_atomic(path, text.as_bytes())
}
