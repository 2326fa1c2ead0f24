//! Output serialization and crash-safe file writes
//!
//! Every write goes to a temporary sibling that is then persisted over the
//! destination, so a destination is either untouched or complete.
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use crate::{Error, Result};
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const BACKUP_SUFFIX: &str = ".backup";
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Two-space indented JSON with non-ASCII left unescaped, no trailing newline
pub fn to_pretty_json(value: &Value, document: &str) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::PostTransform {
        document: document.to_string(),
        message: format!("result is not serializable: {}", e),
        source: Some(e),
    })
}

/// Serialize `value` and parse it back, confirming the output is valid JSON
/// describing the same value
pub fn revalidate(value: &Value, document: &str) -> Result<String> {
    let text = to_pretty_json(value, document)?;
    let reparsed: Value = serde_json::from_str(&text).map_err(|e| Error::PostTransform {
        document: document.to_string(),
        message: format!("serialized output does not parse: {}", e),
        source: Some(e),
    })?;

    if &reparsed != value {
        return Err(Error::PostTransform {
            document: document.to_string(),
            message: "serialized output does not round-trip".to_string(),
            source: None,
        });
    }
    Ok(text)
}

/// Write `contents` to `path` through a temporary sibling, creating parent
/// directories
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .map_err(|e| Error::io(format!("Failed to create directory {}", parent.display()), e))?;

    let mut temp = NamedTempFile::new_in(&parent)
        .map_err(|e| Error::io(format!("Failed to create temporary file in {}", parent.display()), e))?;
    temp.write_all(contents)
        .and_then(|_| temp.flush())
        .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))?;
    temp.persist(path)
        .map_err(|e| Error::io(format!("Failed to replace {}", path.display()), e.error))?;
    Ok(())
}

/// `F` -> `F.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, BACKUP_SUFFIX)
}

/// `F` -> `F.partial`
pub fn partial_path(path: &Path) -> PathBuf {
    with_suffix(path, PARTIAL_SUFFIX)
}

/// Write the exact pre-transform bytes of `path` to its backup sibling
pub fn write_backup(path: &Path, original: &[u8]) -> Result<PathBuf> {
    let backup = backup_path(path);
    write_atomic(&backup, original)?;
    Ok(backup)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
