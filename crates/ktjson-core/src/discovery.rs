//! Document discovery under a language directory
//!
//! Every language lives in its own directory (`en/`, `es/`, ...) with the
//! same relative file names, so a source document maps to its translation by
//! swapping the language directory.

use crate::pipeline::{relative_name, DocumentJob};
use crate::{Error, Result};
use ktjson_rules::RuleSet;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Documents processed when none are named explicitly
pub const DEFAULT_DOCUMENTS: [&str; 4] = [
    "weapon_rules.json",
    "universal_equipment.json",
    "actions.json",
    "ops_2025.json",
];

/// One-file-per-team directory
pub const TEAMS_DIR: &str = "teams";

/// The combined team collection
pub const TEAMS_FILE: &str = "teams.json";

pub fn default_documents() -> Vec<String> {
    DEFAULT_DOCUMENTS.iter().map(|d| d.to_string()).collect()
}

/// `teams/*.json` under `language_dir`, sorted by file name
pub fn team_files(language_dir: &Path) -> Result<Vec<PathBuf>> {
    let teams_dir = language_dir.join(TEAMS_DIR);
    if !teams_dir.is_dir() {
        return Ok(Vec::new());
    }
    json_files(&teams_dir)
}

/// `*.json` files directly inside `dir`, sorted by file name
pub fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let message = format!("Failed to list {}: {}", dir.display(), e);
            match e.into_io_error() {
                Some(source) => Error::io(message, source),
                None => Error::configuration(message),
            }
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Relative paths of the documents to process under `language_dir`: the
/// named documents that exist, then every team file. A combined
/// `teams.json` is used only when there is no `teams/` directory.
pub fn discover_documents(language_dir: &Path, documents: &[String]) -> Result<Vec<String>> {
    if !language_dir.is_dir() {
        return Err(Error::configuration(format!(
            "Language directory {} not found",
            language_dir.display()
        )));
    }

    let mut found = Vec::new();
    for document in documents {
        if language_dir.join(document).is_file() {
            found.push(document.clone());
        } else {
            warn!(document = %document, dir = %language_dir.display(), "document not found, skipping");
        }
    }

    let teams = team_files(language_dir)?;
    if teams.is_empty() {
        if language_dir.join(TEAMS_FILE).is_file() && !found.iter().any(|d| d == TEAMS_FILE) {
            found.push(TEAMS_FILE.to_string());
        }
    } else {
        found.extend(teams.iter().map(|path| relative_name(language_dir, path)));
    }
    Ok(found)
}

/// Jobs translating `relative` documents from `source_dir` into `target_dir`
pub fn translation_jobs(
    rules: &RuleSet,
    source_dir: &Path,
    target_dir: &Path,
    relative: &[String],
) -> Vec<DocumentJob> {
    relative
        .iter()
        .map(|name| {
            DocumentJob::new(
                source_dir.join(name),
                target_dir.join(name),
                rules.resolve_identity(name),
            )
        })
        .collect()
}

/// In-place jobs for explicit files, identified relative to `root`
pub fn in_place_jobs(rules: &RuleSet, root: &Path, files: &[PathBuf]) -> Vec<DocumentJob> {
    files
        .iter()
        .map(|file| DocumentJob::in_place(file.clone(), rules.resolve_identity(&relative_name(root, file))))
        .collect()
}
