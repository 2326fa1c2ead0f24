//! Conversion between the combined `teams.json` array and one file per team

use crate::discovery::{team_files, TEAMS_DIR, TEAMS_FILE};
use crate::pipeline::{relative_name, to_pretty_json, write_atomic};
use crate::types::Warning;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitReport {
    pub source: PathBuf,
    /// Entries in the source array
    pub total: usize,
    pub written: Vec<PathBuf>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct JoinReport {
    pub destination: PathBuf,
    pub sources: Vec<PathBuf>,
}

/// File name for a team: its `killteamId` with path separators replaced
pub fn team_file_name(killteam_id: &str) -> String {
    format!("{}.json", killteam_id.replace(['/', '\\'], "_"))
}

/// Split `<language_dir>/teams.json` into `<language_dir>/teams/<killteamId>.json`.
/// Entries that are not objects or have no `killteamId` are skipped with a
/// warning. A later team mapping to an already written file replaces it and
/// is reported as a warning.
pub fn split_teams(language_dir: &Path) -> Result<SplitReport> {
    let source = language_dir.join(TEAMS_FILE);
    let teams = read_json(&source)?;
    let Value::Array(teams) = teams else {
        return Err(Error::structural(
            source.display().to_string(),
            "expected the team collection to be an array",
            None,
        ));
    };

    let output_dir = language_dir.join(TEAMS_DIR);
    let mut report = SplitReport {
        source: source.clone(),
        total: teams.len(),
        ..Default::default()
    };
    let mut seen = HashSet::new();

    for (index, team) in teams.iter().enumerate() {
        let pointer = format!("/{}", index);
        let Some(object) = team.as_object() else {
            skip(&mut report, pointer, format!("team at index {} is not an object", index));
            continue;
        };
        let Some(killteam_id) = object
            .get("killteamId")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
        else {
            skip(&mut report, pointer, format!("team at index {} has no killteamId", index));
            continue;
        };

        let path = output_dir.join(team_file_name(killteam_id));
        let duplicate = !seen.insert(path.clone());
        if duplicate {
            let message = format!(
                "team at index {} reuses file {}, overwriting an earlier team",
                index,
                team_file_name(killteam_id)
            );
            warn!(source = %source.display(), killteam_id, "{}", message);
            report.warnings.push(Warning::new(pointer.clone(), message));
        }
        match to_pretty_json(team, &path.display().to_string())
            .and_then(|text| write_atomic(&path, text.as_bytes()))
        {
            Ok(()) if duplicate => {}
            Ok(()) => report.written.push(path),
            Err(error) => skip(&mut report, pointer, error.to_string()),
        }
    }

    info!(
        source = %source.display(),
        written = report.written.len(),
        total = report.total,
        "split teams"
    );
    Ok(report)
}

/// Join `<language_dir>/teams/*.json`, sorted by file name, into
/// `<language_dir>/teams.json`
pub fn join_teams(language_dir: &Path) -> Result<JoinReport> {
    let files = team_files(language_dir)?;
    if files.is_empty() {
        return Err(Error::configuration(format!(
            "No team files found in {}",
            language_dir.join(TEAMS_DIR).display()
        )));
    }

    let mut teams = Vec::with_capacity(files.len());
    for file in &files {
        let team = read_json(file)?;
        if !team.is_object() {
            return Err(Error::structural(
                relative_name(language_dir, file),
                "expected a team object",
                None,
            ));
        }
        teams.push(team);
    }

    let destination = language_dir.join(TEAMS_FILE);
    let text = to_pretty_json(&Value::Array(teams), &destination.display().to_string())?;
    write_atomic(&destination, text.as_bytes())?;
    info!(destination = %destination.display(), teams = files.len(), "joined teams");

    Ok(JoinReport {
        destination,
        sources: files,
    })
}

fn skip(report: &mut SplitReport, pointer: String, message: String) {
    warn!(source = %report.source.display(), "{}, skipping", message);
    report.warnings.push(Warning::new(pointer, message));
}

pub(crate) fn read_json(path: &Path) -> Result<Value> {
    let bytes =
        fs::read(path).map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        Error::structural(path.display().to_string(), format!("invalid JSON: {}", e), Some(e))
    })
}
