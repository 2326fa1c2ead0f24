//! Merge of the universal and mission action lists into `actions.json`

use super::teams::read_json;
use crate::pipeline::{to_pretty_json, write_atomic};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const UNIVERSAL_ACTIONS: &str = "universal_actions.json";
pub const MISSION_ACTIONS: &str = "mission_actions.json";
pub const ACTIONS_FILE: &str = "actions.json";

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeReport {
    pub destination: PathBuf,
    pub universal: usize,
    pub mission: usize,
    /// Inputs that did not exist
    pub missing: Vec<PathBuf>,
}

impl MergeReport {
    pub fn total(&self) -> usize {
        self.universal + self.mission
    }
}

/// Write `{"actions": [universal..., mission...]}` to
/// `<language_dir>/actions.json`. A missing input contributes nothing; an
/// unreadable one fails the merge before anything is written.
pub fn merge_actions(language_dir: &Path) -> Result<MergeReport> {
    if !language_dir.is_dir() {
        return Err(Error::configuration(format!(
            "Language directory {} not found",
            language_dir.display()
        )));
    }

    let mut report = MergeReport {
        destination: language_dir.join(ACTIONS_FILE),
        ..Default::default()
    };

    let universal = read_actions(&language_dir.join(UNIVERSAL_ACTIONS), &mut report.missing)?;
    let mission = read_actions(&language_dir.join(MISSION_ACTIONS), &mut report.missing)?;
    report.universal = universal.len();
    report.mission = mission.len();

    let mut actions = universal;
    actions.extend(mission);
    let merged = json!({ "actions": actions });

    let text = to_pretty_json(&merged, &report.destination.display().to_string())?;
    write_atomic(&report.destination, text.as_bytes())?;
    info!(
        destination = %report.destination.display(),
        universal = report.universal,
        mission = report.mission,
        "merged actions"
    );
    Ok(report)
}

fn read_actions(path: &Path, missing: &mut Vec<PathBuf>) -> Result<Vec<Value>> {
    if !path.exists() {
        warn!(path = %path.display(), "actions file not found");
        missing.push(path.to_path_buf());
        return Ok(Vec::new());
    }

    match read_json(path)? {
        Value::Object(mut map) => match map.remove("actions") {
            Some(Value::Array(actions)) => Ok(actions),
            None => Ok(Vec::new()),
            Some(_) => Err(Error::structural(
                path.display().to_string(),
                "expected 'actions' to be an array",
                None,
            )),
        },
        _ => Err(Error::structural(
            path.display().to_string(),
            "expected an object with an 'actions' array",
            None,
        )),
    }
}
