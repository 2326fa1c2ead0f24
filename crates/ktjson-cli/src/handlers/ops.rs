//! Handlers for the file-layout operations: split-teams, join-teams and
//! merge-actions

use super::utils::language_dir;
use crate::cli::LanguageArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use ktjson_core::ops::{join_teams, merge_actions, split_teams};

pub fn handle_split_teams(args: LanguageArgs, output: &mut OutputWriter) -> Result<()> {
    let dir = language_dir(&args.root, &args.language)?;
    let report = split_teams(&dir)?;

    if !output.is_human() {
        return output.data(&report);
    }
    for warning in &report.warnings {
        output.warning(&warning.to_string())?;
    }
    output.success(&format!(
        "Split {} of {} teams from {}",
        report.written.len(),
        report.total,
        report.source.display()
    ))
}

pub fn handle_join_teams(args: LanguageArgs, output: &mut OutputWriter) -> Result<()> {
    let dir = language_dir(&args.root, &args.language)?;
    let report = join_teams(&dir)?;

    if !output.is_human() {
        return output.data(&report);
    }
    output.success(&format!(
        "Joined {} team files into {}",
        report.sources.len(),
        report.destination.display()
    ))
}

pub fn handle_merge_actions(args: LanguageArgs, output: &mut OutputWriter) -> Result<()> {
    let dir = language_dir(&args.root, &args.language)?;
    let report = merge_actions(&dir)?;

    if !output.is_human() {
        return output.data(&report);
    }
    for missing in &report.missing {
        output.warning(&format!("{} not found, nothing merged from it", missing.display()))?;
    }
    output.success(&format!(
        "Merged {} universal and {} mission actions into {}",
        report.universal,
        report.mission,
        report.destination.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::error::Error;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_output() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Json, false, true, Box::new(std::io::sink()))
    }

    fn args(root: &TempDir) -> LanguageArgs {
        LanguageArgs {
            language: "en".to_string(),
            root: root.path().to_path_buf(),
        }
    }

    #[test]
    fn test_split_then_join() {
        let root = TempDir::new().unwrap();
        let en = root.path().join("en");
        fs::create_dir(&en).unwrap();
        let teams = json!([
            {"killteamId": "KT2", "killteamName": "Second"},
            {"killteamId": "KT1", "killteamName": "First"}
        ]);
        fs::write(en.join("teams.json"), teams.to_string()).unwrap();

        handle_split_teams(args(&root), &mut quiet_output()).unwrap();
        assert!(en.join("teams").join("KT1.json").exists());
        assert!(en.join("teams").join("KT2.json").exists());

        fs::remove_file(en.join("teams.json")).unwrap();
        handle_join_teams(args(&root), &mut quiet_output()).unwrap();

        let joined: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(en.join("teams.json")).unwrap()).unwrap();
        assert_eq!(joined[0]["killteamId"], "KT1");
        assert_eq!(joined[1]["killteamId"], "KT2");
    }

    #[test]
    fn test_merge_actions() {
        let root = TempDir::new().unwrap();
        let en = root.path().join("en");
        fs::create_dir(&en).unwrap();
        fs::write(
            en.join("universal_actions.json"),
            json!({"actions": [{"name": "Reposition"}]}).to_string(),
        )
        .unwrap();

        handle_merge_actions(args(&root), &mut quiet_output()).unwrap();

        let merged: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(en.join("actions.json")).unwrap()).unwrap();
        assert_eq!(merged["actions"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_language_dir() {
        let root = TempDir::new().unwrap();
        let error = handle_split_teams(args(&root), &mut quiet_output()).unwrap_err();
        assert!(matches!(error, Error::FileNotFound { .. }));
    }
}
