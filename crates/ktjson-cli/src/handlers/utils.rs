//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use ktjson_core::pipeline::BatchReport;
use ktjson_rules::{RuleLoader, RuleSet, RuleSource};
use std::path::{Path, PathBuf};

/// Where the rules come from: the flag, then the config, then the curated bundle
pub fn rule_source(explicit: Option<&str>, config: &Config) -> Result<RuleSource> {
    match explicit.or(config.rules.as_deref()) {
        Some(source) => Ok(source.parse()?),
        None => Ok(RuleSource::default()),
    }
}

/// Load and validate the rule set for a command
pub fn load_rules(explicit: Option<&str>, config: &Config) -> Result<RuleSet> {
    let source = rule_source(explicit, config)?;
    if let RuleSource::File(path) = &source {
        if !path.exists() {
            return Err(Error::FileNotFound { path: path.clone() });
        }
    }
    tracing::debug!(rules = %source, "Loading rules");
    Ok(RuleLoader::new()?.load(&source)?)
}

/// `<root>/<language>`, which must exist
pub fn language_dir(root: &Path, language: &str) -> Result<PathBuf> {
    let dir = root.join(language);
    if !dir.is_dir() {
        return Err(Error::FileNotFound { path: dir });
    }
    Ok(dir)
}

/// Print the tally and turn failures or an interrupt into the exit status
pub fn finish_batch(report: &BatchReport, interrupted: bool, output: &mut OutputWriter) -> Result<()> {
    output.section("Results")?;
    output.batch_report(report)?;

    let summary = report.summary();
    if interrupted {
        Err(Error::Interrupted { summary })
    } else if report.has_failures() {
        Err(Error::BatchFailed { summary })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktjson_rules::BundledRules;
    use tempfile::TempDir;

    #[test]
    fn test_rule_source_precedence() {
        let mut config = Config::default();
        assert_eq!(
            rule_source(None, &config).unwrap(),
            RuleSource::Bundled(BundledRules::Curated)
        );

        config.rules = Some("builtin:heuristic".to_string());
        assert_eq!(
            rule_source(None, &config).unwrap(),
            RuleSource::Bundled(BundledRules::Heuristic)
        );
        assert_eq!(
            rule_source(Some("rules/custom.yaml"), &config).unwrap(),
            RuleSource::File(PathBuf::from("rules/custom.yaml"))
        );
    }

    #[test]
    fn test_missing_rules_file() {
        let error = load_rules(Some("/nonexistent/rules.yaml"), &Config::default()).unwrap_err();
        assert!(matches!(error, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_language_dir_must_exist() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("en")).unwrap();

        assert_eq!(language_dir(root.path(), "en").unwrap(), root.path().join("en"));
        assert!(matches!(
            language_dir(root.path(), "fr"),
            Err(Error::FileNotFound { .. })
        ));
    }
}
