//! Loading, bundled defaults and hot reload of rule sets
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use crate::error::{RuleError, RuleResult};
use crate::parser::{Format, RuleParser};
use crate::rule_set::{RuleSet, RuleSetDefinition};
use crate::schema::RuleSchemaValidator;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;
use tracing::{debug, info};

const CURATED_RULES: &str = include_str!("../rules/curated.yaml");
const HEURISTIC_RULES: &str = include_str!("../rules/heuristic.yaml");

/// Rule sets compiled into the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BundledRules {
    /// Allow-list tables for each known document
    #[default]
    Curated,
    /// Deny-list with the identifier heuristic for each known document
    Heuristic,
}

impl BundledRules {
    pub const ALL: [BundledRules; 2] = [BundledRules::Curated, BundledRules::Heuristic];

    pub fn name(&self) -> &'static str {
        match self {
            BundledRules::Curated => "curated",
            BundledRules::Heuristic => "heuristic",
        }
    }

    /// Raw YAML source of the bundled rule set
    pub fn source(&self) -> &'static str {
        match self {
            BundledRules::Curated => CURATED_RULES,
            BundledRules::Heuristic => HEURISTIC_RULES,
        }
    }

    pub fn from_name(name: &str) -> RuleResult<Self> {
        Self::ALL
            .into_iter()
            .find(|bundle| bundle.name() == name)
            .ok_or_else(|| RuleError::UnknownBundle {
                name: name.to_string(),
                expected: Self::ALL.map(|b| b.name()).join(", "),
            })
    }

    fn origin(&self) -> PathBuf {
        PathBuf::from(format!("builtin:{}", self.name()))
    }
}

/// Where a rule set comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Bundled(BundledRules),
    File(PathBuf),
}

impl Default for RuleSource {
    fn default() -> Self {
        RuleSource::Bundled(BundledRules::default())
    }
}

impl FromStr for RuleSource {
    type Err = RuleError;

    /// `builtin:<name>` selects a bundled rule set, anything else is a path
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("builtin:") {
            Some(name) => BundledRules::from_name(name).map(RuleSource::Bundled),
            None => Ok(RuleSource::File(PathBuf::from(s))),
        }
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSource::Bundled(bundle) => write!(f, "builtin:{}", bundle.name()),
            RuleSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parses, validates and compiles rule sets
#[derive(Debug)]
pub struct RuleLoader {
    parser: RuleParser,
    validator: RuleSchemaValidator,
}

impl RuleLoader {
    pub fn new() -> RuleResult<Self> {
        Ok(Self {
            parser: RuleParser::new(),
            validator: RuleSchemaValidator::new()?,
        })
    }

    pub fn load(&self, source: &RuleSource) -> RuleResult<RuleSet> {
        match source {
            RuleSource::Bundled(bundle) => self.load_bundled(*bundle),
            RuleSource::File(path) => self.load_file(path),
        }
    }

    pub fn load_bundled(&self, bundle: BundledRules) -> RuleResult<RuleSet> {
        self.load_str(bundle.source(), Format::Yaml, &bundle.origin())
    }

    /// Load a rules file, detecting format from extension
    pub fn load_file(&self, path: &Path) -> RuleResult<RuleSet> {
        debug!(path = %path.display(), "Loading rules file");
        let value = self.parser.parse_file(path)?;
        self.load_value(value, path)
    }

    pub fn load_str(&self, content: &str, format: Format, origin: &Path) -> RuleResult<RuleSet> {
        let value = self.parser.parse_content(content, format, origin)?;
        self.load_value(value, origin)
    }

    /// Validate a parsed document against the schema and compile it
    pub fn load_value(&self, value: Value, origin: &Path) -> RuleResult<RuleSet> {
        self.validator.validate(&value, origin)?;
        let definition: RuleSetDefinition =
            serde_json::from_value(value).map_err(|e| RuleError::json_parse(origin, e))?;
        RuleSet::compile(definition)
    }

    /// Validate a rules file without compiling it, returning every violation
    pub fn check_file(&self, path: &Path) -> RuleResult<Vec<String>> {
        let value = self.parser.parse_file(path)?;
        Ok(self.validator.violations(&value))
    }
}

/// Load the default bundled rule set
pub fn default_rules() -> RuleResult<RuleSet> {
    RuleLoader::new()?.load_bundled(BundledRules::default())
}

/// A rule set backed by a file, reloaded when the file's mtime moves forward
#[derive(Debug)]
pub struct ReloadableRules {
    path: PathBuf,
    loader: RuleLoader,
    current: RuleSet,
    loaded_mtime: SystemTime,
}

impl ReloadableRules {
    pub fn open(path: impl Into<PathBuf>) -> RuleResult<Self> {
        let path = path.into();
        let loader = RuleLoader::new()?;
        let loaded_mtime = modified(&path)?;
        let current = loader.load_file(&path)?;
        Ok(Self {
            path,
            loader,
            current,
            loaded_mtime,
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.current
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload if the file changed since the last load. On a failed reload the
    /// previous rule set stays active and the error is returned.
    pub fn reload_if_changed(&mut self) -> RuleResult<bool> {
        let mtime = modified(&self.path)?;
        if mtime <= self.loaded_mtime {
            return Ok(false);
        }
        self.reload_with_mtime(mtime)?;
        Ok(true)
    }

    /// Unconditionally reload the file
    pub fn reload(&mut self) -> RuleResult<()> {
        let mtime = modified(&self.path)?;
        self.reload_with_mtime(mtime)
    }

    fn reload_with_mtime(&mut self, mtime: SystemTime) -> RuleResult<()> {
        let rules = self.loader.load_file(&self.path)?;
        info!(path = %self.path.display(), version = rules.version(), "Reloaded rules");
        self.current = rules;
        self.loaded_mtime = mtime;
        Ok(())
    }
}

fn modified(path: &Path) -> RuleResult<SystemTime> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| RuleError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_rules_load() {
        let loader = RuleLoader::new().unwrap();
        for bundle in BundledRules::ALL {
            let rules = loader.load_bundled(bundle).unwrap();
            assert_eq!(rules.version(), "1");
            assert!(rules.document("teams").is_some(), "{} lacks teams", bundle.name());
        }
    }

    #[test]
    fn test_rule_source_parsing() {
        assert_eq!(
            "builtin:heuristic".parse::<RuleSource>().unwrap(),
            RuleSource::Bundled(BundledRules::Heuristic)
        );
        assert_eq!(
            "my/rules.yaml".parse::<RuleSource>().unwrap(),
            RuleSource::File(PathBuf::from("my/rules.yaml"))
        );
        assert!("builtin:nope".parse::<RuleSource>().is_err());
        assert_eq!(RuleSource::default().to_string(), "builtin:curated");
    }

    #[test]
    fn test_schema_violation_stops_load() {
        let loader = RuleLoader::new().unwrap();
        let err = loader
            .load_str("version: 1\ndocuments: {}\n", Format::Yaml, Path::new("bad.yaml"))
            .unwrap_err();
        assert!(matches!(err, RuleError::Schema { .. }));
    }

    #[test]
    fn test_reload_keeps_previous_rules_on_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rules.yaml");
        std::fs::write(&path, "version: \"1\"\ndocuments: {}\n").unwrap();

        let mut rules = ReloadableRules::open(&path).unwrap();
        assert!(!rules.reload_if_changed().unwrap());
        assert_eq!(rules.rules().identities().count(), 0);

        std::fs::write(
            &path,
            "version: \"2\"\ndocuments:\n  actions.json:\n    translate:\n      allow:\n        name: true\n",
        )
        .unwrap();
        rules.reload().unwrap();
        assert_eq!(rules.rules().version(), "2");
        assert!(rules.rules().classify("actions.json", &[], "name"));

        std::fs::write(&path, "documents: {}\n").unwrap();
        assert!(rules.reload().is_err());
        assert_eq!(rules.rules().version(), "2");
    }
}
