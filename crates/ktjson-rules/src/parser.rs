//! Rules file parsing for YAML and JSON formats
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use crate::error::{RuleError, RuleResult};
use serde_json::Value;
use std::path::Path;

/// Supported rules file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> RuleResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(RuleError::unsupported_format(path)),
        }
    }

    /// Get the primary file extension for this format
    pub fn primary_extension(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }
}

/// Parses rules documents into a JSON value before typed deserialization,
/// so both formats go through the same schema validation.
#[derive(Debug, Default)]
pub struct RuleParser;

impl RuleParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a rules file, detecting format from extension
    pub fn parse_file(&self, path: &Path) -> RuleResult<Value> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| RuleError::io(path, e))?;
        self.parse_content(&content, format, path)
    }

    /// Parse rules content with explicit format
    pub fn parse_content(&self, content: &str, format: Format, path: &Path) -> RuleResult<Value> {
        match format {
            Format::Yaml => self.parse_yaml(content, path),
            Format::Json => self.parse_json(content, path),
        }
    }

    /// Parse YAML content
    pub fn parse_yaml(&self, content: &str, path: &Path) -> RuleResult<Value> {
        let yaml_value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| RuleError::yaml_parse(path, e))?;

        serde_json::to_value(yaml_value).map_err(|e| RuleError::json_parse(path, e))
    }

    /// Parse JSON content
    pub fn parse_json(&self, content: &str, path: &Path) -> RuleResult<Value> {
        serde_json::from_str(content).map_err(|e| RuleError::json_parse(path, e))
    }

    /// Serialize a value back to string format
    pub fn serialize(&self, value: &Value, format: Format, path: &Path) -> RuleResult<String> {
        match format {
            Format::Json => {
                serde_json::to_string_pretty(value).map_err(|e| RuleError::json_parse(path, e))
            }
            Format::Yaml => serde_yaml::to_string(value).map_err(|e| RuleError::yaml_parse(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path(Path::new("rules.yaml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("rules.YML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("rules.json")).unwrap(), Format::Json);
        assert!(Format::from_path(Path::new("rules.txt")).is_err());
        assert!(Format::from_path(Path::new("rules")).is_err());
    }

    #[test]
    fn test_yaml_and_json_agree() {
        let parser = RuleParser::new();
        let yaml = "version: \"1\"\ndocuments:\n  a.json:\n    translate:\n      allow:\n        name: true\n";
        let json = r#"{"version":"1","documents":{"a.json":{"translate":{"allow":{"name":true}}}}}"#;

        let from_yaml = parser.parse_yaml(yaml, Path::new("r.yaml")).unwrap();
        let from_json = parser.parse_json(json, Path::new("r.json")).unwrap();
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"{{"version":"1","documents":{{}}}}"#).unwrap();

        let value = RuleParser::new().parse_file(file.path()).unwrap();
        assert_eq!(value["version"], "1");
    }

    #[test]
    fn test_parse_errors_carry_path() {
        let err = RuleParser::new()
            .parse_json("{", Path::new("broken.json"))
            .unwrap_err();
        assert_eq!(err.path().unwrap(), Path::new("broken.json"));
    }
}
