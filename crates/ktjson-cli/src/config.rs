//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Command-line arguments, which win over both

use crate::error::{Error, Result};
use ktjson_core::discovery::default_documents;
use ktjson_core::transform::Glossary;
use ktjson_core::{ProviderConfig, ProviderKind, TranslationMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".ktjson.yaml";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language the source documents are written in
    pub source_language: String,

    /// Target languages, for reference in scripts and `config show`
    pub languages: Vec<String>,

    /// Documents translated when none are named
    pub documents: Vec<String>,

    /// Rules file, or `builtin:<name>`; the curated bundle when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,

    /// Backend used when `--provider` is not given
    pub provider: ProviderKind,

    /// Mode used when `--mode` is not given
    pub mode: TranslationMode,

    /// Provider configurations
    pub providers: ProvidersConfig,

    /// Extra exact-match terms per language, on top of the built-in ones
    pub glossary: Glossary,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub google: ProviderConfig,
    pub deepl: ProviderConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `-v` wins when given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: String,

    /// Log file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            languages: vec!["es".to_string(), "fr".to_string()],
            documents: default_documents(),
            rules: None,
            provider: ProviderKind::Google,
            mode: TranslationMode::default(),
            providers: ProvidersConfig::default(),
            glossary: Glossary::new(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: "compact".to_string(),
            file: None,
        }
    }
}

/// On-disk formats, by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Yaml,
    Json,
    Toml,
}

impl FileFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            Some("toml") => Ok(FileFormat::Toml),
            _ => Err(Error::config(format!(
                "Unsupported config format for {} (expected .yaml, .json or .toml)",
                path.display()
            ))),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config = match FileFormat::from_path(path)? {
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)?,
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config");
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) if !path.exists() => Err(Error::FileNotFound {
                path: path.to_path_buf(),
            }),
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Default configuration file paths, checked in order
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(PROJECT_CONFIG_FILE),
            PathBuf::from(".ktjson.yml"),
            PathBuf::from(".ktjson.json"),
            PathBuf::from(".ktjson.toml"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let ktjson_dir = config_dir.join("ktjson");
            paths.push(ktjson_dir.join("config.yaml"));
            paths.push(ktjson_dir.join("config.json"));
            paths.push(ktjson_dir.join("config.toml"));
        }

        paths
    }

    /// `<user config dir>/ktjson/config.yaml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ktjson").join("config.yaml"))
    }

    /// Settings for one backend
    pub fn provider(&self, kind: ProviderKind) -> &ProviderConfig {
        match kind {
            ProviderKind::Google => &self.providers.google,
            ProviderKind::Deepl => &self.providers.deepl,
        }
    }

    /// A copy with every API key masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for provider in [&mut copy.providers.google, &mut copy.providers.deepl] {
            if provider.api_key.is_some() {
                provider.api_key = Some("***".to_string());
            }
        }
        copy
    }

    /// Render in the format implied by `path`'s extension
    pub fn render(&self, path: &Path) -> Result<String> {
        let content = match FileFormat::from_path(path)? {
            FileFormat::Yaml => serde_yaml::to_string(self)?,
            FileFormat::Json => serde_json::to_string_pretty(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
        };
        Ok(content)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.render(path)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "source_language: en\nprovider: deepl\nproviders:\n  deepl:\n    api_key: abc:fx\n    min_interval_ms: 100\nglossary:\n  es:\n    Recon: Reconocimiento\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.provider, ProviderKind::Deepl);
        assert_eq!(config.providers.deepl.api_key.as_deref(), Some("abc:fx"));
        assert_eq!(config.providers.deepl.min_interval_ms, 100);
        assert_eq!(config.providers.deepl.timeout_secs, 15);
        assert_eq!(config.documents, default_documents());
        assert_eq!(config.glossary.len(), 1);
    }

    #[test]
    fn test_toml_and_json_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.rules = Some("builtin:heuristic".to_string());

        for name in ["config.toml", "config.json", "config.yaml"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_redacted_masks_keys() {
        let mut config = Config::default();
        config.providers.deepl.api_key = Some("secret-key:fx".to_string());

        let redacted = config.redacted();
        assert_eq!(redacted.providers.deepl.api_key.as_deref(), Some("***"));
        assert_eq!(redacted.providers.google.api_key, None);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let error = Config::from_file(Path::new("settings.ini")).unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let error = Config::load_with_file(Some(Path::new("/nonexistent/ktjson.yaml"))).unwrap_err();
        assert!(matches!(error, Error::FileNotFound { .. }));
    }
}
