//! Error types for rule set loading and validation
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Result type for rule operations
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors raised while loading, validating or compiling a rule set
#[derive(Error, Debug)]
pub enum RuleError {
    /// File I/O errors
    #[error("Failed to read rules file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML rules '{path}': {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing errors
    #[error("Failed to parse JSON rules '{path}': {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Unsupported file format
    #[error("Unsupported rules format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    /// The document does not satisfy the rules schema
    #[error("Rules file '{path}' failed schema validation:\n  - {}", .violations.join("\n  - "))]
    Schema {
        path: PathBuf,
        violations: Vec<String>,
    },

    /// An identity matcher carries an invalid regular expression
    #[error("Invalid identity pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    /// The embedded schema itself could not be compiled
    #[error("Rules schema could not be compiled: {reason}")]
    SchemaCompile { reason: String },

    /// Unknown bundled rule set name
    #[error("Unknown bundled rule set '{name}' (expected one of: {expected})")]
    UnknownBundle { name: String, expected: String },
}

impl RuleError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: error,
        }
    }

    /// Create a YAML parsing error with path context
    pub fn yaml_parse(path: impl Into<PathBuf>, error: serde_yaml::Error) -> Self {
        Self::YamlParse {
            path: path.into(),
            source: error,
        }
    }

    /// Create a JSON parsing error with path context
    pub fn json_parse(path: impl Into<PathBuf>, error: serde_json::Error) -> Self {
        Self::JsonParse {
            path: path.into(),
            source: error,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedFormat { path: path.into() }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. }
            | Self::YamlParse { path, .. }
            | Self::JsonParse { path, .. }
            | Self::UnsupportedFormat { path }
            | Self::Schema { path, .. } => Some(path),
            _ => None,
        }
    }
}
