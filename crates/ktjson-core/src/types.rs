//! Core types shared by the walker, transforms and pipeline

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// Ordered ancestor object keys from the document root to a leaf.
///
/// Arrays are transparent and contribute no segment, so the length of a
/// path equals the object-nesting depth of the leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl Deref for FieldPath {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "$")
        } else {
            write!(f, "$.{}", self.0.join("."))
        }
    }
}

/// A lowercase ISO-639 style language code such as `es` or `pt-br`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary subtag (`pt` for `pt-br`)
    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        let mut parts = normalized.split('-');
        let primary_ok = parts
            .next()
            .map(|p| (2..=3).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphabetic()))
            .unwrap_or(false);
        let rest_ok = parts.all(|p| (2..=4).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()));

        if primary_ok && rest_ok {
            Ok(Self(normalized))
        } else {
            Err(Error::configuration(format!("Invalid language code '{s}'")))
        }
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One in-scope string collected from a document, translated in bulk and
/// written back by its JSON Pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// RFC 6901 pointer to the leaf
    pub pointer: String,
    /// Ancestor object keys of the leaf
    pub path: FieldPath,
    /// Field name that selected the leaf
    pub field: String,
    /// Source text
    pub original: String,
    /// Translated text, once known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated: Option<String>,
}

impl TranslationUnit {
    pub fn new(pointer: impl Into<String>, path: FieldPath, field: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            path,
            field: field.into(),
            original: original.into(),
            translated: None,
        }
    }

    /// The text to write back: the translation if present, otherwise the original
    pub fn resolved(&self) -> &str {
        self.translated.as_deref().unwrap_or(&self.original)
    }

    pub fn is_translated(&self) -> bool {
        self.translated.is_some()
    }
}

/// A recovered, non-fatal problem attached to one leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub pointer: String,
    pub message: String,
}

impl Warning {
    pub fn new(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pointer, self.message)
    }
}

/// `true` for empty or whitespace-only strings, which are never transformed
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_display() {
        assert_eq!(FieldPath::new().to_string(), "$");
        let path: FieldPath = ["opTypes", "weapons"].into_iter().collect();
        assert_eq!(path.to_string(), "$.opTypes.weapons");
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_language_code_parsing() {
        assert_eq!("ES".parse::<LanguageCode>().unwrap().as_str(), "es");
        assert_eq!("pt_BR".parse::<LanguageCode>().unwrap().as_str(), "pt-br");
        assert_eq!("pt-br".parse::<LanguageCode>().unwrap().primary(), "pt");
        assert!("e".parse::<LanguageCode>().is_err());
        assert!("spanish".parse::<LanguageCode>().is_err());
        assert!("e5".parse::<LanguageCode>().is_err());
    }

    #[test]
    fn test_language_code_serde() {
        let code: LanguageCode = serde_json::from_str("\"FR\"").unwrap();
        assert_eq!(code.as_str(), "fr");
        assert!(serde_json::from_str::<LanguageCode>("\"x\"").is_err());
    }

    #[test]
    fn test_unit_resolution() {
        let mut unit = TranslationUnit::new("/name", FieldPath::new(), "name", "Shoot");
        assert_eq!(unit.resolved(), "Shoot");
        unit.translated = Some("Disparar".to_string());
        assert_eq!(unit.resolved(), "Disparar");
    }

    #[test]
    fn test_blank_detection() {
        assert!(is_blank(""));
        assert!(is_blank("  \n\t"));
        assert!(!is_blank(" a "));
    }
}
