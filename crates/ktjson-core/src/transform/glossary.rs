//! Exact-match term tables resolved before any provider call
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use crate::types::LanguageCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-language `source term -> translated term` tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Glossary {
    terms: BTreeMap<String, BTreeMap<String, String>>,
}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archetype names, which providers tend to mistranslate
    pub fn archetypes() -> Self {
        let mut glossary = Self::new();
        for (source, target) in [
            ("Security", "Seguridad"),
            ("Seek & Destroy", "Buscar y Destruir"),
            ("Recon", "Reconocimiento"),
            ("Infiltration", "Infiltración"),
        ] {
            glossary.insert("es", source, target);
        }
        for (source, target) in [
            ("Security", "Sécurité"),
            ("Seek & Destroy", "Rechercher et Détruire"),
            ("Recon", "Reconnaissance"),
            ("Infiltration", "Infiltration"),
        ] {
            glossary.insert("fr", source, target);
        }
        glossary
    }

    pub fn insert(&mut self, language: &str, source: impl Into<String>, target: impl Into<String>) {
        self.terms
            .entry(language.to_lowercase())
            .or_default()
            .insert(source.into(), target.into());
    }

    /// Exact, case-sensitive lookup. Falls back to the primary subtag, so a
    /// `pt` table also serves `pt-br`.
    pub fn lookup(&self, language: &LanguageCode, text: &str) -> Option<&str> {
        self.terms
            .get(language.as_str())
            .or_else(|| self.terms.get(language.primary()))
            .and_then(|table| table.get(text))
            .map(String::as_str)
    }

    /// Merge `other` into this glossary; entries in `other` win
    pub fn extend(&mut self, other: &Glossary) {
        for (language, table) in &other.terms {
            let target = self.terms.entry(language.clone()).or_default();
            for (source, translated) in table {
                target.insert(source.clone(), translated.clone());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.terms.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
