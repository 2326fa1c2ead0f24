//! Translation units: collected in one walk, written back in another
//!
//! Translation is asynchronous and batched, so it does not run inside the
//! walker. A first walk records every in-scope leaf as a
//! [`TranslationUnit`]; after the translator has filled the units in, a
//! second walk with the same classifier substitutes each leaf by pointer.
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use crate::types::{FieldPath, TranslationUnit};
use crate::walker::{Leaf, LeafTransform};
use std::collections::HashMap;

/// Records in-scope leaves and leaves them unchanged
#[derive(Debug, Default)]
pub struct UnitCollector {
    units: Vec<TranslationUnit>,
}

impl UnitCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn into_units(self) -> Vec<TranslationUnit> {
        self.units
    }
}

impl LeafTransform for UnitCollector {
    fn transform(&mut self, leaf: &Leaf<'_>) -> String {
        self.units.push(TranslationUnit::new(
            leaf.pointer,
            leaf.path.iter().cloned().collect::<FieldPath>(),
            leaf.field,
            leaf.text,
        ));
        leaf.text.to_string()
    }
}

/// Replaces leaves by pointer with the resolved text of their unit
#[derive(Debug, Default)]
pub struct UnitWriter {
    by_pointer: HashMap<String, String>,
    applied: usize,
}

impl UnitWriter {
    /// Build from translated units; units without a translation are skipped
    pub fn new(units: &[TranslationUnit]) -> Self {
        let by_pointer = units
            .iter()
            .filter_map(|unit| {
                unit.translated
                    .as_ref()
                    .map(|text| (unit.pointer.clone(), text.clone()))
            })
            .collect();
        Self {
            by_pointer,
            applied: 0,
        }
    }

    /// Leaves actually replaced so far
    pub fn applied(&self) -> usize {
        self.applied
    }
}

impl LeafTransform for UnitWriter {
    fn transform(&mut self, leaf: &Leaf<'_>) -> String {
        match self.by_pointer.get(leaf.pointer) {
            Some(text) => {
                self.applied += 1;
                text.clone()
            }
            None => leaf.text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::walk;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_collect_then_write_back() {
        let doc = json!({
            "actions": [
                {"id": "a1", "name": "Shoot", "effects": ["Roll", "  "]},
                {"id": "a2", "name": "Fight"}
            ]
        });
        let classifier =
            |path: &[String], field: &str| path == ["actions"] && field != "id";

        let mut collector = UnitCollector::new();
        let unchanged = walk(&doc, &classifier, &mut collector);
        assert_eq!(unchanged, doc);

        let mut units = collector.into_units();
        let pointers: Vec<&str> = units.iter().map(|u| u.pointer.as_str()).collect();
        assert_eq!(
            pointers,
            vec!["/actions/0/name", "/actions/0/effects/0", "/actions/1/name"]
        );
        assert_eq!(units[1].field, "effects");
        assert_eq!(units[1].path.segments(), ["actions".to_string()]);

        units[0].translated = Some("Disparar".to_string());
        units[2].translated = Some("Luchar".to_string());

        let mut writer = UnitWriter::new(&units);
        let written = walk(&doc, &classifier, &mut writer);
        assert_eq!(writer.applied(), 2);
        assert_eq!(
            written,
            json!({
                "actions": [
                    {"id": "a1", "name": "Disparar", "effects": ["Roll", "  "]},
                    {"id": "a2", "name": "Luchar"}
                ]
            })
        );
    }
}
