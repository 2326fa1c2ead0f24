//! Field deletion driven by prune rules
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use crate::walker::{escape_pointer_token, Leaf, LeafTransform};
use ktjson_rules::DocumentRules;

/// Removes every object entry the document's prune tree flags, at the
/// depth the tree places it
#[derive(Debug)]
pub struct FieldPruner<'a> {
    rules: &'a DocumentRules,
    removed: Vec<String>,
}

impl<'a> FieldPruner<'a> {
    pub fn new(rules: &'a DocumentRules) -> Self {
        Self {
            rules,
            removed: Vec::new(),
        }
    }

    /// Removed entries as `path/key` descriptions, in visit order
    pub fn removed(&self) -> &[String] {
        &self.removed
    }
}

impl LeafTransform for FieldPruner<'_> {
    fn transform(&mut self, leaf: &Leaf<'_>) -> String {
        leaf.text.to_string()
    }

    fn prune(&mut self, path: &[String], key: &str) -> bool {
        let remove = self.rules.prunes(path, key);
        if remove {
            let mut location: String = path
                .iter()
                .map(|segment| format!("/{}", escape_pointer_token(segment)))
                .collect();
            location.push('/');
            location.push_str(&escape_pointer_token(key));
            self.removed.push(location);
        }
        remove
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::walk;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn team_rules() -> DocumentRules {
        serde_json::from_value(json!({
            "prune": {
                "isPublished": true,
                "userId": true,
                "opTypes": { "opId": true, "weapons": { "isDefault": true } }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_removes_exactly_configured_fields() {
        let rules = team_rules();
        let doc = json!({
            "killteamId": "IMP-AOD",
            "isPublished": true,
            "userId": "u1",
            "opTypes": [
                {
                    "opId": "x",
                    "opTypeName": "Trooper",
                    "isPublished": true,
                    "weapons": [{"wepName": "Gun", "isDefault": false}]
                }
            ],
            "isDefault": "kept at root"
        });

        let mut pruner = FieldPruner::new(&rules);
        let nothing = |_: &[String], _: &str| false;
        let cleaned = walk(&doc, &nothing, &mut pruner);

        assert_eq!(
            cleaned,
            json!({
                "killteamId": "IMP-AOD",
                "opTypes": [
                    {
                        "opTypeName": "Trooper",
                        "isPublished": true,
                        "weapons": [{"wepName": "Gun"}]
                    }
                ],
                "isDefault": "kept at root"
            })
        );
        assert_eq!(pruner.removed().len(), 4);
        assert!(pruner.removed().contains(&"/opTypes/weapons/isDefault".to_string()));
    }

    #[test]
    fn test_non_object_values_are_removed_too() {
        let rules = team_rules();
        let doc = json!({"userId": {"nested": 1}, "opTypes": "not a list"});
        let nothing = |_: &[String], _: &str| false;
        let cleaned = walk(&doc, &nothing, &mut FieldPruner::new(&rules));
        assert_eq!(cleaned, json!({"opTypes": "not a list"}));
    }
}
