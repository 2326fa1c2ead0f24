//! Field classification
//!
//! Decides whether the string found at `(ancestor path, field name)` inside a
//! document is in scope. Classification is fail-closed: unknown documents,
//! unknown paths and unknown fields are never selected by an allow-list.
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use crate::rule_set::{ClassificationPolicy, DocumentRules, HeuristicPolicy, RuleNode, RuleTree};

/// Suffixes that mark a field as an identifier under the heuristic policy
const IDENTIFIER_SUFFIXES: [&str; 4] = ["id", "_id", "code", "_code"];

/// Anything that can answer "is this field in scope?"
pub trait FieldClassifier {
    fn classify(&self, path: &[String], field: &str) -> bool;
}

impl<F> FieldClassifier for F
where
    F: Fn(&[String], &str) -> bool,
{
    fn classify(&self, path: &[String], field: &str) -> bool {
        self(path, field)
    }
}

/// Selects every field. Used by whole-document transforms such as
/// character normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllFields;

impl FieldClassifier for AllFields {
    fn classify(&self, _path: &[String], _field: &str) -> bool {
        true
    }
}

/// Translation classifier bound to one document identity
#[derive(Debug, Clone)]
pub struct DocumentClassifier<'a> {
    identity: String,
    rules: Option<&'a DocumentRules>,
}

impl<'a> DocumentClassifier<'a> {
    pub fn new(identity: impl Into<String>, rules: Option<&'a DocumentRules>) -> Self {
        Self {
            identity: identity.into(),
            rules,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Whether the identity has any rules at all
    pub fn is_known(&self) -> bool {
        self.rules.is_some()
    }

    pub fn translates(&self, path: &[String], field: &str) -> bool {
        match self.rules.and_then(|rules| rules.translate.as_ref()) {
            Some(ClassificationPolicy::Allow(tree)) => lookup_flag(tree, path, field),
            Some(ClassificationPolicy::Heuristic(policy)) => policy.allows(field),
            None => false,
        }
    }

    pub fn prunes(&self, path: &[String], field: &str) -> bool {
        self.rules
            .map(|rules| rules.prunes(path, field))
            .unwrap_or(false)
    }
}

impl FieldClassifier for DocumentClassifier<'_> {
    fn classify(&self, path: &[String], field: &str) -> bool {
        self.translates(path, field)
    }
}

impl HeuristicPolicy {
    /// Exclusions win, then inclusions, then the identifier heuristic
    pub fn allows(&self, field: &str) -> bool {
        if self.exclude.contains(field) {
            return false;
        }
        if self.include.contains(field) {
            return true;
        }
        !looks_like_identifier(field)
    }
}

/// `true` for names that start with `_` or end (case-insensitively) in
/// `id`, `_id`, `code` or `_code`
pub fn looks_like_identifier(field: &str) -> bool {
    if field.starts_with('_') {
        return true;
    }
    let lower = field.to_lowercase();
    IDENTIFIER_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
}

/// Walk `tree` along `path` and read the flag for `field`.
///
/// A missing segment, or a segment that lands on a flag before the path is
/// consumed, yields `false`. A field that maps to a subtree is not a flag and
/// also yields `false`.
pub fn lookup_flag(tree: &RuleTree, path: &[String], field: &str) -> bool {
    let mut node = tree;
    for segment in path {
        match node.get(segment) {
            Some(RuleNode::Branch(child)) => node = child,
            _ => return false,
        }
    }
    matches!(node.get(field), Some(RuleNode::Flag(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> RuleTree {
        serde_json::from_value(value).unwrap()
    }

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_allow_list_nested_lookup() {
        let rules = tree(json!({
            "opTypes": {
                "opTypeName": true,
                "weapons": { "wepName": true, "profiles": { "profileName": true } }
            }
        }));

        assert!(lookup_flag(&rules, &path(&["opTypes"]), "opTypeName"));
        assert!(lookup_flag(&rules, &path(&["opTypes", "weapons"]), "wepName"));
        assert!(lookup_flag(
            &rules,
            &path(&["opTypes", "weapons", "profiles"]),
            "profileName"
        ));
    }

    #[test]
    fn test_allow_list_fails_closed() {
        let rules = tree(json!({ "actions": { "name": true, "id": false } }));

        assert!(!lookup_flag(&rules, &path(&["actions"]), "id"));
        assert!(!lookup_flag(&rules, &path(&["actions"]), "unknown"));
        assert!(!lookup_flag(&rules, &path(&["other"]), "name"));
        assert!(!lookup_flag(&rules, &[], "name"));
        // path runs into a flag before it is consumed
        assert!(!lookup_flag(&rules, &path(&["actions", "name"]), "name"));
        // a subtree is not a flag
        assert!(!lookup_flag(&rules, &[], "actions"));
    }

    #[test]
    fn test_identifier_heuristic() {
        for name in ["id", "killteamId", "opId", "USER_ID", "factionCode", "_internal", "code"] {
            assert!(looks_like_identifier(name), "{name} should look like an identifier");
        }
        for name in ["name", "description", "effects", "title"] {
            assert!(!looks_like_identifier(name), "{name} should not look like an identifier");
        }
    }

    #[test]
    fn test_heuristic_exclude_wins_over_include() {
        let policy = HeuristicPolicy {
            include: ["type".to_string(), "teamId".to_string()].into_iter().collect(),
            exclude: ["type".to_string()].into_iter().collect(),
        };
        assert!(!policy.allows("type"));
        assert!(policy.allows("teamId"));
        assert!(!policy.allows("otherId"));
        assert!(policy.allows("flavour"));
    }

    #[test]
    fn test_unknown_document_never_classifies() {
        let classifier = DocumentClassifier::new("unknown.json", None);
        assert!(!classifier.is_known());
        assert!(!classifier.translates(&[], "name"));
        assert!(!classifier.prunes(&[], "name"));
    }

    #[test]
    fn test_closure_classifier() {
        let only_names = |_: &[String], field: &str| field == "name";
        assert!(only_names.classify(&[], "name"));
        assert!(!only_names.classify(&[], "id"));
        assert!(AllFields.classify(&path(&["a", "b"]), "anything"));
    }
}
