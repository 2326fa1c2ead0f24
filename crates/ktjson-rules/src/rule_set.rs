//! Classification rule set definitions
//!
//! A rule set maps a *document identity* (a file name such as `actions.json`,
//! or a family name such as `teams`) to the rules for that document: which
//! string fields are translated and which fields are pruned by `clean`.
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use crate::classify::{lookup_flag, DocumentClassifier};
use crate::error::{RuleError, RuleResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Nested field rules keyed by field name
pub type RuleTree = BTreeMap<String, RuleNode>;

/// One entry in a rule tree: either a terminal flag for a field, or a
/// subtree entered when the walk descends into that field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleNode {
    Flag(bool),
    Branch(RuleTree),
}

/// Deny-list policy: explicit exclusions, explicit inclusions, and a
/// name-shape heuristic for everything else
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicPolicy {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub include: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub exclude: BTreeSet<String>,
}

/// How the string fields of a document are selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationPolicy {
    /// Only fields reachable through the tree are selected
    Allow(RuleTree),
    /// Every field is selected unless excluded or identifier-shaped
    Heuristic(HeuristicPolicy),
}

/// Rules for one document identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<ClassificationPolicy>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prune: RuleTree,
}

impl DocumentRules {
    /// Whether `field` under `path` is deleted by the prune rules
    pub fn prunes(&self, path: &[String], field: &str) -> bool {
        lookup_flag(&self.prune, path, field)
    }
}

/// Maps a relative document path to an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMatcher {
    pub pattern: String,
    pub identity: String,
}

/// Serialized form of a rule set, as written in a rules file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetDefinition {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<IdentityMatcher>,
    #[serde(default)]
    pub documents: BTreeMap<String, DocumentRules>,
}

#[derive(Debug, Clone)]
struct CompiledMatcher {
    regex: Regex,
    identity: String,
}

/// A compiled, ready-to-query rule set
#[derive(Debug, Clone)]
pub struct RuleSet {
    definition: RuleSetDefinition,
    matchers: Vec<CompiledMatcher>,
}

impl RuleSet {
    /// Compile a definition, rejecting invalid identity patterns
    pub fn compile(definition: RuleSetDefinition) -> RuleResult<Self> {
        let matchers = definition
            .identities
            .iter()
            .map(|m| {
                Regex::new(&m.pattern)
                    .map(|regex| CompiledMatcher {
                        regex,
                        identity: m.identity.clone(),
                    })
                    .map_err(|source| RuleError::Pattern {
                        pattern: m.pattern.clone(),
                        source,
                    })
            })
            .collect::<RuleResult<Vec<_>>>()?;

        Ok(Self {
            definition,
            matchers,
        })
    }

    pub fn definition(&self) -> &RuleSetDefinition {
        &self.definition
    }

    pub fn version(&self) -> &str {
        &self.definition.version
    }

    /// Known document identities, sorted
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.definition.documents.keys().map(String::as_str)
    }

    /// Resolve the identity of a document from its path relative to the
    /// language root. The first matching pattern wins; otherwise the file
    /// name itself is the identity.
    pub fn resolve_identity(&self, relative_path: &str) -> String {
        let normalized = relative_path.replace('\\', "/");
        for matcher in &self.matchers {
            if matcher.regex.is_match(&normalized) {
                return matcher.identity.clone();
            }
        }
        normalized
            .rsplit('/')
            .next()
            .unwrap_or(normalized.as_str())
            .to_string()
    }

    /// Rules for an identity, if the identity is known
    pub fn document(&self, identity: &str) -> Option<&DocumentRules> {
        self.definition.documents.get(identity)
    }

    /// Classifier bound to one document identity
    pub fn classifier(&self, identity: &str) -> DocumentClassifier<'_> {
        DocumentClassifier::new(identity, self.document(identity))
    }

    /// Whether the string at `(identity, path, field)` is in scope for translation
    pub fn classify(&self, identity: &str, path: &[String], field: &str) -> bool {
        self.classifier(identity).translates(path, field)
    }

    /// Whether `(identity, path, field)` is removed by the prune rules
    pub fn prunes(&self, identity: &str, path: &[String], field: &str) -> bool {
        self.document(identity)
            .map(|rules| rules.prunes(path, field))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition_with_matchers(matchers: Vec<(&str, &str)>) -> RuleSetDefinition {
        RuleSetDefinition {
            version: "1".to_string(),
            description: None,
            identities: matchers
                .into_iter()
                .map(|(pattern, identity)| IdentityMatcher {
                    pattern: pattern.to_string(),
                    identity: identity.to_string(),
                })
                .collect(),
            documents: BTreeMap::new(),
        }
    }

    #[test]
    fn test_identity_falls_back_to_file_name() {
        let rules = RuleSet::compile(definition_with_matchers(vec![])).unwrap();
        assert_eq!(rules.resolve_identity("actions.json"), "actions.json");
        assert_eq!(rules.resolve_identity("sub/dir/actions.json"), "actions.json");
        assert_eq!(rules.resolve_identity("sub\\dir\\ops_2025.json"), "ops_2025.json");
    }

    #[test]
    fn test_first_matcher_wins() {
        let rules = RuleSet::compile(definition_with_matchers(vec![
            (r"(^|/)teams/[^/]+\.json$", "teams"),
            (r"\.json$", "anything"),
        ]))
        .unwrap();
        assert_eq!(rules.resolve_identity("teams/IMP-AOD.json"), "teams");
        assert_eq!(rules.resolve_identity("teams\\IMP-AOD.json"), "teams");
        assert_eq!(rules.resolve_identity("actions.json"), "anything");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = RuleSet::compile(definition_with_matchers(vec![("(", "broken")])).unwrap_err();
        assert!(matches!(err, RuleError::Pattern { .. }));
    }

    #[test]
    fn test_rule_node_deserializes_untagged() {
        let tree: RuleTree = serde_json::from_value(serde_json::json!({
            "name": true,
            "id": false,
            "opTypes": { "opTypeName": true }
        }))
        .unwrap();
        assert_eq!(tree["name"], RuleNode::Flag(true));
        assert_eq!(tree["id"], RuleNode::Flag(false));
        assert!(matches!(tree["opTypes"], RuleNode::Branch(_)));
    }

    #[test]
    fn test_policy_is_externally_tagged() {
        let policy: ClassificationPolicy = serde_json::from_value(serde_json::json!({
            "heuristic": { "exclude": ["type"] }
        }))
        .unwrap();
        match policy {
            ClassificationPolicy::Heuristic(h) => {
                assert!(h.exclude.contains("type"));
                assert!(h.include.is_empty());
            }
            other => panic!("unexpected policy: {other:?}"),
        }
    }
}
