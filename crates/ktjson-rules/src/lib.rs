//! Ktjson Rules - field classification rule sets
//!
//! This crate decides which string fields of a game-data JSON document are in
//! scope for a transformation. It provides:
//! - **Rule sets**: per-document translation policies and prune trees
//! - **Classification**: fail-closed allow-list lookup and a deny-list
//!   policy with an identifier heuristic
//! - **Loading**: YAML and JSON rules files validated against an embedded
//!   JSON Schema, bundled defaults, and mtime-based reload
//!
//! ## Quick Start
//!
//! ```rust
//! use ktjson_rules::default_rules;
//!
//! let rules = default_rules().unwrap();
//! let identity = rules.resolve_identity("teams/IMP-AOD.json");
//! assert_eq!(identity, "teams");
//!
//! let path = vec!["opTypes".to_string(), "weapons".to_string()];
//! assert!(rules.classify(&identity, &path, "wepName"));
//! assert!(!rules.classify(&identity, &path, "wepId"));
//! ```
//!
//! ## Rules file format
//!
//! ```yaml
//! version: "1"
//! identities:
//!   - pattern: '(^|/)teams/[^/]+\.json$'
//!     identity: teams
//! documents:
//!   actions.json:
//!     translate:
//!       allow:
//!         actions: { name: true, effects: true }
//!   teams:
//!     translate:
//!       heuristic: { exclude: [type] }
//!     prune:
//!       isPublished: true
//! ```
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

pub mod classify;
pub mod error;
pub mod loader;
pub mod parser;
pub mod rule_set;
pub mod schema;

// Re-export commonly used types for convenience
pub use classify::{looks_like_identifier, AllFields, DocumentClassifier, FieldClassifier};
pub use error::{RuleError, RuleResult};
pub use loader::{default_rules, BundledRules, ReloadableRules, RuleLoader, RuleSource};
pub use parser::{Format, RuleParser};
pub use rule_set::{
    ClassificationPolicy, DocumentRules, HeuristicPolicy, IdentityMatcher, RuleNode, RuleSet,
    RuleSetDefinition, RuleTree,
};
pub use schema::RuleSchemaValidator;
