//! JSON Schema validation for rules documents
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use crate::error::{RuleError, RuleResult};
use serde_json::Value;
use std::path::Path;

// Embed the schema at compile time for reliability
pub const RULESET_SCHEMA: &str = include_str!("../rules/ruleset.schema.json");

/// Validates raw rules documents against the embedded rule set schema
pub struct RuleSchemaValidator {
    schema: Value,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for RuleSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSchemaValidator")
            .field("schema_id", &self.schema.get("$id"))
            .finish()
    }
}

impl RuleSchemaValidator {
    /// Create a validator from the embedded schema
    pub fn new() -> RuleResult<Self> {
        let schema: Value =
            serde_json::from_str(RULESET_SCHEMA).map_err(|e| RuleError::SchemaCompile {
                reason: e.to_string(),
            })?;
        Self::from_schema(schema)
    }

    /// Create a validator from an explicit schema value
    pub fn from_schema(schema: Value) -> RuleResult<Self> {
        let validator = jsonschema::validator_for(&schema).map_err(|e| RuleError::SchemaCompile {
            reason: e.to_string(),
        })?;
        Ok(Self { schema, validator })
    }

    /// Get the JSON Schema definition
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Collect every violation in `document` (empty when valid)
    pub fn violations(&self, document: &Value) -> Vec<String> {
        self.validator
            .iter_errors(document)
            .map(|error| error.to_string())
            .collect()
    }

    /// Validate `document`, reporting all violations against `origin`
    pub fn validate(&self, document: &Value, origin: &Path) -> RuleResult<()> {
        let violations = self.violations(document);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(RuleError::Schema {
                path: origin.to_path_buf(),
                violations,
            })
        }
    }
}
