//! Minimal top-level shape checks run before a document is transformed
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeExpectation {
    Any,
    Object,
    Array,
    /// An object whose named field is an array
    ObjectWithArray(String),
}

impl ShapeExpectation {
    /// Expectation for a document from its file name: `teams.json` is the
    /// team collection, `actions.json` holds an `actions` array and a single
    /// team file under `teams/` is an object
    pub fn for_document(path: &Path) -> Self {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let in_teams_dir = path
            .parent()
            .and_then(Path::file_name)
            .map(|dir| dir == "teams")
            .unwrap_or(false);

        match file_name {
            "teams.json" => ShapeExpectation::Array,
            "actions.json" | "universal_actions.json" | "mission_actions.json" => {
                ShapeExpectation::ObjectWithArray("actions".to_string())
            }
            _ if in_teams_dir => ShapeExpectation::Object,
            _ => ShapeExpectation::Any,
        }
    }

    /// `Err` carries a description of the mismatch
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            ShapeExpectation::Any => Ok(()),
            ShapeExpectation::Object if value.is_object() => Ok(()),
            ShapeExpectation::Array if value.is_array() => Ok(()),
            ShapeExpectation::ObjectWithArray(field) => match value {
                Value::Object(map) => match map.get(field) {
                    Some(Value::Array(_)) => Ok(()),
                    Some(other) => Err(format!(
                        "expected '{}' to be an array, found {}",
                        field,
                        kind_of(other)
                    )),
                    None => Err(format!("missing '{}' array", field)),
                },
                other => Err(format!("expected an object, found {}", kind_of(other))),
            },
            _ => Err(format!("expected {}, found {}", self, kind_of(value))),
        }
    }
}

impl fmt::Display for ShapeExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeExpectation::Any => write!(f, "any JSON value"),
            ShapeExpectation::Object => write!(f, "an object"),
            ShapeExpectation::Array => write!(f, "an array"),
            ShapeExpectation::ObjectWithArray(field) => {
                write!(f, "an object with an '{}' array", field)
            }
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
