use serde::Serialize;
use std::fmt;

/// Steps a document passes through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Bytes read and parsed as JSON
    Loaded,
    /// Top-level shape matches the expectation
    Validated,
    /// Walker applied
    Transformed,
    /// Serialized and parsed back
    ReValidated,
    /// Persisted to the destination
    Written,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loaded => "loaded",
            Stage::Validated => "validated",
            Stage::Transformed => "transformed",
            Stage::ReValidated => "re-validated",
            Stage::Written => "written",
        };
        f.write_str(name)
    }
}
