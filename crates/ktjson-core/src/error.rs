//! Error types for the ktjson core library
//!
//! Every failure is classified by [`ErrorKind`] so batch drivers can decide
//! whether it ends one document or the whole run.

use crate::http::HttpError;
use ktjson_rules::RuleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for ktjson operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input is not JSON, or its top-level shape is wrong
    #[error("Structural error in {document}: {message}")]
    Structural {
        document: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A single leaf could not be transformed
    #[error("Transform failed at {pointer}: {message}")]
    Transform { pointer: String, message: String },

    /// The transformed document did not serialize or round-trip
    #[error("Post-transform validation failed for {document}: {message}")]
    PostTransform {
        document: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Translation backend errors
    #[error("Provider error: {provider} - {message}")]
    Provider {
        provider: String,
        message: String,
        #[source]
        source: Option<HttpError>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors, raised before any document is touched
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Rules could not be loaded
    #[error("Rules error: {0}")]
    Rules(#[from] RuleError),

    /// The run was interrupted before the document finished
    #[error("Interrupted: {message}")]
    Interrupted { message: String },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// How far an error reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Fatal for the document; batch continues
    Structural,
    /// Recovered locally; the leaf keeps its original text
    Transform,
    /// Fatal for the document; original untouched
    PostTransform,
    /// Fatal for the document; batch continues
    Io,
    /// Fatal for the run
    Configuration,
    /// The document stopped early on user request
    Interrupted,
}

impl ErrorKind {
    /// Whether this kind ends the whole run rather than one document
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, ErrorKind::Configuration)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Structural => write!(f, "structural"),
            ErrorKind::Transform => write!(f, "transform"),
            ErrorKind::PostTransform => write!(f, "post-transform"),
            ErrorKind::Io => write!(f, "io"),
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Structural { .. } => ErrorKind::Structural,
            Error::Transform { .. } | Error::Provider { .. } => ErrorKind::Transform,
            Error::PostTransform { .. } => ErrorKind::PostTransform,
            Error::Io { .. } => ErrorKind::Io,
            Error::Configuration { .. } | Error::Rules(_) => ErrorKind::Configuration,
            Error::Interrupted { .. } => ErrorKind::Interrupted,
        }
    }

    /// Create a structural error for a document
    pub fn structural(
        document: impl Into<String>,
        message: impl Into<String>,
        source: Option<serde_json::Error>,
    ) -> Self {
        Error::Structural {
            document: document.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an IO error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
