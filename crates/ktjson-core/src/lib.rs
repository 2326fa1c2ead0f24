//! Ktjson Core - field-selective transforms for game-data JSON
//!
//! This crate walks JSON documents and rewrites only the string fields a
//! rule set puts in scope, leaving key order, array order and every other
//! value as they were.
//!
//! # Main Components
//!
//! - **Tree Walker**: path-threading traversal with array transparency
//! - **Leaf Transforms**: translation units, Unicode normalization, field pruning
//! - **Providers**: Google web and DeepL backends behind one trait
//! - **Translator**: glossary, batching, throttle and single retry
//! - **Document Pipeline**: load, validate, transform, re-validate, write
//! - **Operations**: split/join team files, merge action lists
//!
//! # Example
//!
//! ```
//! use ktjson_core::walker::walk;
//! use serde_json::json;
//!
//! let in_scope = |_: &[String], field: &str| field == "name" || field == "effects";
//! let doc = json!({"name": "Shoot", "id": "act-01", "effects": ["Deal 1 damage"]});
//! let shouted = walk(&doc, &in_scope, &mut |text: &str| text.to_uppercase());
//!
//! assert_eq!(
//!     shouted,
//!     json!({"name": "SHOOT", "id": "act-01", "effects": ["DEAL 1 DAMAGE"]})
//! );
//! ```

pub mod discovery;
pub mod error;
pub mod http;
pub mod ops;
pub mod pipeline;
pub mod provider;
pub mod transform;
pub mod translate;
pub mod types;
pub mod walker;

// Re-export main types for convenience
pub use error::{Error, ErrorKind, Result};
pub use pipeline::{
    BatchReport, DocumentJob, DocumentPipeline, DocumentReport, DocumentStatus, Interrupt,
    PipelineObserver, PipelineOptions, ShapeExpectation, Stage,
};
pub use provider::{ProviderConfig, ProviderKind, TranslationProvider, Usage};
pub use translate::{TranslationMode, TranslationOutcome, TranslationProgress, Translator};
pub use types::{FieldPath, LanguageCode, TranslationUnit, Warning};
pub use walker::{walk, ArrayShape, Leaf, LeafEvent, LeafTransform, Walker};

pub use ktjson_rules::{FieldClassifier, RuleSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
