//! Leaf transforms plugged into the tree walker
//!
//! - [`normalize`]: fixed Unicode-to-ASCII substitution, plus raw-text analysis
//! - [`prune`]: field deletion from a document's prune tree
//! - [`units`]: translation unit collection and pointer write-back
//! - [`glossary`]: exact-match terms resolved before any provider call
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

pub mod glossary;
pub mod normalize;
pub mod prune;
pub mod units;

pub use glossary::Glossary;
pub use normalize::{
    analyze, ascii_equivalent, normalize, normalize_counted, NormalizationStats, Normalizer,
    UnicodeReport,
};
pub use prune::FieldPruner;
pub use units::{UnitCollector, UnitWriter};
