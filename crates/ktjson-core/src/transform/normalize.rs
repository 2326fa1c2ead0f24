//! Ambiguous Unicode normalization and analysis
//!
//! Typographic quotes, dashes, non-breaking spaces, ellipses and a handful of
//! circumflexed letters that show up in mis-encoded rules text are replaced
//! by plain ASCII. Every replacement produces ASCII, so normalization is
//! idempotent.
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use crate::walker::{Leaf, LeafTransform};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Fixed substitution table
pub const UNICODE_TO_ASCII: [(char, &str); 12] = [
    ('\u{2019}', "'"),
    ('\u{2018}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{00A0}', " "),
    ('\u{2026}', "..."),
    ('\u{00C2}', "A"),
    ('\u{00D4}', "O"),
    ('\u{00E2}', "a"),
    ('\u{00F4}', "o"),
];

/// Number of sample locations kept by [`analyze`]
const SAMPLE_LOCATIONS: usize = 5;
/// Characters of context on each side of a sample location
const CONTEXT_RADIUS: usize = 20;

/// ASCII replacement for `c`, if it is in the table
pub fn ascii_equivalent(c: char) -> Option<&'static str> {
    UNICODE_TO_ASCII
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

/// Replacement counts, total and per character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationStats {
    pub total: usize,
    pub per_char: BTreeMap<char, usize>,
}

impl NormalizationStats {
    fn record(&mut self, c: char) {
        self.total += 1;
        *self.per_char.entry(c).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn merge(&mut self, other: &NormalizationStats) {
        self.total += other.total;
        for (c, count) in &other.per_char {
            *self.per_char.entry(*c).or_insert(0) += count;
        }
    }
}

/// Normalize `text` with the fixed table
pub fn normalize(text: &str) -> String {
    normalize_counted(text, &mut NormalizationStats::default())
}

/// Normalize `text`, recording each replacement in `stats`
pub fn normalize_counted(text: &str, stats: &mut NormalizationStats) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match ascii_equivalent(c) {
            Some(replacement) => {
                stats.record(c);
                out.push_str(replacement);
            }
            None => out.push(c),
        }
    }
    out
}

/// Leaf transform applying [`normalize`] and accumulating statistics
#[derive(Debug, Default)]
pub struct Normalizer {
    stats: NormalizationStats,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    pub fn into_stats(self) -> NormalizationStats {
        self.stats
    }

    /// Normalize every string in `value`, whatever its field name or
    /// position. Keys and non-string scalars are kept as they are.
    pub fn normalize_value(&mut self, value: &Value) -> Value {
        match value {
            Value::String(text) => Value::String(normalize_counted(text, &mut self.stats)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.normalize_value(item)).collect())
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, child)| (key.clone(), self.normalize_value(child)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl LeafTransform for Normalizer {
    fn transform(&mut self, leaf: &Leaf<'_>) -> String {
        normalize_counted(leaf.text, &mut self.stats)
    }
}

/// Occurrences of one non-ASCII character
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharCount {
    pub character: char,
    pub codepoint: String,
    pub count: usize,
    pub ascii: Option<&'static str>,
}

/// Where a non-ASCII character was found in the raw text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// 1-based line
    pub line: usize,
    /// 0-based column, in characters
    pub column: usize,
    /// Surrounding text with newlines shown as `\n`
    pub context: String,
}

/// Non-ASCII characters found in a raw document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnicodeReport {
    pub total: usize,
    /// Most frequent first
    pub counts: Vec<CharCount>,
    /// The first few locations, in document order
    pub samples: Vec<Location>,
}

impl UnicodeReport {
    pub fn is_clean(&self) -> bool {
        self.total == 0
    }

    /// Occurrences that the fixed table would replace
    pub fn fixable(&self) -> usize {
        self.counts
            .iter()
            .filter(|c| c.ascii.is_some())
            .map(|c| c.count)
            .sum()
    }
}

/// Report every non-ASCII character in `content` (tabs and line breaks are
/// ASCII and never reported)
pub fn analyze(content: &str) -> UnicodeReport {
    let chars: Vec<char> = content.chars().collect();
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut samples = Vec::new();
    let mut total = 0;

    let mut line = 1;
    let mut column = 0;
    for (index, &c) in chars.iter().enumerate() {
        if !c.is_ascii() {
            total += 1;
            *counts.entry(c).or_insert(0) += 1;
            if samples.len() < SAMPLE_LOCATIONS {
                samples.push(Location {
                    line,
                    column,
                    context: context_around(&chars, index),
                });
            }
        }

        if c == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }

    let mut counts: Vec<CharCount> = counts
        .into_iter()
        .map(|(character, count)| CharCount {
            character,
            codepoint: format!("U+{:04X}", character as u32),
            count,
            ascii: ascii_equivalent(character),
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.character.cmp(&b.character)));

    UnicodeReport {
        total,
        counts,
        samples,
    }
}

fn context_around(chars: &[char], index: usize) -> String {
    let start = index.saturating_sub(CONTEXT_RADIUS);
    let end = (index + CONTEXT_RADIUS).min(chars.len());
    chars[start..end]
        .iter()
        .map(|c| if *c == '\n' { "\\n".to_string() } else { c.to_string() })
        .collect()
}
