//! Newline-joined batching under a character budget
//!
//! Texts are joined with `\n` into one provider call and split back on
//! `\n`. A text that itself contains a newline would break the split, so it
//! always travels alone.
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

/// Separator between texts in a batched payload
pub const BATCH_SEPARATOR: char = '\n';

/// Estimated request size of `text`: twice its length, for URL-encoding growth
pub fn estimated_size(text: &str) -> usize {
    text.chars().count() * 2
}

/// Indices of the texts sent together in one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub indices: Vec<usize>,
    pub estimated_size: usize,
}

impl Batch {
    fn new() -> Self {
        Self {
            indices: Vec::new(),
            estimated_size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// A batch of one is sent verbatim and its answer taken whole
    pub fn is_single(&self) -> bool {
        self.indices.len() == 1
    }

    /// The request payload for this batch
    pub fn payload(&self, texts: &[&str]) -> String {
        let mut payload = String::new();
        for (n, &index) in self.indices.iter().enumerate() {
            if n > 0 {
                payload.push(BATCH_SEPARATOR);
            }
            payload.push_str(texts[index]);
        }
        payload
    }
}

/// Group `texts` greedily, in order, so that no batch of two or more texts
/// exceeds `budget` estimated characters. An oversized text gets a batch of
/// its own.
pub fn plan_batches(texts: &[&str], budget: usize) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut current = Batch::new();

    for (index, text) in texts.iter().enumerate() {
        let size = estimated_size(text);

        if text.contains(BATCH_SEPARATOR) {
            if !current.is_empty() {
                batches.push(std::mem::replace(&mut current, Batch::new()));
            }
            batches.push(Batch {
                indices: vec![index],
                estimated_size: size,
            });
            continue;
        }

        if !current.is_empty() && current.estimated_size + size > budget {
            batches.push(std::mem::replace(&mut current, Batch::new()));
        }
        current.indices.push(index);
        current.estimated_size += size;
    }

    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Split a batched answer back into `expected` lines: missing lines are
/// padded with empty strings, extra lines dropped
pub fn split_response(response: &str, expected: usize) -> Vec<String> {
    let mut lines: Vec<String> = response
        .split(BATCH_SEPARATOR)
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();
    lines.resize(expected, String::new());
    lines
}
