//! Per-document results and the batch tally
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use super::stage::Stage;
use crate::error::{Error, ErrorKind};
use crate::types::Warning;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Final status of one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    Written,
    /// Nothing to do, or nothing written on purpose
    Skipped { reason: String },
    Failed { kind: ErrorKind, message: String },
    /// Stopped on user request; the destination is untouched
    Interrupted {
        #[serde(skip_serializing_if = "Option::is_none")]
        partial: Option<PathBuf>,
    },
}

impl DocumentStatus {
    pub fn skipped(reason: impl Into<String>) -> Self {
        DocumentStatus::Skipped {
            reason: reason.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentStatus::Written => "written",
            DocumentStatus::Skipped { .. } => "skipped",
            DocumentStatus::Failed { .. } => "failed",
            DocumentStatus::Interrupted { .. } => "interrupted",
        }
    }
}

impl From<&Error> for DocumentStatus {
    fn from(error: &Error) -> Self {
        DocumentStatus::Failed {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub identity: String,
    /// Last stage reached
    pub stage: Option<Stage>,
    pub status: DocumentStatus,
    /// Leaves changed or fields removed
    pub changes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl DocumentReport {
    pub fn new(source: PathBuf, destination: PathBuf, identity: impl Into<String>) -> Self {
        Self {
            source,
            destination,
            identity: identity.into(),
            stage: None,
            status: DocumentStatus::skipped("not started"),
            changes: 0,
            backup: None,
            warnings: Vec::new(),
        }
    }

    pub fn reached(&mut self, stage: Stage) {
        self.stage = Some(stage);
    }

    pub fn is_written(&self) -> bool {
        matches!(self.status, DocumentStatus::Written)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, DocumentStatus::Failed { .. })
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self.status, DocumentStatus::Interrupted { .. })
    }
}

/// Counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub interrupted: usize,
    pub warnings: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written, {} skipped, {} failed, {} interrupted",
            self.written, self.skipped, self.failed, self.interrupted
        )?;
        if self.warnings > 0 {
            write!(f, " ({} warnings)", self.warnings)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, report: DocumentReport) {
        self.documents.push(report);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for document in &self.documents {
            match document.status {
                DocumentStatus::Written => summary.written += 1,
                DocumentStatus::Skipped { .. } => summary.skipped += 1,
                DocumentStatus::Failed { .. } => summary.failed += 1,
                DocumentStatus::Interrupted { .. } => summary.interrupted += 1,
            }
            summary.warnings += document.warnings.len();
        }
        summary
    }

    pub fn has_failures(&self) -> bool {
        self.documents.iter().any(DocumentReport::is_failed)
    }

    pub fn was_interrupted(&self) -> bool {
        self.documents.iter().any(DocumentReport::is_interrupted)
    }

    pub fn failures(&self) -> impl Iterator<Item = &DocumentReport> {
        self.documents.iter().filter(|d| d.is_failed())
    }
}
