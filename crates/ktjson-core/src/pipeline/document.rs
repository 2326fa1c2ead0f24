//! Load, validate, transform, re-validate and write one document at a time
//!
//! A failure at any stage ends that document only: the destination is left
//! as it was and the batch moves on. Translation may be interrupted; its
//! partial result then goes to a `.partial` sibling, never the destination.
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use super::interrupt::Interrupt;
use super::report::{BatchReport, DocumentReport, DocumentStatus};
use super::shape::ShapeExpectation;
use super::stage::Stage;
use super::writer::{partial_path, revalidate, write_atomic, write_backup};
use crate::transform::{FieldPruner, NormalizationStats, Normalizer, UnitCollector, UnitWriter};
use crate::translate::{TranslationProgress, Translator};
use crate::walker::walk;
use crate::{Error, Result};
use ktjson_rules::RuleSet;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One document to process
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentJob {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Rule identity, from [`RuleSet::resolve_identity`]
    pub identity: String,
    pub shape: ShapeExpectation,
    /// Write `source.backup` before overwriting
    pub backup: bool,
}

impl DocumentJob {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        identity: impl Into<String>,
    ) -> Self {
        let source = source.into();
        Self {
            shape: ShapeExpectation::for_document(&source),
            destination: destination.into(),
            identity: identity.into(),
            backup: false,
            source,
        }
    }

    /// Rewrite `path` itself, keeping a backup of the original bytes
    pub fn in_place(path: impl Into<PathBuf>, identity: impl Into<String>) -> Self {
        let path = path.into();
        let mut job = Self::new(path.clone(), path, identity);
        job.backup = true;
        job
    }

    pub fn with_shape(mut self, shape: ShapeExpectation) -> Self {
        self.shape = shape;
        self
    }

    pub fn without_backup(mut self) -> Self {
        self.backup = false;
        self
    }

    pub fn is_in_place(&self) -> bool {
        self.source == self.destination
    }

    pub fn name(&self) -> String {
        self.source.display().to_string()
    }

    fn report(&self) -> DocumentReport {
        DocumentReport::new(
            self.source.clone(),
            self.destination.clone(),
            self.identity.clone(),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Run every stage but write nothing
    pub dry_run: bool,
    /// On interrupt, write the partial translation to a `.partial` sibling
    pub checkpoint_on_interrupt: bool,
}

/// Receives progress from batch runs
pub trait PipelineObserver: Send {
    fn document_started(&mut self, _job: &DocumentJob, _index: usize, _total: usize) {}

    fn translation_progress(&mut self, _job: &DocumentJob, _progress: TranslationProgress) {}

    fn document_finished(&mut self, _report: &DocumentReport) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct Silent;

impl PipelineObserver for Silent {}

pub struct DocumentPipeline<'r> {
    rules: &'r RuleSet,
    options: PipelineOptions,
    interrupt: Interrupt,
}

impl<'r> DocumentPipeline<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self {
            rules,
            options: PipelineOptions::default(),
            interrupt: Interrupt::new(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    pub fn rules(&self) -> &RuleSet {
        self.rules
    }

    /// Replace the fixed Unicode characters in every string leaf. Zero
    /// replacements skips the document.
    pub fn normalize(&self, job: &DocumentJob) -> (DocumentReport, NormalizationStats) {
        let mut stats = NormalizationStats::default();
        let report = self.transform_with(job, |value, report| {
            let mut normalizer = Normalizer::new();
            let fixed = normalizer.normalize_value(value);
            stats = normalizer.into_stats();
            report.changes = stats.total;
            if stats.is_empty() {
                Ok(None)
            } else {
                Ok(Some(fixed))
            }
        });
        (report, stats)
    }

    /// Remove the fields the prune rules name. No removals skips the document.
    pub fn clean(&self, job: &DocumentJob) -> DocumentReport {
        let rules = self.rules.document(&job.identity);
        self.transform_with(job, |value, report| {
            let Some(rules) = rules else {
                return Ok(None);
            };
            let mut pruner = FieldPruner::new(rules);
            let never = |_: &[String], _: &str| false;
            let cleaned = walk(value, &never, &mut pruner);
            report.changes = pruner.removed().len();
            debug!(document = %job.name(), removed = ?pruner.removed(), "pruned fields");
            Ok((report.changes > 0).then_some(cleaned))
        })
    }

    /// Run a synchronous transform through every stage. `transform` returns
    /// `None` when the document needs no rewrite.
    pub fn transform_with<F>(&self, job: &DocumentJob, transform: F) -> DocumentReport
    where
        F: FnOnce(&Value, &mut DocumentReport) -> Result<Option<Value>>,
    {
        let mut report = job.report();
        let result = self.load(job, &mut report).and_then(|value| {
            match transform(&value, &mut report)? {
                Some(transformed) => {
                    report.reached(Stage::Transformed);
                    self.finish(job, &transformed, &mut report)
                }
                None => Ok(DocumentStatus::skipped("no changes")),
            }
        });
        self.conclude(job, report, result)
    }

    /// Translate the in-scope strings of one document
    pub async fn translate(
        &self,
        job: &DocumentJob,
        translator: &Translator,
        progress: &mut (dyn FnMut(TranslationProgress) + Send),
    ) -> DocumentReport {
        let mut report = job.report();
        let result = self.run_translation(job, translator, progress, &mut report).await;
        self.conclude(job, report, result)
    }

    async fn run_translation(
        &self,
        job: &DocumentJob,
        translator: &Translator,
        progress: &mut (dyn FnMut(TranslationProgress) + Send),
        report: &mut DocumentReport,
    ) -> Result<DocumentStatus> {
        let value = self.load(job, report)?;
        let classifier = self.rules.classifier(&job.identity);
        if !classifier.is_known() {
            return Ok(DocumentStatus::skipped(format!(
                "no rules for '{}'",
                job.identity
            )));
        }

        let mut collector = UnitCollector::new();
        walk(&value, &classifier, &mut collector);
        if collector.is_empty() {
            return Ok(DocumentStatus::skipped("no translatable strings"));
        }
        let mut units = collector.into_units();
        debug!(document = %job.name(), units = units.len(), "collected translation units");

        let interrupted = if self.interrupt.is_triggered() {
            true
        } else {
            tokio::select! {
                outcome = translator.translate_units(&mut units, &mut *progress) => {
                    report.changes = outcome.translated + outcome.from_glossary;
                    report.warnings.extend(outcome.warnings);
                    false
                }
                _ = self.interrupt.triggered() => true,
            }
        };

        let mut writer = UnitWriter::new(&units);
        let translated = walk(&value, &classifier, &mut writer);
        report.reached(Stage::Transformed);

        if interrupted {
            report.changes = writer.applied();
            return self.checkpoint(job, &translated, report);
        }
        self.finish(job, &translated, report)
    }

    /// Translate every job in order. Stops starting new documents once
    /// interrupted; those are reported as skipped.
    pub async fn translate_all(
        &self,
        jobs: &[DocumentJob],
        translator: &Translator,
        observer: &mut dyn PipelineObserver,
    ) -> BatchReport {
        let mut batch = BatchReport::new();
        let total = jobs.len();

        for (index, job) in jobs.iter().enumerate() {
            if self.interrupt.is_triggered() {
                let mut report = job.report();
                report.status = DocumentStatus::skipped("run interrupted");
                batch.push(report);
                continue;
            }

            observer.document_started(job, index, total);
            let report = {
                let mut progress = |p: TranslationProgress| observer.translation_progress(job, p);
                self.translate(job, translator, &mut progress).await
            };
            observer.document_finished(&report);
            batch.push(report);
        }
        batch
    }

    /// Run a synchronous per-document operation over every job
    pub fn run_all<F>(
        &self,
        jobs: &[DocumentJob],
        observer: &mut dyn PipelineObserver,
        mut operation: F,
    ) -> BatchReport
    where
        F: FnMut(&Self, &DocumentJob) -> DocumentReport,
    {
        let mut batch = BatchReport::new();
        let total = jobs.len();
        for (index, job) in jobs.iter().enumerate() {
            observer.document_started(job, index, total);
            let report = operation(self, job);
            observer.document_finished(&report);
            batch.push(report);
        }
        batch
    }

    /// Read, parse and shape-check. In-place jobs get their backup here,
    /// once the original is known to be JSON.
    fn load(&self, job: &DocumentJob, report: &mut DocumentReport) -> Result<Value> {
        let bytes = fs::read(&job.source)
            .map_err(|e| Error::io(format!("Failed to read {}", job.source.display()), e))?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            Error::structural(job.name(), format!("invalid JSON: {}", e), Some(e))
        })?;
        report.reached(Stage::Loaded);
        debug!(document = %job.name(), stage = %Stage::Loaded, bytes = bytes.len());

        if job.backup && !self.options.dry_run {
            let backup = write_backup(&job.source, &bytes)?;
            debug!(backup = %backup.display(), "wrote backup");
            report.backup = Some(backup);
        }

        job.shape
            .check(&value)
            .map_err(|message| Error::structural(job.name(), message, None))?;
        report.reached(Stage::Validated);
        Ok(value)
    }

    fn finish(
        &self,
        job: &DocumentJob,
        value: &Value,
        report: &mut DocumentReport,
    ) -> Result<DocumentStatus> {
        let text = revalidate(value, &job.name())?;
        report.reached(Stage::ReValidated);

        if self.options.dry_run {
            return Ok(DocumentStatus::skipped("dry run"));
        }

        write_atomic(&job.destination, text.as_bytes())?;
        report.reached(Stage::Written);
        info!(
            document = %job.name(),
            destination = %job.destination.display(),
            changes = report.changes,
            "wrote document"
        );
        Ok(DocumentStatus::Written)
    }

    fn checkpoint(
        &self,
        job: &DocumentJob,
        value: &Value,
        report: &mut DocumentReport,
    ) -> Result<DocumentStatus> {
        if !self.options.checkpoint_on_interrupt || self.options.dry_run {
            return Ok(DocumentStatus::Interrupted { partial: None });
        }
        let text = revalidate(value, &job.name())?;
        report.reached(Stage::ReValidated);
        let partial = partial_path(&job.destination);
        write_atomic(&partial, text.as_bytes())?;
        warn!(partial = %partial.display(), "interrupted, wrote partial result");
        Ok(DocumentStatus::Interrupted {
            partial: Some(partial),
        })
    }

    fn conclude(
        &self,
        job: &DocumentJob,
        mut report: DocumentReport,
        result: Result<DocumentStatus>,
    ) -> DocumentReport {
        report.status = match result {
            Ok(status) => status,
            Err(error) => {
                warn!(document = %job.name(), kind = %error.kind(), "{}", error);
                DocumentStatus::from(&error)
            }
        };
        report
    }
}

/// Relative `/`-separated path of `path` under `root`, used for identity
/// resolution
pub fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
