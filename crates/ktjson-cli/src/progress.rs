//! Progress bars driven by pipeline callbacks

use crate::output::OutputWriter;
use indicatif::{MultiProgress, ProgressBar};
use ktjson_core::pipeline::{DocumentJob, DocumentReport, DocumentStatus, PipelineObserver};
use ktjson_core::TranslationProgress;

/// A documents bar and, below it, a strings bar for the current document
pub struct ProgressObserver {
    multi: MultiProgress,
    documents: ProgressBar,
    strings: ProgressBar,
}

impl ProgressObserver {
    /// `None` when the writer does not show progress
    pub fn new(output: &OutputWriter, total: usize) -> Option<Self> {
        let documents = output.progress_bar(total as u64, "documents")?;
        let strings = output.progress_bar(0, "strings")?;
        let multi = MultiProgress::new();
        let documents = multi.add(documents);
        let strings = multi.add(strings);
        Some(Self {
            multi,
            documents,
            strings,
        })
    }

    pub fn finish(&self) {
        self.strings.finish_and_clear();
        self.documents.finish_and_clear();
    }
}

impl PipelineObserver for ProgressObserver {
    fn document_started(&mut self, job: &DocumentJob, index: usize, _total: usize) {
        self.documents.set_position(index as u64);
        self.documents.set_message(job.name());
        self.strings.reset();
        self.strings.set_length(0);
    }

    fn translation_progress(&mut self, _job: &DocumentJob, progress: TranslationProgress) {
        self.strings.set_length(progress.total as u64);
        self.strings.set_position(progress.done as u64);
    }

    fn document_finished(&mut self, report: &DocumentReport) {
        self.documents.inc(1);
        if let DocumentStatus::Failed { message, .. } = &report.status {
            let _ = self
                .multi
                .println(format!("✗ {}: {}", report.source.display(), message));
        }
    }
}
