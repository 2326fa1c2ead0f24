//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), with specialized
//! human renderings for batch reports and Unicode reports.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use ktjson_core::pipeline::{BatchReport, DocumentReport, DocumentStatus};
use ktjson_core::transform::UnicodeReport;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tracing::{debug, trace};

/// Characters listed in the human Unicode report
const TOP_CHARACTERS: usize = 10;

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a batch report with one line per document and the tally
    fn format_batch_report(&self, report: &BatchReport, use_color: bool) -> Result<String>;

    /// Format the non-ASCII characters found in one file
    fn format_unicode_report(&self, file: &str, report: &UnicodeReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_batch_report(&self, report: &BatchReport, use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_batch_report_human(report, use_color)),
            _ => self.format(&BatchOutput::from(report)),
        }
    }

    fn format_unicode_report(&self, file: &str, report: &UnicodeReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_unicode_report_human(file, report)),
            _ => self.format(report),
        }
    }
}

/// Machine-readable batch output: the documents plus the tally
#[derive(Serialize)]
struct BatchOutput<'a> {
    summary: ktjson_core::pipeline::BatchSummary,
    documents: &'a [DocumentReport],
}

impl<'a> From<&'a BatchReport> for BatchOutput<'a> {
    fn from(report: &'a BatchReport) -> Self {
        Self {
            summary: report.summary(),
            documents: &report.documents,
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            writer,
        }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Check if progress indicators should be shown
    pub fn show_progress(&self) -> bool {
        self.show_progress && self.is_human()
    }

    /// Turn progress indicators off, e.g. when the config disables them
    pub fn disable_progress(&mut self) {
        self.show_progress = false;
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let mut value_json = serde_json::to_value(value)?;
        redaction::redact_json_value(&mut value_json);
        trace!(
            "Outputting data: {}",
            serde_json::to_string(&value_json).unwrap_or_else(|_| "[failed to serialize]".to_string())
        );

        let formatted = self.format.format(value)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a batch report. Human output prints even in quiet mode, since
    /// the tally is the result of the command.
    pub fn batch_report(&mut self, report: &BatchReport) -> Result<()> {
        let formatted = self.format.format_batch_report(report, self.use_color)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a Unicode report for one file
    pub fn unicode_report(&mut self, file: &str, report: &UnicodeReport) -> Result<()> {
        let formatted = self.format.format_unicode_report(file, report)?;
        self.writeln(formatted.trim_end())
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress() {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress() {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| match widths.get(i) {
                    Some(width) => format!("{:width$}", cell, width = width),
                    None => cell.clone(),
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(&row_str)?;
        }

        Ok(())
    }
}

/// Progress bar style for document and string counts
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} (eta {eta}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// One line per document, then the tally
fn format_batch_report_human(report: &BatchReport, use_color: bool) -> String {
    let mut output = String::new();

    for document in &report.documents {
        output.push_str(&format_document_line(document, use_color));
        output.push('\n');
        for warning in &document.warnings {
            output.push_str(&format!("      warning {}\n", warning));
        }
    }

    let summary = report.summary().to_string();
    if use_color && report.has_failures() {
        output.push_str(&summary.red().bold().to_string());
    } else if use_color {
        output.push_str(&summary.bold().to_string());
    } else {
        output.push_str(&summary);
    }
    output.push('\n');
    output
}

fn format_document_line(document: &DocumentReport, use_color: bool) -> String {
    let target = document.destination.display();
    let (icon, detail) = match &document.status {
        DocumentStatus::Written => ("✓", format!("{} ({} changes)", target, document.changes)),
        DocumentStatus::Skipped { reason } => ("-", format!("{}: {}", target, reason)),
        DocumentStatus::Failed { kind, message } => ("✗", format!("{} [{}]: {}", target, kind, message)),
        DocumentStatus::Interrupted { partial: Some(partial) } => {
            ("!", format!("{} (partial: {})", target, partial.display()))
        }
        DocumentStatus::Interrupted { partial: None } => ("!", target.to_string()),
    };
    let label = format!("{:<11}", document.status.label());

    if !use_color {
        return format!("  {} {} {}", icon, label, detail);
    }
    let label = match &document.status {
        DocumentStatus::Written => label.green(),
        DocumentStatus::Skipped { .. } => label.dimmed(),
        DocumentStatus::Failed { .. } => label.red(),
        DocumentStatus::Interrupted { .. } => label.yellow(),
    };
    format!("  {} {} {}", icon, label, detail)
}

fn format_unicode_report_human(file: &str, report: &UnicodeReport) -> String {
    if report.is_clean() {
        return format!("[OK] {}: no ambiguous Unicode characters found\n", file);
    }

    let mut output = format!(
        "{}: found {} non-ASCII characters ({} fixable)\n\nTop characters:\n",
        file,
        report.total,
        report.fixable()
    );
    for count in report.counts.iter().take(TOP_CHARACTERS) {
        output.push_str(&format!(
            "  {:?} ({}) -> '{}': {} occurrences\n",
            count.character,
            count.codepoint,
            count.ascii.unwrap_or("?"),
            count.count
        ));
    }

    output.push_str(&format!("\nSample locations (first {}):\n", report.samples.len()));
    for location in &report.samples {
        output.push_str(&format!(
            "  Line {}, Col {}: {:?}\n",
            location.line, location.column, location.context
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}
