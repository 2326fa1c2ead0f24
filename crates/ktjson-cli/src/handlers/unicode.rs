//! Unicode check and fix command handlers

use super::utils::{finish_batch, load_rules};
use crate::cli::{UnicodeAction, UnicodeArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use ktjson_core::pipeline::{BatchReport, DocumentJob, DocumentPipeline};
use ktjson_core::transform::{analyze, ascii_equivalent};
use std::path::Path;

/// Handle the unicode command
pub fn handle_unicode(args: UnicodeArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        UnicodeAction::Check(file) => check(&file.file, output),
        UnicodeAction::Fix(file) => fix(&file.file, config, output),
    }
}

fn ensure_exists(file: &Path) -> Result<()> {
    if !file.is_file() {
        return Err(Error::FileNotFound {
            path: file.to_path_buf(),
        });
    }
    Ok(())
}

fn check(file: &Path, output: &mut OutputWriter) -> Result<()> {
    ensure_exists(file)?;
    let content = std::fs::read_to_string(file)?;
    let report = analyze(&content);
    tracing::info!(
        file = %file.display(),
        total = report.total,
        fixable = report.fixable(),
        "analyzed file"
    );
    output.unicode_report(&file.display().to_string(), &report)
}

fn fix(file: &Path, config: &Config, output: &mut OutputWriter) -> Result<()> {
    ensure_exists(file)?;
    let rules = load_rules(None, config)?;
    let name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let job = DocumentJob::in_place(file, rules.resolve_identity(&name));
    let pipeline = DocumentPipeline::new(&rules);

    let (report, stats) = pipeline.normalize(&job);

    if output.is_human() && !stats.is_empty() {
        output.section("Replacements")?;
        for (character, count) in &stats.per_char {
            let replacement = ascii_equivalent(*character).unwrap_or("?");
            output.writeln(&format!(
                "  '{}' (U+{:04X}) -> '{}': {}",
                character, *character as u32, replacement, count
            ))?;
        }
        output.writeln(&format!("  total: {}", stats.total))?;
    }

    let mut batch = BatchReport::new();
    batch.push(report);
    finish_batch(&batch, false, output)
}
