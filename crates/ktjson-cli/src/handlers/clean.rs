//! Clean command handler

use super::utils::{finish_batch, load_rules};
use crate::cli::CleanArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use crate::progress::ProgressObserver;
use ktjson_core::discovery::{in_place_jobs, json_files};
use ktjson_core::pipeline::{DocumentPipeline, PipelineOptions, Silent};
use ktjson_core::PipelineObserver;

/// Handle the clean command
pub fn handle_clean(args: CleanArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let rules = load_rules(args.rules.as_deref(), config)?;

    let files = if args.files.is_empty() {
        if !args.dir.is_dir() {
            return Err(Error::FileNotFound { path: args.dir });
        }
        json_files(&args.dir)?
    } else {
        for file in &args.files {
            if !file.is_file() {
                return Err(Error::FileNotFound { path: file.clone() });
            }
        }
        args.files.clone()
    };
    if files.is_empty() {
        output.warning(&format!("No team files found in {}", args.dir.display()))?;
        return Ok(());
    }

    // Identities are resolved relative to the language directory, so
    // `en/teams/KT1.json` is seen as `teams/KT1.json`
    let root = args.dir.parent().unwrap_or(&args.dir);
    let jobs = in_place_jobs(&rules, root, &files);
    let pipeline = DocumentPipeline::new(&rules).with_options(PipelineOptions {
        dry_run: args.dry_run,
        checkpoint_on_interrupt: false,
    });

    output.info(&format!(
        "Cleaning {} files{}",
        jobs.len(),
        if args.dry_run { " (dry run)" } else { "" }
    ))?;

    let mut progress = ProgressObserver::new(output, jobs.len());
    let mut silent = Silent;
    let observer: &mut dyn PipelineObserver = match progress.as_mut() {
        Some(progress) => progress,
        None => &mut silent,
    };
    let report = pipeline.run_all(&jobs, observer, |pipeline, job| pipeline.clean(job));
    if let Some(progress) = &progress {
        progress.finish();
    }

    finish_batch(&report, false, output)
}
