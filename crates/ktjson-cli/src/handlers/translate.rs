//! Translate command handler

use super::utils::{finish_batch, load_rules};
use crate::cli::TranslateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use crate::progress::ProgressObserver;
use ktjson_core::discovery::{discover_documents, translation_jobs};
use ktjson_core::http::{RetryPolicy, Throttle};
use ktjson_core::pipeline::{DocumentPipeline, Interrupt, PipelineOptions, Silent};
use ktjson_core::provider::{build_provider, preflight};
use ktjson_core::transform::Glossary;
use ktjson_core::{LanguageCode, PipelineObserver, ProviderKind, TranslationMode, Translator};
use std::sync::Arc;

/// Handle the translate command
pub async fn handle_translate(
    args: TranslateArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let timer = Timer::with_details("translate", &args.language);

    let source: LanguageCode = config.source_language.parse()?;
    let target: LanguageCode = args.language.parse()?;
    if source == target {
        return Err(Error::invalid_args(format!(
            "target language '{}' is the source language",
            target
        )));
    }

    let rules = load_rules(args.rules.as_deref(), config)?;
    let source_dir = args
        .source_dir
        .clone()
        .unwrap_or_else(|| args.target_root.join(source.as_str()));
    let target_dir = args.target_root.join(target.as_str());

    let documents = if args.files.is_empty() {
        discover_documents(&source_dir, &config.documents)?
    } else {
        args.files.clone()
    };
    if documents.is_empty() {
        output.warning(&format!("No documents found in {}", source_dir.display()))?;
        return Ok(());
    }

    let kind: ProviderKind = args.provider.map(Into::into).unwrap_or(config.provider);
    let mode: TranslationMode = args.mode.map(Into::into).unwrap_or(config.mode);
    let provider_config = config.provider(kind);
    let provider = build_provider(kind, provider_config, args.api_key.as_deref())?;

    // Nothing is read or written until the provider has answered
    let spinner = output.spinner(&format!("Checking {}", provider.name()));
    let usage = preflight(provider.as_ref()).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    if let Some(usage) = usage? {
        output.info(&format!("{} usage: {}", provider.name(), usage))?;
    }

    let mut glossary = Glossary::archetypes();
    glossary.extend(&config.glossary);

    let provider_name = provider.name().to_string();
    let translator = Translator::new(Arc::from(provider), source.clone(), target.clone())
        .with_mode(mode)
        .with_glossary(glossary)
        .with_throttle(Throttle::new(provider_config.min_interval()))
        .with_retry(RetryPolicy::default().with_delay(provider_config.retry_delay()));

    let jobs = translation_jobs(&rules, &source_dir, &target_dir, &documents);
    let interrupt = Interrupt::on_ctrl_c();
    let pipeline = DocumentPipeline::new(&rules)
        .with_options(PipelineOptions {
            dry_run: args.dry_run,
            checkpoint_on_interrupt: args.checkpoint_on_interrupt,
        })
        .with_interrupt(interrupt.clone());

    output.info(&format!(
        "Translating {} documents {} -> {} with {} ({} mode){}",
        jobs.len(),
        source,
        target,
        provider_name,
        mode,
        if args.dry_run { ", dry run" } else { "" }
    ))?;
    tracing::info!(
        documents = jobs.len(),
        source = %source,
        target = %target,
        provider = %provider_name,
        mode = %mode,
        "Starting translation"
    );

    let mut progress = ProgressObserver::new(output, jobs.len());
    let mut silent = Silent;
    let observer: &mut dyn PipelineObserver = match progress.as_mut() {
        Some(progress) => progress,
        None => &mut silent,
    };
    let report = pipeline.translate_all(&jobs, &translator, observer).await;
    if let Some(progress) = &progress {
        progress.finish();
    }
    output.info(&format!("Finished in {:.1?}", timer.elapsed()))?;

    finish_batch(&report, interrupt.is_triggered(), output)
}
