//! Translation of collected units through a provider
//!
//! Units are resolved from the glossary first. The rest go to the provider
//! one by one (precise mode) or newline-joined under the provider's budget
//! (batch mode). Every call waits on the shared throttle and is retried
//! once. A unit whose call fails, or whose answer comes back empty, keeps
//! its original text and yields a [`Warning`]; translation itself never
//! fails.
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use super::batch::{plan_batches, split_response};
use crate::http::{execute_with_retry, HttpError, RetryPolicy, Throttle};
use crate::provider::TranslationProvider;
use crate::transform::Glossary;
use crate::types::{is_blank, LanguageCode, TranslationUnit, Warning};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// How units are sent to the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// One call per unit
    Precise,
    /// Newline-joined batches under the provider's budget
    #[default]
    Batch,
}

impl fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationMode::Precise => write!(f, "precise"),
            TranslationMode::Batch => write!(f, "batch"),
        }
    }
}

impl FromStr for TranslationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "precise" => Ok(TranslationMode::Precise),
            "batch" => Ok(TranslationMode::Batch),
            other => Err(Error::configuration(format!(
                "Unknown translation mode '{}' (expected precise or batch)",
                other
            ))),
        }
    }
}

/// Units resolved so far out of the document total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationProgress {
    pub done: usize,
    pub total: usize,
}

/// Tally for one call to [`Translator::translate_units`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationOutcome {
    /// Units translated by the provider
    pub translated: usize,
    /// Units resolved from the glossary
    pub from_glossary: usize,
    /// Units that kept their original text
    pub failed: usize,
    /// Provider calls issued, retries not counted
    pub calls: usize,
    pub warnings: Vec<Warning>,
}

pub struct Translator {
    provider: Arc<dyn TranslationProvider>,
    source: LanguageCode,
    target: LanguageCode,
    mode: TranslationMode,
    glossary: Glossary,
    throttle: Throttle,
    retry: RetryPolicy,
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("provider", &self.provider.name())
            .field("source", &self.source)
            .field("target", &self.target)
            .field("mode", &self.mode)
            .field("glossary_terms", &self.glossary.len())
            .finish()
    }
}

impl Translator {
    /// A translator with batch mode, an empty glossary, no throttle and the
    /// default single retry
    pub fn new(
        provider: Arc<dyn TranslationProvider>,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Self {
        Self {
            provider,
            source,
            target,
            mode: TranslationMode::default(),
            glossary: Glossary::new(),
            throttle: Throttle::disabled(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_mode(mut self, mode: TranslationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_glossary(mut self, glossary: Glossary) -> Self {
        self.glossary = glossary;
        self
    }

    /// Share a throttle clock, typically across every document of a run
    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn source(&self) -> &LanguageCode {
        &self.source
    }

    pub fn target(&self) -> &LanguageCode {
        &self.target
    }

    pub fn mode(&self) -> TranslationMode {
        self.mode
    }

    /// One throttled provider call, retried on transient failure
    pub async fn translate_text(&self, text: &str) -> std::result::Result<String, HttpError> {
        let provider = self.provider.as_ref();
        let throttle = &self.throttle;
        let source = &self.source;
        let target = &self.target;

        execute_with_retry(
            move || async move {
                throttle.wait().await;
                provider.translate(text, source, target).await
            },
            self.retry.clone(),
        )
        .await
    }

    /// Fill in `translated` for every unit that can be resolved. Units are
    /// updated as answers arrive, so a caller that stops awaiting early
    /// still sees the ones already done.
    pub async fn translate_units(
        &self,
        units: &mut [TranslationUnit],
        progress: &mut (dyn FnMut(TranslationProgress) + Send),
    ) -> TranslationOutcome {
        let total = units.len();
        let mut outcome = TranslationOutcome::default();
        let mut done = 0;
        let mut pending = Vec::new();

        for (index, unit) in units.iter_mut().enumerate() {
            if is_blank(&unit.original) {
                done += 1;
                continue;
            }
            match self.glossary.lookup(&self.target, &unit.original) {
                Some(term) => {
                    unit.translated = Some(term.to_string());
                    outcome.from_glossary += 1;
                    done += 1;
                }
                None => pending.push(index),
            }
        }
        if done > 0 {
            progress(TranslationProgress { done, total });
        }

        debug!(
            provider = self.provider.name(),
            mode = %self.mode,
            total,
            pending = pending.len(),
            from_glossary = outcome.from_glossary,
            "translating units"
        );

        match self.mode {
            TranslationMode::Precise => {
                for index in pending {
                    outcome.calls += 1;
                    let answer = self.translate_text(&units[index].original).await;
                    self.resolve(&mut units[index], answer, &mut outcome);
                    done += 1;
                    progress(TranslationProgress { done, total });
                }
            }
            TranslationMode::Batch => {
                let texts: Vec<&str> = pending.iter().map(|&i| units[i].original.as_str()).collect();
                let batches = plan_batches(&texts, self.provider.batch_budget());
                let payloads: Vec<String> = batches.iter().map(|b| b.payload(&texts)).collect();

                for (batch, payload) in batches.iter().zip(payloads) {
                    outcome.calls += 1;
                    let answer = self.translate_text(&payload).await;
                    let targets: Vec<usize> = batch.indices.iter().map(|&i| pending[i]).collect();

                    match answer {
                        Ok(text) if batch.is_single() => {
                            self.resolve(&mut units[targets[0]], Ok(text), &mut outcome);
                        }
                        Ok(text) => {
                            let lines = split_response(&text, targets.len());
                            for (&index, line) in targets.iter().zip(lines) {
                                self.resolve(&mut units[index], Ok(line), &mut outcome);
                            }
                        }
                        Err(error) => {
                            for &index in &targets {
                                self.resolve(&mut units[index], Err(error.clone()), &mut outcome);
                            }
                        }
                    }
                    done += batch.len();
                    progress(TranslationProgress { done, total });
                }
            }
        }

        outcome
    }

    fn resolve(
        &self,
        unit: &mut TranslationUnit,
        answer: std::result::Result<String, HttpError>,
        outcome: &mut TranslationOutcome,
    ) {
        let message = match answer {
            Ok(text) if !is_blank(&text) => {
                unit.translated = Some(text);
                outcome.translated += 1;
                return;
            }
            Ok(_) => format!("{} returned an empty translation", self.provider.name()),
            Err(error) => format!("{} failed: {}", self.provider.name(), error),
        };

        warn!(pointer = %unit.pointer, "{}; keeping original text", message);
        outcome.failed += 1;
        outcome.warnings.push(Warning::new(unit.pointer.clone(), message));
    }
}
