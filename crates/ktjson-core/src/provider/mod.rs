//! Translation backends
//!
//! Each backend sits behind [`TranslationProvider`]: one text in, one text
//! out. Batching, retry and throttling live in the translator, which only
//! asks a provider for its per-call character budget.

pub mod deepl;
pub mod google;

pub use deepl::{resolve_api_key, DeepLProvider, DEEPL_API_KEY_ENV};
pub use google::GoogleWebProvider;

use crate::http::HttpError;
use crate::types::LanguageCode;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default character budget per provider call
pub const DEFAULT_BATCH_BUDGET: usize = 4000;

/// A translation backend
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// Translate `text` from `source` to `target`
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> std::result::Result<String, HttpError>;

    /// Estimated-size budget for one call
    fn batch_budget(&self) -> usize {
        DEFAULT_BATCH_BUDGET
    }

    /// Character usage for metered backends; `None` when not metered
    async fn usage(&self) -> std::result::Result<Option<Usage>, HttpError> {
        Ok(None)
    }
}

/// Known backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    Deepl,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Google, ProviderKind::Deepl];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::Deepl => "deepl",
        }
    }

    /// Whether the backend needs an API key
    pub fn requires_key(&self) -> bool {
        matches!(self, ProviderKind::Deepl)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(ProviderKind::Google),
            "deepl" => Ok(ProviderKind::Deepl),
            other => Err(Error::configuration(format!(
                "Unknown provider '{}' (expected one of: google, deepl)",
                other
            ))),
        }
    }
}

/// Per-backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Minimum delay between consecutive calls (in milliseconds)
    pub min_interval_ms: u64,
    /// Character budget per batched call
    pub batch_budget: usize,
    /// Delay before the single retry (in milliseconds)
    pub retry_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Endpoint override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            min_interval_ms: 500,
            batch_budget: DEFAULT_BATCH_BUDGET,
            retry_delay_ms: 1000,
            api_key: None,
            base_url: None,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Character usage reported by a metered backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub character_count: u64,
    pub character_limit: u64,
}

impl Usage {
    pub fn remaining(&self) -> u64 {
        self.character_limit.saturating_sub(self.character_count)
    }

    pub fn is_exhausted(&self) -> bool {
        self.character_limit > 0 && self.character_count >= self.character_limit
    }

    /// Used share of the quota, in percent
    pub fn percent_used(&self) -> f64 {
        if self.character_limit == 0 {
            0.0
        } else {
            self.character_count as f64 * 100.0 / self.character_limit as f64
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} characters ({:.1}%)",
            self.character_count,
            self.character_limit,
            self.percent_used()
        )
    }
}

/// Build a backend from its kind and settings. DeepL needs a resolved key.
pub fn build_provider(
    kind: ProviderKind,
    config: &ProviderConfig,
    api_key: Option<&str>,
) -> Result<Box<dyn TranslationProvider>> {
    match kind {
        ProviderKind::Google => Ok(Box::new(GoogleWebProvider::new(config)?)),
        ProviderKind::Deepl => {
            let key = resolve_api_key(api_key, config.api_key.as_deref())?;
            Ok(Box::new(DeepLProvider::new(key, config)?))
        }
    }
}

/// Check a provider before any document is touched. Metered backends must
/// answer their usage query and still have quota left.
pub async fn preflight(provider: &dyn TranslationProvider) -> Result<Option<Usage>> {
    let usage = provider.usage().await.map_err(|e| Error::Configuration {
        message: format!("{} usage check failed: {}", provider.name(), e.message),
        source: Some(anyhow::Error::new(e)),
    })?;

    if let Some(usage) = usage {
        tracing::info!(provider = provider.name(), %usage, "provider usage");
        if usage.is_exhausted() {
            return Err(Error::configuration(format!(
                "{} character quota exhausted ({})",
                provider.name(),
                usage
            )));
        }
    }
    Ok(usage)
}

pub(crate) fn http_client(config: &ProviderConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| Error::Configuration {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(anyhow::Error::new(e)),
        })
}
