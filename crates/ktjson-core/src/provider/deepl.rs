//! DeepL REST API
//!
//! Free-tier keys end in `:fx` and are served from a separate host.

use super::{http_client, ProviderConfig, TranslationProvider, Usage};
use crate::http::HttpError;
use crate::types::LanguageCode;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

pub const DEEPL_FREE_BASE: &str = "https://api-free.deepl.com";
pub const DEEPL_PRO_BASE: &str = "https://api.deepl.com";
pub const DEEPL_API_KEY_ENV: &str = "DEEPL_API_KEY";

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    text: String,
}

#[derive(Clone)]
pub struct DeepLProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    batch_budget: usize,
}

impl fmt::Debug for DeepLProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepLProvider")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("batch_budget", &self.batch_budget)
            .finish()
    }
}

impl DeepLProvider {
    pub fn new(api_key: impl Into<String>, config: &ProviderConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::configuration("DeepL API key is empty"));
        }
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| Self::base_url_for_key(&api_key).to_string());

        Ok(Self {
            client: http_client(config)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            batch_budget: config.batch_budget,
        })
    }

    pub fn base_url_for_key(api_key: &str) -> &'static str {
        if api_key.ends_with(":fx") {
            DEEPL_FREE_BASE
        } else {
            DEEPL_PRO_BASE
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// DeepL target code: the code upper-cased as given (`es` -> `ES`,
    /// `pt-br` -> `PT-BR`)
    pub fn target_code(language: &LanguageCode) -> String {
        language.as_str().to_ascii_uppercase()
    }

    /// DeepL source languages carry no region
    pub fn source_code(language: &LanguageCode) -> String {
        language.primary().to_ascii_uppercase()
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> std::result::Result<reqwest::Response, HttpError> {
        let response = request
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(HttpError::from_request_error)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(HttpError::from_response(response).await)
        }
    }
}

#[async_trait]
impl TranslationProvider for DeepLProvider {
    fn name(&self) -> &str {
        "deepl"
    }

    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> std::result::Result<String, HttpError> {
        let source_lang = Self::source_code(source);
        let target_lang = Self::target_code(target);
        let request = self
            .client
            .post(format!("{}/v2/translate", self.base_url))
            .form(&[
                ("text", text),
                ("source_lang", source_lang.as_str()),
                ("target_lang", target_lang.as_str()),
            ]);

        let body: TranslateResponse = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(HttpError::from_request_error)?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| HttpError::malformed("response contains no translations", None))
    }

    fn batch_budget(&self) -> usize {
        self.batch_budget
    }

    async fn usage(&self) -> std::result::Result<Option<Usage>, HttpError> {
        let request = self.client.get(format!("{}/v2/usage", self.base_url));
        let usage: Usage = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(HttpError::from_request_error)?;
        Ok(Some(usage))
    }
}

/// Pick the DeepL key: explicit argument, then `DEEPL_API_KEY` (a `.env`
/// file is honoured), then the configured value
pub fn resolve_api_key(explicit: Option<&str>, configured: Option<&str>) -> Result<String> {
    if let Some(key) = explicit.filter(|k| !k.trim().is_empty()) {
        return Ok(key.trim().to_string());
    }

    dotenv::dotenv().ok();
    if let Ok(key) = std::env::var(DEEPL_API_KEY_ENV) {
        if !key.trim().is_empty() {
            return Ok(key.trim().to_string());
        }
    }

    configured
        .filter(|k| !k.trim().is_empty())
        .map(|k| k.trim().to_string())
        .ok_or_else(|| {
            Error::configuration(format!(
                "DeepL needs an API key: pass --api-key, set {} or add providers.deepl.api_key to the config",
                DEEPL_API_KEY_ENV
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(code: &str) -> LanguageCode {
        code.parse().unwrap()
    }

    #[test]
    fn test_base_url_follows_key_tier() {
        assert_eq!(DeepLProvider::base_url_for_key("abc:fx"), DEEPL_FREE_BASE);
        assert_eq!(DeepLProvider::base_url_for_key("abc"), DEEPL_PRO_BASE);

        let provider = DeepLProvider::new("abc:fx", &ProviderConfig::default()).unwrap();
        assert_eq!(provider.base_url(), DEEPL_FREE_BASE);
    }

    #[test]
    fn test_language_mapping() {
        assert_eq!(DeepLProvider::target_code(&lang("es")), "ES");
        assert_eq!(DeepLProvider::target_code(&lang("pt-br")), "PT-BR");
        assert_eq!(DeepLProvider::target_code(&lang("ja")), "JA");
        assert_eq!(DeepLProvider::source_code(&lang("en-gb")), "EN");
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = DeepLProvider::new("secret-key:fx", &ProviderConfig::default()).unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let err = DeepLProvider::new("  ", &ProviderConfig::default()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }

    #[test]
    fn test_explicit_key_wins() {
        assert_eq!(
            resolve_api_key(Some("from-arg"), Some("from-config")).unwrap(),
            "from-arg"
        );
    }
}
