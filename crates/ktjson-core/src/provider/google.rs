//! Google Translate web endpoint (`client=gtx`)
//!
//! No credential. The response is a nested array whose first element holds
//! the translated segments; each segment's first item is a piece of text.

use super::{http_client, ProviderConfig, TranslationProvider};
use crate::http::HttpError;
use crate::types::LanguageCode;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

pub const GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Debug, Clone)]
pub struct GoogleWebProvider {
    client: reqwest::Client,
    endpoint: String,
    batch_budget: usize,
}

impl GoogleWebProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            endpoint: config
                .base_url
                .clone()
                .unwrap_or_else(|| GOOGLE_ENDPOINT.to_string()),
            batch_budget: config.batch_budget,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full request URL with the query string encoded
    pub fn request_url(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> std::result::Result<Url, HttpError> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| HttpError::malformed(format!("invalid endpoint '{}': {}", self.endpoint, e), None))
    }

    /// Concatenate the non-empty first items of every segment
    pub fn parse_response(body: &Value) -> std::result::Result<String, HttpError> {
        let segments = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| HttpError::malformed("response has no translation segments", Some(body.clone())))?;

        Ok(segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .filter(|part| !part.is_empty())
            .collect())
    }
}

#[async_trait]
impl TranslationProvider for GoogleWebProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> std::result::Result<String, HttpError> {
        let url = self.request_url(text, source, target)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(HttpError::from_request_error)?;

        if !response.status().is_success() {
            return Err(HttpError::from_response(response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(HttpError::from_request_error)?;
        Self::parse_response(&body)
    }

    fn batch_budget(&self) -> usize {
        self.batch_budget
    }
}
