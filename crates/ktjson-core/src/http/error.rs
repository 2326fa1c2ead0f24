//! HTTP error classification and normalization
//!
//! Normalizes provider error responses into a uniform error format

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Classification of HTTP errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClassification {
    /// Client errors (4xx) - retried like any other non-2xx answer
    ClientError,
    /// Server errors (5xx) - should retry
    ServerError,
    /// Network errors and timeouts - should retry
    NetworkError,
    /// Rate limiting - should retry
    RateLimitError,
    /// 2xx with a body we could not read - should retry
    MalformedPayload,
    /// Authentication errors - should not retry
    AuthenticationError,
    /// Character quota exhausted - should not retry
    QuotaExceeded,
    /// Unknown errors - default to no retry
    Unknown,
}

impl ErrorClassification {
    /// Check if this error type should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorClassification::ClientError
                | ErrorClassification::ServerError
                | ErrorClassification::NetworkError
                | ErrorClassification::RateLimitError
                | ErrorClassification::MalformedPayload
        )
    }
}

/// Normalized HTTP error representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpError {
    /// HTTP status code if available
    pub status_code: Option<u16>,
    /// Error classification for retry logic
    pub classification: ErrorClassification,
    /// Human-readable error message
    pub message: String,
    /// Additional error details
    pub details: Option<Value>,
    /// Retry-After header value if present
    pub retry_after: Option<u64>,
}

impl HttpError {
    /// Create from a non-success reqwest Response
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let body = response.text().await.unwrap_or_default();
        let details = serde_json::from_str::<Value>(&body).ok();
        let message = Self::extract_message(&details, &body, status);

        Self {
            status_code: Some(status.as_u16()),
            classification: Self::classify_status(status),
            message,
            details,
            retry_after,
        }
    }

    /// Create from a network/request error
    pub fn from_request_error(error: reqwest::Error) -> Self {
        let classification = if error.is_timeout() || error.is_connect() || error.is_request() {
            ErrorClassification::NetworkError
        } else if error.is_decode() || error.is_body() {
            ErrorClassification::MalformedPayload
        } else {
            ErrorClassification::Unknown
        };

        Self {
            status_code: error.status().map(|s| s.as_u16()),
            classification,
            message: error.to_string(),
            details: None,
            retry_after: None,
        }
    }

    /// A successful response whose body did not have the expected shape
    pub fn malformed(message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            status_code: None,
            classification: ErrorClassification::MalformedPayload,
            message: message.into(),
            details,
            retry_after: None,
        }
    }

    /// Classify HTTP status code
    fn classify_status(status: StatusCode) -> ErrorClassification {
        match status.as_u16() {
            401 | 403 => ErrorClassification::AuthenticationError,
            429 => ErrorClassification::RateLimitError,
            456 => ErrorClassification::QuotaExceeded,
            400..=499 => ErrorClassification::ClientError,
            500..=599 => ErrorClassification::ServerError,
            _ => ErrorClassification::Unknown,
        }
    }

    /// Pull a message out of a JSON error body, falling back to the raw body
    fn extract_message(details: &Option<Value>, body: &str, status: StatusCode) -> String {
        if let Some(json) = details {
            if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
                return message.to_string();
            }
            if let Some(message) = json
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
            {
                return message.to_string();
            }
        }

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed.starts_with('<') {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Check if this error should trigger a retry
    pub fn should_retry(&self) -> bool {
        self.classification.is_retryable()
    }

    /// Get the error classification
    pub fn classification(&self) -> ErrorClassification {
        self.classification
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP Error [{}]: {} (classification: {:?})",
            self.status_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            self.message,
            self.classification
        )
    }
}

impl std::error::Error for HttpError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_classification() {
        assert!(ErrorClassification::ServerError.is_retryable());
        assert!(ErrorClassification::NetworkError.is_retryable());
        assert!(ErrorClassification::RateLimitError.is_retryable());
        assert!(ErrorClassification::MalformedPayload.is_retryable());
        assert!(ErrorClassification::ClientError.is_retryable());
        assert!(!ErrorClassification::AuthenticationError.is_retryable());
        assert!(!ErrorClassification::QuotaExceeded.is_retryable());
        assert!(!ErrorClassification::Unknown.is_retryable());
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(
            HttpError::classify_status(StatusCode::FORBIDDEN),
            ErrorClassification::AuthenticationError
        );
        assert_eq!(
            HttpError::classify_status(StatusCode::TOO_MANY_REQUESTS),
            ErrorClassification::RateLimitError
        );
        assert_eq!(
            HttpError::classify_status(StatusCode::from_u16(456).unwrap()),
            ErrorClassification::QuotaExceeded
        );
        assert_eq!(
            HttpError::classify_status(StatusCode::BAD_REQUEST),
            ErrorClassification::ClientError
        );
        assert_eq!(
            HttpError::classify_status(StatusCode::SERVICE_UNAVAILABLE),
            ErrorClassification::ServerError
        );
    }

    #[test]
    fn test_deepl_message_extraction() {
        let details = Some(json!({"message": "Wrong endpoint"}));
        assert_eq!(
            HttpError::extract_message(&details, "raw", StatusCode::BAD_REQUEST),
            "Wrong endpoint"
        );
    }

    #[test]
    fn test_html_body_falls_back_to_reason() {
        assert_eq!(
            HttpError::extract_message(&None, "<html>busy</html>", StatusCode::TOO_MANY_REQUESTS),
            "Too Many Requests"
        );
        assert_eq!(
            HttpError::extract_message(&None, "plain failure", StatusCode::BAD_GATEWAY),
            "plain failure"
        );
    }

    #[test]
    fn test_malformed_is_retryable() {
        let err = HttpError::malformed("missing translations", None);
        assert!(err.should_retry());
        assert!(err.to_string().contains("missing translations"));
    }
}
