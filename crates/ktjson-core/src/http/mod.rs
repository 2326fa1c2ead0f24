//! HTTP plumbing shared by the translation providers
//!
//! - Error classification and normalization
//! - Bounded retry with a fixed delay
//! - A process-wide minimum-interval throttle

pub mod error;
pub mod retry;
pub mod throttle;

pub use error::{ErrorClassification, HttpError};
pub use retry::{execute_with_retry, RetryDecision, RetryHandler, RetryPolicy};
pub use throttle::{Throttle, ThrottleConfig};

// Re-export commonly used types
pub use reqwest::{Method, StatusCode};
