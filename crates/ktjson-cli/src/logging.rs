//! Logging setup for the ktjson CLI
//!
//! This module provides:
//! - Per-run id generation and tracking
//! - Sensitive data redaction
//! - Performance timing spans
//! - Structured logging setup with console and file outputs

use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};
use uuid::Uuid;

/// Id of the current run
static RUN_ID: OnceLock<String> = OnceLock::new();

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Output format: compact, full, json
    pub format: LogFormat,
    /// Enable console output
    pub console: bool,
    /// Use ANSI colors on the console
    pub ansi: bool,
    /// Optional file output path
    pub file: Option<PathBuf>,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
    /// Log span close events with their duration
    pub span_events: bool,
    /// Per-module level overrides
    pub module_filter: BTreeMap<String, String>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact format for production
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl LogFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "compact" => Some(LogFormat::Compact),
            "full" => Some(LogFormat::Full),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            console: true,
            ansi: true,
            file: None,
            thread_ids: false,
            source_location: false,
            span_events: false,
            module_filter: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {
                config.level = "warn".to_string();
            }
            1 => {
                config.level = "info".to_string();
            }
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
                config.span_events = true;
            }
        }

        if verbosity >= 2 {
            // HTTP internals drown out the pipeline at debug and below
            for module in ["hyper", "hyper_util", "reqwest", "rustls"] {
                config.module_filter.insert(module.to_string(), "info".to_string());
            }
        }

        config
    }

    /// Apply the `logging` section of the config file. An explicit `-v`
    /// keeps its level.
    pub fn merge_with_file(&mut self, file: &crate::config::LoggingConfig, verbosity: u8) {
        if verbosity == 0 {
            if let Some(level) = &file.level {
                self.level = level.clone();
            }
        }
        match LogFormat::parse(&file.format) {
            Some(format) => self.format = format,
            None => tracing::warn!("Invalid log format in config: {}", file.format),
        }
        if file.file.is_some() {
            self.file = file.file.clone();
        }
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG takes precedence
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("KTJSON_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.format = format,
                None => tracing::warn!("Invalid log format: {}, using default", format),
            }
        }

        if let Ok(file) = std::env::var("KTJSON_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
    }
}

/// Initialize the global logging system. The returned guard flushes the
/// file writer when dropped, so it must live until exit.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = create_env_filter(&config)?;
    let mut layers = Vec::new();

    if config.console {
        let ansi = config.ansi && std::io::stderr().is_terminal();
        layers.push(fmt_layer(&config, std::io::stderr, ansi));
    }

    let mut guard = None;
    if let Some(path) = &config.file {
        let (directory, file_name) = split_log_path(path)?;
        let appender = tracing_appender::rolling::never(directory, file_name);
        let (writer, worker) = tracing_appender::non_blocking(appender);
        layers.push(fmt_layer(&config, writer, false));
        guard = Some(worker);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    let run_id = generate_run_id();
    RUN_ID
        .set(run_id.clone())
        .map_err(|_| Error::other("Run id was already set"))?;

    tracing::debug!(run_id = %run_id, config = ?config, "Logging system initialized");

    Ok(guard)
}

fn fmt_layer<W>(
    config: &LoggingConfig,
    writer: W,
    ansi: bool,
) -> Box<dyn Layer<Registry> + Send + Sync + 'static>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let span_events = if config.span_events {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(ansi && config.format != LogFormat::Json)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_span_events(span_events);

    match config.format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Full => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::config(format!("Log file path has no file name: {}", path.display())))?;
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((directory.to_path_buf(), PathBuf::from(file_name)))
}

/// Create environment filter based on configuration
fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    for (module, level) in &config.module_filter {
        filter = filter.add_directive(
            format!("{}={}", module, level)
                .parse()
                .map_err(|e| Error::other(format!("Invalid filter directive: {}", e)))?,
        );
    }

    Ok(filter)
}

/// Generate a unique id for this run
pub fn generate_run_id() -> String {
    format!("run_{}", Uuid::new_v4().simple())
}

/// Get the current run id
pub fn current_run_id() -> Option<&'static str> {
    RUN_ID.get().map(|s| s.as_str())
}

/// Create a span with the run id and a duration slot
pub fn create_operation_span(operation: &str, details: Option<&str>) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        run_id = current_run_id().unwrap_or("unknown"),
        details = details.unwrap_or(""),
        duration_ms = field::Empty,
    )
}

/// Sensitive data redaction utilities
pub mod redaction {
    use regex::Regex;
    use std::sync::OnceLock;

    static API_KEY_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    static AUTH_HEADER_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

    fn api_key_pattern() -> Option<&'static Regex> {
        API_KEY_REGEX
            .get_or_init(|| {
                Regex::new(r#"(?i)(api[_-]?key|apikey)(["']?\s*[=:]\s*["']?)([a-zA-Z0-9_:.-]{6,})"#).ok()
            })
            .as_ref()
    }

    fn auth_header_pattern() -> Option<&'static Regex> {
        AUTH_HEADER_REGEX
            .get_or_init(|| Regex::new(r"(?i)(DeepL-Auth-Key|Bearer)\s+([a-zA-Z0-9_:.-]+)").ok())
            .as_ref()
    }

    /// Redact API keys and auth headers from a string
    pub fn redact_sensitive(input: &str) -> String {
        let mut result = input.to_string();

        if let Some(regex) = api_key_pattern() {
            result = regex.replace_all(&result, "${1}${2}***").to_string();
        }

        if let Some(regex) = auth_header_pattern() {
            result = regex.replace_all(&result, "$1 ***").to_string();
        }

        result
    }

    /// Redact sensitive information from JSON values
    pub fn redact_json_value(value: &mut serde_json::Value) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    if is_sensitive_key(key) && !val.is_null() {
                        *val = serde_json::Value::String("***".to_string());
                    } else {
                        redact_json_value(val);
                    }
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    redact_json_value(item);
                }
            }
            serde_json::Value::String(s) => {
                *s = redact_sensitive(s);
            }
            _ => {}
        }
    }

    /// Check if a JSON key holds a secret
    fn is_sensitive_key(key: &str) -> bool {
        let key_lower = key.to_lowercase();
        key_lower.contains("api_key")
            || key_lower.contains("apikey")
            || key_lower.contains("token")
            || key_lower.contains("secret")
            || key_lower.contains("authorization")
    }
}

/// Performance timing utilities
pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// A timer that records its duration on its span when dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self::with_span(operation, super::create_operation_span(operation, None))
        }

        pub fn with_details(operation: &str, details: &str) -> Self {
            Self::with_span(operation, super::create_operation_span(operation, Some(details)))
        }

        fn with_span(operation: &str, span: Span) -> Self {
            Self {
                start: Instant::now(),
                span,
                operation: operation.to_string(),
            }
        }

        /// Get elapsed time without finishing the timer
        pub fn elapsed(&self) -> std::time::Duration {
            self.start.elapsed()
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);

            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration.as_millis(),
                "Operation completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let input = "api_key=abcd1234-ef56:fx sent with Authorization: DeepL-Auth-Key abcd1234-ef56:fx";
        let redacted = redaction::redact_sensitive(input);
        assert!(redacted.contains("api_key=***"));
        assert!(redacted.contains("DeepL-Auth-Key ***"));
        assert!(!redacted.contains("abcd1234"));
    }

    #[test]
    fn test_yaml_style_redaction() {
        let redacted = redaction::redact_sensitive("    api_key: 0a1b2c3d-9999:fx\n");
        assert_eq!(redacted, "    api_key: ***\n");
    }

    #[test]
    fn test_json_redaction() {
        let mut value = serde_json::json!({
            "providers": {
                "deepl": {"api_key": "abcd1234:fx", "timeout_secs": 15},
                "google": {"api_key": null}
            },
            "source_language": "en"
        });

        redaction::redact_json_value(&mut value);

        assert_eq!(value["providers"]["deepl"]["api_key"], "***");
        assert_eq!(value["providers"]["deepl"]["timeout_secs"], 15);
        assert!(value["providers"]["google"]["api_key"].is_null());
        assert_eq!(value["source_language"], "en");
    }

    #[test]
    fn test_logging_config_from_verbosity() {
        let config = LoggingConfig::from_verbosity(0);
        assert_eq!(config.level, "warn");
        assert!(!config.source_location);
        assert!(config.module_filter.is_empty());

        let config = LoggingConfig::from_verbosity(2);
        assert_eq!(config.level, "debug");
        assert!(config.source_location);
        assert_eq!(config.module_filter["hyper"], "info");

        let config = LoggingConfig::from_verbosity(3);
        assert_eq!(config.level, "trace");
        assert!(config.thread_ids);
        assert!(config.span_events);
    }

    #[test]
    fn test_file_section_respects_verbosity() {
        let section = crate::config::LoggingConfig {
            level: Some("debug".to_string()),
            format: "json".to_string(),
            file: Some(PathBuf::from("logs/ktjson.log")),
        };

        let mut quiet = LoggingConfig::from_verbosity(0);
        quiet.merge_with_file(&section, 0);
        assert_eq!(quiet.level, "debug");
        assert_eq!(quiet.format, LogFormat::Json);
        assert_eq!(quiet.file, Some(PathBuf::from("logs/ktjson.log")));

        let mut verbose = LoggingConfig::from_verbosity(1);
        verbose.merge_with_file(&section, 1);
        assert_eq!(verbose.level, "info");
    }

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path(Path::new("ktjson.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, PathBuf::from("ktjson.log"));

        let (dir, _) = split_log_path(Path::new("logs/run/ktjson.log")).unwrap();
        assert_eq!(dir, PathBuf::from("logs/run"));
    }
}
