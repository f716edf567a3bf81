//! Runtime configuration for logging, caching and thread fan-out.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::mode::Mode;

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Controls how many files justify an extra worker thread.
///
/// # Defaults
///
/// - `files_per_thread`: 350
/// - `text_files_per_thread`: 1 000
/// - `max_threads`: available parallelism
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadingConfig {
    /// Structural-mode files handled per thread.
    pub files_per_thread: usize,
    /// Text-mode files handled per thread.
    pub text_files_per_thread: usize,
    /// Upper bound on threads, including the calling thread.
    pub max_threads: Option<usize>,
}

impl ThreadingConfig {
    /// Returns the per-thread file threshold for `mode`.
    #[must_use]
    pub const fn threshold_for(&self, mode: Mode) -> usize {
        let threshold = match mode {
            Mode::Text => self.text_files_per_thread,
            Mode::Exact | Mode::Include | Mode::IncludeWithOrder => self.files_per_thread,
        };
        if threshold == 0 { 1 } else { threshold }
    }
}

impl Default for ThreadingConfig {
    fn default() -> Self {
        Self {
            files_per_thread: 350,
            text_files_per_thread: 1_000,
            max_threads: None,
        }
    }
}

/// Errors raised while loading a [`SearchConfig`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration document is not valid JSON for this schema.
    #[error("invalid search configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Engine-wide settings.
///
/// # Example
///
/// ```
/// use sift_core::{LogFormat, SearchConfig};
///
/// let config = SearchConfig::from_json_str(r#"{"log_format": "compact"}"#)?;
/// assert_eq!(config.log_format, LogFormat::Compact);
/// assert_eq!(config.log_filter, "info");
/// # Ok::<(), sift_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub log_filter: String,
    /// Output format for log events.
    pub log_format: LogFormat,
    /// Thread fan-out thresholds.
    pub threading: ThreadingConfig,
    /// Capacity of the parsed-query cache.
    pub query_cache_capacity: usize,
    /// Capacity of the per-search wildcard regex cache.
    pub regex_cache_capacity: usize,
}

impl SearchConfig {
    /// Parses a configuration document, filling absent fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is malformed.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: LogFormat::default(),
            threading: ThreadingConfig::default(),
            query_cache_capacity: 256,
            regex_cache_capacity: 512,
        }
    }
}
