//! Core data model shared by the Sift search engine and its consumers.
//!
//! This crate holds the serialisable types that cross the engine boundary:
//! match modes, locations, match records, query diagnostics, aggregated
//! search results and runtime configuration. The engine itself lives in the
//! `sift` crate and re-exports everything defined here.
//!
//! # Core types
//!
//! - [`Mode`]: exact, include, include-with-order and text matching
//! - [`Position`] and [`Location`]: one-based lines, zero-based columns
//! - [`MatchWithFileInfo`]: a located, rendered match
//! - [`QueryParseError`], [`Hint`] and [`SearchError`]: per-query and
//!   per-file problems reported as data
//! - [`SearchResults`]: matches, errors and hints of one run
//! - [`SearchConfig`] and [`ThreadingConfig`]: logging, caching and
//!   fan-out settings
//!
//! # Example
//!
//! ```
//! use sift_core::{Mode, SearchResults};
//!
//! let mode: Mode = "include-with-order".parse()?;
//! assert_eq!(mode, Mode::IncludeWithOrder);
//! assert!(SearchResults::default().is_empty());
//! # Ok::<(), sift_core::ModeParseError>(())
//! ```

mod config;
mod diagnostic;
mod match_record;
mod mode;
mod position;
mod results;

pub use config::{ConfigError, DEFAULT_LOG_FILTER, LogFormat, SearchConfig, ThreadingConfig};
pub use diagnostic::{Hint, HintToken, HintTokenKind, QueryParseError, SearchError};
pub use match_record::{ExtendedCodeFrame, MatchAliases, MatchWithFileInfo};
pub use mode::{Mode, ModeParseError};
pub use position::{Location, Position};
pub use results::SearchResults;

#[cfg(test)]
mod tests;
