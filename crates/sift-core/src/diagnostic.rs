//! Query diagnostics and per-file errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::position::Position;

/// Kind of a [`HintToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintTokenKind {
    /// Prose.
    Text,
    /// Code to be rendered verbatim.
    Code,
}

/// One fragment of a hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintToken {
    /// Whether the fragment is prose or code.
    pub kind: HintTokenKind,
    /// The fragment itself.
    pub content: String,
}

impl HintToken {
    /// Creates a prose fragment.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: HintTokenKind::Text,
            content: content.into(),
        }
    }

    /// Creates a code fragment.
    #[must_use]
    pub fn code(content: impl Into<String>) -> Self {
        Self {
            kind: HintTokenKind::Code,
            content: content.into(),
        }
    }
}

/// A suggested fix for a query that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    /// Plain-text rendering of the hint.
    pub text: String,
    /// Structured rendering of the hint.
    pub tokens: Vec<HintToken>,
}

impl Hint {
    /// Creates a hint from its tokens; `text` is their concatenation.
    #[must_use]
    pub fn from_tokens(tokens: Vec<HintToken>) -> Self {
        let text = tokens.iter().map(|token| token.content.as_str()).collect();
        Self { text, tokens }
    }
}

/// A query that could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{text}")]
#[serde(rename_all = "camelCase")]
pub struct QueryParseError {
    /// Human-readable description.
    pub text: String,
    /// One-based location of the problem, when known.
    pub location: Option<Position>,
    /// Offending code excerpt, when known.
    pub code: Option<String>,
    /// Machine-readable reason.
    pub reason_code: Option<String>,
}

impl QueryParseError {
    /// Creates an error without location details.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: None,
            code: None,
            reason_code: None,
        }
    }

    /// Attaches a location.
    #[must_use]
    pub const fn with_location(mut self, location: Position) -> Self {
        self.location = Some(location);
        self
    }

    /// Attaches the offending code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attaches a machine-readable reason.
    #[must_use]
    pub fn with_reason_code(mut self, reason_code: impl Into<String>) -> Self {
        self.reason_code = Some(reason_code.into());
        self
    }
}

/// A non-fatal problem recorded during a search run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SearchError {
    /// A query failed to compile.
    Query {
        /// The raw query text.
        query_code: String,
        /// What went wrong.
        error: QueryParseError,
    },
    /// A file could not be read or parsed.
    File {
        /// The file that failed.
        file_path: PathBuf,
        /// Description of the failure.
        error: String,
    },
}

impl SearchError {
    /// Creates a query error.
    #[must_use]
    pub fn query(query_code: impl Into<String>, error: QueryParseError) -> Self {
        Self::Query {
            query_code: query_code.into(),
            error,
        }
    }

    /// Creates a file error.
    #[must_use]
    pub fn file(file_path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self::File {
            file_path: file_path.into(),
            error: error.into(),
        }
    }

    /// Returns the error description.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Query { error, .. } => &error.text,
            Self::File { error, .. } => error,
        }
    }
}
