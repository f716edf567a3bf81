//! Fatal search failures.
//!
//! Bad queries and unreadable files are reported as data inside
//! [`SearchResults`](sift_core::SearchResults). The variants here describe a
//! broken setup or a broken adapter and abort the whole run.

use sift_syntax::SyntaxError;
use thiserror::Error;

/// Conditions that abort a search run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SearchFailure {
    /// The requested parser name maps to no adapter.
    #[error("unknown parser: '{name}'")]
    UnknownParser {
        /// The rejected parser name.
        name: String,
    },

    /// An adapter or comparator broke the matcher's contract.
    #[error("matcher contract violated: {0}")]
    ContractViolation(String),

    /// A worker thread crashed or could not be started.
    #[error("search worker {index} failed: {message}")]
    WorkerFailed {
        /// Index of the failed chunk.
        index: usize,
        /// Description of the failure.
        message: String,
    },

    /// The grammar could not be loaded.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl SearchFailure {
    /// Creates an unknown parser failure.
    #[must_use]
    pub fn unknown_parser(name: impl Into<String>) -> Self {
        Self::UnknownParser { name: name.into() }
    }

    /// Creates a contract violation.
    #[must_use]
    pub fn contract_violation(message: impl Into<String>) -> Self {
        Self::ContractViolation(message.into())
    }

    /// Creates a worker failure.
    #[must_use]
    pub fn worker_failed(index: usize, message: impl Into<String>) -> Self {
        Self::WorkerFailed {
            index,
            message: message.into(),
        }
    }
}
