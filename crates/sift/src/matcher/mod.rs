//! Structural matching of query trees against file trees.
//!
//! Matching runs in three stages:
//!
//! 1. [`compare_nodes`] decides whether two nodes match *at their own level*
//!    and which keys must be checked recursively to confirm it;
//! 2. [`validate_match`] walks those keys, applying the [`Mode`] rules to
//!    node lists;
//! 3. [`traverse_and_match`] visits every file node in pre-order and
//!    records validated matches while continuing into nested nodes.
//!
//! Adapters hook into stage 1 through ordered [`NodesComparator`] lists run
//! before and after the generic wildcard handling.

mod aliases;
mod ast;
mod compare;
mod keys;
mod traverse;
mod validate;

use std::borrow::Cow;

use sift_core::Mode;
use sift_syntax::GenericNode;

use crate::adapter::ParserAdapter;
use crate::logger::SearchLogger;
use crate::match_context::MatchContext;
use crate::wildcard::PatternCache;

pub use aliases::{match_identifier_text, match_string_or_identifier_aliases};
pub use ast::{compare_ast, compare_code};
pub use compare::compare_nodes;
pub use traverse::{AstMatch, tighten_multistatement_span, traverse_and_match};
pub use validate::validate_match;

/// Settings shared by every comparison of one search.
#[derive(Clone, Copy)]
pub struct SearchSettings<'a> {
    /// How strictly node lists are compared.
    pub mode: Mode,
    /// Whether names and strings are compared case-insensitively.
    pub case_insensitive: bool,
    /// Grammar knowledge.
    pub adapter: &'a dyn ParserAdapter,
    /// Debug logger and timings.
    pub logger: &'a SearchLogger,
    /// Compiled wildcard patterns.
    pub patterns: &'a PatternCache,
}

impl std::fmt::Debug for SearchSettings<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSettings")
            .field("mode", &self.mode)
            .field("case_insensitive", &self.case_insensitive)
            .field("language", &self.adapter.language())
            .finish_non_exhaustive()
    }
}

/// A pair of nodes to compare.
///
/// Prefixes are prepended to the returned keys so that comparators can
/// compare nodes living at different depths: keys are always relative to
/// the nodes the caller holds.
#[derive(Debug, Clone, Copy)]
pub struct CompareInput<'f, 'q> {
    /// Node from the searched file.
    pub file_node: &'f GenericNode,
    /// Node from the query.
    pub query_node: &'q GenericNode,
    /// Prefix for returned query keys.
    pub query_keys_prefix: Option<&'static str>,
    /// Prefix for returned file keys.
    pub file_keys_prefix: Option<&'static str>,
}

impl<'f, 'q> CompareInput<'f, 'q> {
    /// Creates an input without key prefixes.
    #[must_use]
    pub const fn new(file_node: &'f GenericNode, query_node: &'q GenericNode) -> Self {
        Self {
            file_node,
            query_node,
            query_keys_prefix: None,
            file_keys_prefix: None,
        }
    }

    /// Prefixes returned file keys with `prefix`.
    #[must_use]
    pub const fn with_file_prefix(mut self, prefix: &'static str) -> Self {
        self.file_keys_prefix = Some(prefix);
        self
    }

    /// Prefixes returned query keys with `prefix`.
    #[must_use]
    pub const fn with_query_prefix(mut self, prefix: &'static str) -> Self {
        self.query_keys_prefix = Some(prefix);
        self
    }
}

/// Result of comparing two nodes at one level.
///
/// `query_keys_to_validate` and `file_keys_to_validate` are parallel lists
/// of dotted key paths; `file_keys_for_other_matches` names the file fields
/// traversal descends into to look for further, independent matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareOutcome {
    /// Whether the nodes match at this level.
    pub level_match: bool,
    /// Query keys to validate recursively.
    pub query_keys_to_validate: Vec<Cow<'static, str>>,
    /// File keys to validate recursively.
    pub file_keys_to_validate: Vec<Cow<'static, str>>,
    /// File fields holding nodes to search for other matches.
    pub file_keys_for_other_matches: Vec<&'static str>,
}

impl CompareOutcome {
    /// A level result with nothing left to validate.
    #[must_use]
    pub fn level(level_match: bool, other: &[&'static str]) -> Self {
        Self {
            level_match,
            file_keys_for_other_matches: other.to_vec(),
            ..Self::default()
        }
    }

    /// A level match whose keys must be validated.
    #[must_use]
    pub fn with_keys<Q, F>(level_match: bool, query_keys: Q, file_keys: F, other: &[&'static str]) -> Self
    where
        Q: IntoIterator,
        Q::Item: Into<Cow<'static, str>>,
        F: IntoIterator,
        F::Item: Into<Cow<'static, str>>,
    {
        Self {
            level_match,
            query_keys_to_validate: query_keys.into_iter().map(Into::into).collect(),
            file_keys_to_validate: file_keys.into_iter().map(Into::into).collect(),
            file_keys_for_other_matches: other.to_vec(),
        }
    }

    /// A match validating the same keys on both sides.
    #[must_use]
    pub fn with_shared_keys(level_match: bool, keys: &[&'static str], other: &[&'static str]) -> Self {
        Self::with_keys(level_match, keys.iter().copied(), keys.iter().copied(), other)
    }

    fn prefixed(mut self, query_prefix: Option<&str>, file_prefix: Option<&str>) -> Self {
        if let Some(prefix) = query_prefix {
            self.query_keys_to_validate = prefix_keys(prefix, self.query_keys_to_validate);
        }
        if let Some(prefix) = file_prefix {
            self.file_keys_to_validate = prefix_keys(prefix, self.file_keys_to_validate);
        }
        self
    }
}

fn prefix_keys(prefix: &str, keys: Vec<Cow<'static, str>>) -> Vec<Cow<'static, str>> {
    keys.into_iter()
        .map(|key| Cow::Owned(format!("{prefix}.{key}")))
        .collect()
}

/// A grammar-specific comparison step.
///
/// Returns `None` to fall through to the next step. The last argument holds
/// the file fields the generic step would descend into for other matches.
pub type NodesComparator = for<'f> fn(
    &CompareInput<'f, '_>,
    &mut MatchContext<'f>,
    &SearchSettings<'_>,
    &[&'static str],
) -> Option<CompareOutcome>;

