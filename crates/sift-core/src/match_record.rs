//! Match records returned to callers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::position::Location;

/// Values captured by aliased wildcards, keyed by alias name.
///
/// Node aliases hold the source text of the captured subtree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAliases {
    /// Identifier wildcard aliases.
    pub identifier: BTreeMap<String, String>,
    /// String wildcard aliases.
    pub string: BTreeMap<String, String>,
    /// Node-subtree wildcard aliases.
    pub nodes_tree: BTreeMap<String, String>,
}

impl MatchAliases {
    /// Returns whether no alias was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifier.is_empty() && self.string.is_empty() && self.nodes_tree.is_empty()
    }

    /// Looks an alias up across all three tables.
    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.identifier
            .get(alias)
            .or_else(|| self.string.get(alias))
            .or_else(|| self.nodes_tree.get(alias))
            .map(String::as_str)
    }
}

/// A few lines of context around a match.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedCodeFrame {
    /// Raw source lines surrounding the match.
    pub code: String,
    /// One-based line the frame starts at.
    pub start_line: u32,
}

/// A match located inside a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchWithFileInfo {
    /// File the match was found in.
    pub file_path: PathBuf,
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Line and column bounds.
    pub loc: Location,
    /// Matched source with the first line's indentation removed.
    pub code: String,
    /// Query text that produced the match.
    pub query: String,
    /// Surrounding context.
    pub extended_code_frame: ExtendedCodeFrame,
    /// Alias captures.
    pub aliases: MatchAliases,
    /// Number of indentation bytes removed from each line of `code`.
    pub indentation_base: usize,
}

impl MatchWithFileInfo {
    /// Returns the `(start, end)` byte range used to deduplicate matches.
    #[must_use]
    pub const fn range(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}
