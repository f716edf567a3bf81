//! Aggregated search output.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostic::{Hint, SearchError};
use crate::match_record::MatchWithFileInfo;

/// Everything one search run produced.
///
/// `hints` holds one list per query, in query order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// Matches in file order, then traversal order.
    pub matches: Vec<MatchWithFileInfo>,
    /// Per-query and per-file problems.
    pub errors: Vec<SearchError>,
    /// Suggested fixes, one list per query.
    pub hints: Vec<Vec<Hint>>,
}

impl SearchResults {
    /// Returns whether the run produced nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.errors.is_empty() && self.hints.is_empty()
    }

    /// Appends the results of another chunk.
    ///
    /// Hints describe queries rather than files, so the first non-empty set
    /// is kept.
    pub fn append(&mut self, other: Self) {
        self.matches.extend(other.matches);
        self.errors.extend(other.errors);
        if self.hints.is_empty() {
            self.hints = other.hints;
        }
    }

    /// Groups matches by file, preserving match order within each file.
    #[must_use]
    pub fn matches_by_file(&self) -> BTreeMap<&Path, Vec<&MatchWithFileInfo>> {
        let mut grouped: BTreeMap<&Path, Vec<&MatchWithFileInfo>> = BTreeMap::new();
        for found in &self.matches {
            grouped
                .entry(found.file_path.as_path())
                .or_default()
                .push(found);
        }
        grouped
    }
}
