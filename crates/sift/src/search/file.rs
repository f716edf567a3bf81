//! Searching the content of a single file.

use std::collections::BTreeSet;
use std::path::Path;

use sift_core::{Location, MatchAliases, MatchWithFileInfo, Position};
use sift_syntax::{NodeSpan, SyntaxError, TextPosition};
use thiserror::Error;

use super::code_frame::build_match;
use crate::error::SearchFailure;
use crate::matcher::{SearchSettings, tighten_multistatement_span, traverse_and_match};
use crate::query::ParsedQuery;
use crate::shallow::shallow_search;
use crate::text_search::{TextQuery, position_at};

/// Problems raised while searching one file.
#[derive(Debug, Error)]
pub(crate) enum FileError {
    /// The file could not be parsed; recorded and skipped.
    #[error(transparent)]
    Syntax(SyntaxError),
    /// The search cannot continue.
    #[error(transparent)]
    Fatal(#[from] SearchFailure),
}

impl From<SyntaxError> for FileError {
    fn from(error: SyntaxError) -> Self {
        match error {
            SyntaxError::ParserInitError { .. } => Self::Fatal(SearchFailure::from(error)),
            other => Self::Syntax(other),
        }
    }
}

const fn position(point: TextPosition) -> Position {
    Position::new(point.line, point.column)
}

const fn location(span: &NodeSpan) -> Location {
    Location::new(position(span.start), position(span.end))
}

/// Runs every structural query against `content`.
///
/// Files failing the token pre-filter are not parsed.
pub(crate) fn search_file_content(
    file_path: &Path,
    content: &str,
    queries: &[&ParsedQuery],
    settings: &SearchSettings<'_>,
) -> Result<Vec<MatchWithFileInfo>, FileError> {
    let logger = settings.logger;
    let passed = {
        let _timing = logger.measure("shallow_search");
        shallow_search(content, queries.iter().copied(), settings.case_insensitive)
    };
    logger.log(format_args!(
        "search_file_content: {} shallow search passed: {passed}",
        file_path.display()
    ));
    if !passed {
        return Ok(Vec::new());
    }

    let root = {
        let _timing = logger.measure("parse_file");
        settings.adapter.parse_code(content)?
    };

    let _timing = logger.measure("search");
    let mut matches = Vec::new();
    for query in queries {
        let Some(query_node) = query.node() else {
            continue;
        };
        for found in traverse_and_match(&root, query_node, settings)? {
            let located = if query.is_multistatement {
                tighten_multistatement_span(found, query_node, settings)?
            } else {
                found
            };
            let span = located.span;
            matches.push(build_match(
                file_path,
                content,
                span.start_byte..span.end_byte,
                location(&span),
                &query.query_code,
                located.context.to_aliases(content),
            ));
        }
    }
    Ok(matches)
}

/// Runs every text query against `content`.
pub(crate) fn search_text_content(
    file_path: &Path,
    content: &str,
    queries: &[TextQuery],
) -> Vec<MatchWithFileInfo> {
    queries
        .iter()
        .flat_map(|query| {
            query.find_all(content).into_iter().map(move |range| {
                let loc = Location::new(
                    position_at(content, range.start),
                    position_at(content, range.end),
                );
                build_match(file_path, content, range, loc, &query.query_code, MatchAliases::default())
            })
        })
        .collect()
}

/// Drops matches repeating an earlier `(start, end)` range.
pub(crate) fn dedup_matches(matches: Vec<MatchWithFileInfo>) -> Vec<MatchWithFileInfo> {
    let mut seen = BTreeSet::new();
    matches
        .into_iter()
        .filter(|found| seen.insert(found.range()))
        .collect()
}
