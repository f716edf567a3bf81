//! Query compilation.
//!
//! A query is parsed with the same adapter as the files it will be matched
//! against. Single statements are unwrapped to their expression, several
//! statements are wrapped in a synthetic block. Besides the tree, each query
//! carries the literal tokens any matching file must contain, which drives
//! the shallow pre-filter.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use sift_core::{Hint, HintToken, Position, QueryParseError};
use sift_syntax::{GenericNode, SupportedLanguage, SyntaxError};

use crate::adapter::ParserAdapter;
use crate::wildcard::{DISALLOWED_WILDCARD_SEQUENCE, NUMERIC_WILDCARD, literal_fragments};

const MIN_TOKEN_LEN: usize = 2;

/// Default number of compiled queries kept by a [`QueryCache`].
pub const DEFAULT_QUERY_CACHE_CAPACITY: usize = 256;

/// A compiled query.
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    /// Query text as supplied.
    pub query_code: String,
    /// Pattern tree; `None` when compilation failed.
    pub query_node: Option<Arc<GenericNode>>,
    /// Literal tokens every matching file contains.
    pub unique_tokens: Vec<String>,
    /// Whether the query holds more than one statement.
    pub is_multistatement: bool,
    /// Suggestions for rewriting the query.
    pub hints: Vec<Hint>,
    /// Compilation problem, if any.
    pub error: Option<QueryParseError>,
}

impl ParsedQuery {
    fn failed(query_code: &str, error: QueryParseError) -> Self {
        let hints = hints_for(query_code, Some(&error));
        Self {
            query_code: query_code.to_owned(),
            query_node: None,
            unique_tokens: Vec::new(),
            is_multistatement: false,
            hints,
            error: Some(error),
        }
    }

    /// Returns the pattern tree of a successfully compiled query.
    #[must_use]
    pub fn node(&self) -> Option<&GenericNode> {
        if self.error.is_some() {
            return None;
        }
        self.query_node.as_deref()
    }
}

/// Compiles every query.
///
/// The returned flag is `true` when all queries compiled.
#[must_use]
pub fn parse_queries<S: AsRef<str>>(
    queries: &[S],
    case_insensitive: bool,
    adapter: &dyn ParserAdapter,
) -> (Vec<ParsedQuery>, bool) {
    collect_parsed(queries.iter().map(|query| {
        parse_query(query.as_ref(), case_insensitive, adapter)
    }))
}

fn collect_parsed(parsed: impl Iterator<Item = ParsedQuery>) -> (Vec<ParsedQuery>, bool) {
    let compiled: Vec<ParsedQuery> = parsed.collect();
    let all_valid = compiled.iter().all(|query| query.error.is_none());
    (compiled, all_valid)
}

/// Compiles a single query.
#[must_use]
pub fn parse_query(query_code: &str, case_insensitive: bool, adapter: &dyn ParserAdapter) -> ParsedQuery {
    if let Some(location) = disallowed_wildcard_location(query_code) {
        let error = QueryParseError::new("More than three wildcard chars are not allowed")
            .with_location(location)
            .with_reason_code("disallowed_wildcard");
        return ParsedQuery::failed(query_code, error);
    }

    if query_code.trim().is_empty() {
        return ParsedQuery::failed(query_code, QueryParseError::new("Empty query!"));
    }

    match compile(query_code, adapter) {
        Ok((node, is_multistatement)) => {
            let tokens = unique_tokens(&node, case_insensitive, adapter);
            tracing::debug!(
                target: "sift::query",
                query = query_code,
                tokens = tokens.len(),
                is_multistatement,
                "compiled query"
            );
            ParsedQuery {
                query_code: query_code.to_owned(),
                query_node: Some(Arc::new(node)),
                unique_tokens: tokens,
                is_multistatement,
                hints: hints_for(query_code, None),
                error: None,
            }
        }
        Err(error) => {
            tracing::debug!(target: "sift::query", query = query_code, error = %error, "query rejected");
            ParsedQuery::failed(query_code, error)
        }
    }
}

const DISALLOWED_WILDCARD_RUN: usize = DISALLOWED_WILDCARD_SEQUENCE.len();

/// Finds a run of four or more `$`, except exactly four directly before a
/// template placeholder (`$$$${id}`).
fn disallowed_wildcard_location(query_code: &str) -> Option<Position> {
    query_code.lines().enumerate().find_map(|(index, line)| {
        let column = disallowed_run_start(line)?;
        Some(Position::new(one_based(index), one_based(column)))
    })
}

fn disallowed_run_start(line: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(offset) = line.get(search_from..).and_then(|rest| rest.find('$')) {
        let start = search_from.saturating_add(offset);
        let tail = line.get(start..).unwrap_or_default();
        let run = tail.len().saturating_sub(tail.trim_start_matches('$').len());
        let run_end = start.saturating_add(run);
        let before_placeholder = line.get(run_end..).is_some_and(|rest| rest.starts_with('{'));
        if run > DISALLOWED_WILDCARD_RUN || (run == DISALLOWED_WILDCARD_RUN && !before_placeholder) {
            return Some(start);
        }
        search_from = run_end;
    }
    None
}

fn one_based(index: usize) -> u32 {
    u32::try_from(index).map_or(u32::MAX, |value| value.saturating_add(1))
}

fn parse_root(code: &str, adapter: &dyn ParserAdapter) -> Result<GenericNode, SyntaxError> {
    let prepared = adapter.preprocess_query_code(code);
    let mut root = adapter.parse_code(&prepared)?;
    adapter.postprocess_query_node(&mut root);
    Ok(root)
}

fn compile(code: &str, adapter: &dyn ParserAdapter) -> Result<(GenericNode, bool), QueryParseError> {
    let root = match parse_root(code, adapter) {
        Ok(root) => root,
        Err(original) => adapter
            .wrap_query_for_retry(code)
            .and_then(|wrapped| parse_root(&wrapped, adapter).ok())
            .map(|wrapped_root| adapter.unwrap_retried_query(wrapped_root))
            .ok_or_else(|| query_error_from_syntax(&original, code))?,
    };

    let span = *root.span();
    match adapter.program_body(&root) {
        [] => Err(QueryParseError::new("Empty query!")),
        [single] => Ok((adapter.unwrap_expression_statement(single).clone(), false)),
        statements => Ok((adapter.create_block_node(statements.to_vec(), span), true)),
    }
}

fn query_error_from_syntax(error: &SyntaxError, code: &str) -> QueryParseError {
    let parsed = QueryParseError::new(error.message()).with_reason_code("invalid_source");
    let Some((line, column)) = error.location() else {
        return parsed;
    };
    let excerpt = usize::try_from(line)
        .ok()
        .and_then(|line_number| line_number.checked_sub(1))
        .and_then(|index| code.lines().nth(index));
    let located = parsed.with_location(Position::new(line, column));
    let Some(text) = excerpt else {
        return located;
    };
    located.with_code(text.trim())
}

fn hints_for(query_code: &str, error: Option<&QueryParseError>) -> Vec<Hint> {
    let mut hints = Vec::new();

    if query_code.starts_with('{') {
        hints.push(Hint::from_tokens(vec![
            HintToken::text("To look for object, add expression brackets "),
            HintToken::code("({ key:val })"),
        ]));
    }

    let looks_like_string = query_code.starts_with(['"', '\'']);
    let string_problem = error.is_some_and(|problem| {
        problem.text.contains("unterminated string") || problem.text.contains("Empty query")
    });
    if looks_like_string && string_problem {
        hints.push(Hint::from_tokens(vec![
            HintToken::text("To look for string, add expression brackets "),
            HintToken::code("('some string')"),
        ]));
    }

    hints
}

fn unique_tokens(node: &GenericNode, case_insensitive: bool, adapter: &dyn ParserAdapter) -> Vec<String> {
    let mut tokens = BTreeSet::new();
    collect_tokens(node, adapter, &mut tokens);
    tokens
        .into_iter()
        .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
        .map(|token| if case_insensitive { token.to_lowercase() } else { token })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn collect_tokens(node: &GenericNode, adapter: &dyn ParserAdapter, tokens: &mut BTreeSet<String>) {
    if let Some(name) = adapter.identifier_name(node) {
        tokens.extend(literal_fragments(name).into_iter().map(str::to_owned));
    } else if let Some(value) = adapter.string_like_literal_value(node) {
        let words = literal_fragments(value).into_iter().flat_map(|fragment| {
            fragment.split(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | '`'))
        });
        tokens.extend(words.filter(|word| !word.is_empty()).map(str::to_owned));
    } else if let Some(raw) = adapter.numeric_literal_value(node)
        && raw != NUMERIC_WILDCARD
    {
        tokens.insert(raw.to_owned());
    }

    let skipped = adapter.ast_props_to_skip();
    for field in node.fields() {
        if skipped.contains(&field.name()) {
            continue;
        }
        for child in field.value().as_nodes().unwrap_or_default() {
            collect_tokens(child, adapter, tokens);
        }
    }
}

/// Compiled queries keyed by text, case sensitivity and grammar.
///
/// Shared across worker threads; queries repeated between runs skip
/// parsing.
pub struct QueryCache {
    entries: Mutex<LruCache<(String, bool, SupportedLanguage), ParsedQuery>>,
}

impl QueryCache {
    /// Creates a cache holding up to `capacity` queries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let bounded = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(bounded)),
        }
    }

    /// Returns the compiled form of a query, parsing it on a miss.
    #[must_use]
    pub fn get_or_parse(&self, query_code: &str, case_insensitive: bool, adapter: &dyn ParserAdapter) -> ParsedQuery {
        let key = (query_code.to_owned(), case_insensitive, adapter.language());
        if let Some(hit) = self.lock().get(&key) {
            return hit.clone();
        }
        let parsed = parse_query(query_code, case_insensitive, adapter);
        self.lock().put(key, parsed.clone());
        parsed
    }

    /// Compiles every query through the cache.
    #[must_use]
    pub fn parse_all<S: AsRef<str>>(
        &self,
        queries: &[S],
        case_insensitive: bool,
        adapter: &dyn ParserAdapter,
    ) -> (Vec<ParsedQuery>, bool) {
        collect_parsed(
            queries
                .iter()
                .map(|query| self.get_or_parse(query.as_ref(), case_insensitive, adapter)),
        )
    }

    /// Number of cached queries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<(String, bool, SupportedLanguage), ParsedQuery>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::adapter_for;
    use rstest::rstest;

    fn typescript() -> &'static dyn ParserAdapter {
        adapter_for(SupportedLanguage::TypeScript)
    }

    #[test]
    fn single_expression_is_unwrapped() {
        let parsed = parse_query("foo(bar)", false, typescript());
        let node = parsed.node().expect("compiled");
        assert_eq!(node.kind(), "call_expression");
        assert!(!parsed.is_multistatement);
    }

    #[test]
    fn several_statements_form_a_block() {
        let parsed = parse_query("const a = 1;\nconst b = 2;", false, typescript());
        let node = parsed.node().expect("compiled");
        assert_eq!(node.kind(), "statement_block");
        assert_eq!(node.children().len(), 2);
        assert!(parsed.is_multistatement);
    }

    #[test]
    fn four_wildcard_chars_are_rejected_with_location() {
        let parsed = parse_query("foo(\n  a, $$$$\n)", false, typescript());
        let error = parsed.error.expect("error");
        assert_eq!(error.text, "More than three wildcard chars are not allowed");
        assert_eq!(error.location, Some(Position::new(2, 6)));
    }

    #[rstest]
    #[case("`$$$${id}`", None)]
    #[case("`$$$$${id}`", Some(1))]
    #[case("a $$$$", Some(2))]
    #[case("$$$ $$ $", None)]
    #[case("$$$$ ${id}", Some(0))]
    fn wildcard_runs_before_placeholders_are_allowed(#[case] line: &str, #[case] expected: Option<usize>) {
        assert_eq!(disallowed_run_start(line), expected);
    }

    #[test]
    fn template_query_with_required_wildcard_compiles() {
        let parsed = parse_query("`$$$${id}`", false, typescript());
        assert!(parsed.error.is_none(), "{:?}", parsed.error);
    }

    #[rstest]
    #[case("")]
    #[case("   \n\t")]
    fn blank_queries_are_empty(#[case] query: &str) {
        let parsed = parse_query(query, false, typescript());
        let error = parsed.error.expect("error");
        assert_eq!(error.text, "Empty query!");
    }

    #[test]
    fn invalid_queries_report_a_location() {
        let parsed = parse_query("const = ;", false, typescript());
        let error = parsed.error.expect("error");
        assert_eq!(error.reason_code.as_deref(), Some("invalid_source"));
        assert!(error.location.is_some());
        assert!(parsed.query_node.is_none());
    }

    #[test]
    fn object_queries_get_a_hint() {
        let parsed = parse_query("{ a: 1 }", false, typescript());
        let hint = parsed.hints.first().expect("hint");
        assert_eq!(hint.text, "To look for object, add expression brackets ({ key:val })");
    }

    #[test]
    fn tokens_skip_wildcards_and_short_fragments() {
        let parsed = parse_query("fetchData($$_a, 'some $$ value', 0x0, 42)", false, typescript());
        assert_eq!(parsed.unique_tokens, vec!["42", "fetchData", "some", "value"]);
    }

    #[test]
    fn tokens_are_lowercased_when_case_insensitive() {
        let parsed = parse_query("FetchData()", true, typescript());
        assert_eq!(parsed.unique_tokens, vec!["fetchdata"]);
    }

    #[test]
    fn parse_queries_reports_overall_validity() {
        let (parsed, all_valid) = parse_queries(&["foo()", "$$$$"], false, typescript());
        assert_eq!(parsed.len(), 2);
        assert!(!all_valid);
    }

    #[test]
    fn cache_reuses_compiled_queries() {
        let cache = QueryCache::new(4);
        let first = cache.get_or_parse("foo()", false, typescript());
        let second = cache.get_or_parse("foo()", false, typescript());
        assert_eq!(cache.len(), 1);
        assert_eq!(first.unique_tokens, second.unique_tokens);

        let _ = cache.get_or_parse("foo()", true, typescript());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn rust_statements_compile_through_the_wrapper() {
        let parsed = parse_query("foo(1)", false, adapter_for(SupportedLanguage::Rust));
        let node = parsed.node().expect("compiled");
        assert_eq!(node.kind(), "call_expression");
    }
}
