//! Plain-text search mode.
//!
//! Text queries are not parsed. Each query is compiled into a regular
//! expression that tolerates whitespace differences between tokens, accepts
//! either quote character wherever the query has one, and expands
//! wildcards: `$$` and `$$$` stay within a line, `$$m` and `$$$m` may span
//! lines.

use std::ops::Range;

use regex::Regex;
use sift_core::{Position, QueryParseError};

const OPTIONAL_WHITESPACE: &str = r"(\s)*";
const ANY_QUOTE: &str = r#"("|')"#;

/// A compiled text query.
#[derive(Debug, Clone)]
pub struct TextQuery {
    /// Query text as supplied.
    pub query_code: String,
    /// Expression the query compiles to.
    pub regex: Regex,
}

impl TextQuery {
    /// Compiles a text query.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryParseError`] for blank queries and for queries whose
    /// generated expression is rejected.
    pub fn compile(query_code: &str, case_insensitive: bool) -> Result<Self, QueryParseError> {
        if query_code.trim().is_empty() {
            return Err(QueryParseError::new("Empty query!"));
        }
        let regex = text_query_regex(query_code, case_insensitive).map_err(|error| {
            QueryParseError::new(error.to_string()).with_reason_code("invalid_text_query")
        })?;
        Ok(Self {
            query_code: query_code.to_owned(),
            regex,
        })
    }

    /// Returns the byte ranges of every non-empty match in `content`.
    #[must_use]
    pub fn find_all(&self, content: &str) -> Vec<Range<usize>> {
        self.regex
            .find_iter(content)
            .filter(|found| !found.is_empty())
            .map(|found| found.range())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wildcard {
    Line,
    LineRequired,
    Multiline,
    MultilineRequired,
}

impl Wildcard {
    const fn pattern(self) -> &'static str {
        match self {
            Self::Line => r"([\S\t ])*?",
            Self::LineRequired => r"([\S\t ])+?",
            Self::Multiline => r"([\S\s])*?",
            Self::MultilineRequired => r"([\S\s])+?",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Piece<'q> {
    Word(&'q str),
    Symbol(char),
    Wildcard(Wildcard),
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace()
}

/// Splits one quote-free part of a query into words, symbols and wildcards.
fn tokenize(part: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = part;

    while let Some(c) = rest.chars().next() {
        if c == '$' {
            let run = rest.chars().take_while(|&d| d == '$').count();
            if run < 2 {
                pieces.push(Piece::Symbol('$'));
                rest = rest.get(1..).unwrap_or_default();
                continue;
            }
            let width = run.min(3);
            let after = rest.get(width..).unwrap_or_default();
            let multiline = after.starts_with('m');
            let wildcard = match (width == 3, multiline) {
                (true, true) => Wildcard::MultilineRequired,
                (true, false) => Wildcard::LineRequired,
                (false, true) => Wildcard::Multiline,
                (false, false) => Wildcard::Line,
            };
            pieces.push(Piece::Wildcard(wildcard));
            rest = if multiline {
                after.get(1..).unwrap_or_default()
            } else {
                after
            };
        } else if is_word_char(c) {
            let end = rest.find(|d: char| !is_word_char(d)).unwrap_or(rest.len());
            let word = rest.get(..end).unwrap_or_default();
            if !word.trim().is_empty() {
                pieces.push(Piece::Word(word));
            }
            rest = rest.get(end..).unwrap_or_default();
        } else {
            pieces.push(Piece::Symbol(c));
            rest = rest.get(c.len_utf8()..).unwrap_or_default();
        }
    }

    pieces
}

fn piece_pattern(piece: &Piece<'_>, in_string: bool) -> String {
    match piece {
        Piece::Wildcard(wildcard) => wildcard.pattern().to_owned(),
        Piece::Symbol(';') if !in_string => ";?".to_owned(),
        Piece::Symbol(symbol) => regex::escape(symbol.encode_utf8(&mut [0; 4])),
        Piece::Word(word) if in_string => regex::escape(word),
        Piece::Word(word) => word
            .split(char::is_whitespace)
            .filter(|fragment| !fragment.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(OPTIONAL_WHITESPACE),
    }
}

fn code_part_pattern(part: &str) -> String {
    let pieces = tokenize(part);
    let mut pattern = String::new();
    let mut iter = pieces.iter().peekable();
    while let Some(piece) = iter.next() {
        pattern.push_str(&piece_pattern(piece, false));
        let glue = !matches!(
            (piece, iter.peek()),
            (_, None) | (Piece::Wildcard(_), _) | (_, Some(Piece::Wildcard(_)))
        );
        if glue {
            pattern.push_str(OPTIONAL_WHITESPACE);
        }
    }
    pattern
}

fn string_part_pattern(part: &str) -> String {
    tokenize(part)
        .iter()
        .map(|piece| piece_pattern(piece, true))
        .collect()
}

/// Builds the expression a text query compiles to.
///
/// Parts of the query between quote characters alternate between code and
/// string content, starting with code.
///
/// # Errors
///
/// Returns the regex compilation error, which only occurs for expressions
/// exceeding the size limits of the regex engine.
pub fn text_query_regex(query: &str, case_insensitive: bool) -> Result<Regex, regex::Error> {
    let mut source = String::from(if case_insensitive { "(?mi)" } else { "(?m)" });
    let mut in_string = false;

    for (index, part) in query.split(['"', '\'']).enumerate() {
        if index > 0 {
            if in_string {
                source.push_str(OPTIONAL_WHITESPACE);
            }
            source.push_str(ANY_QUOTE);
            if !in_string {
                source.push_str(OPTIONAL_WHITESPACE);
            }
        }
        if in_string {
            source.push_str(&string_part_pattern(part));
        } else {
            source.push_str(&code_part_pattern(part));
        }
        in_string = !in_string;
    }

    tracing::trace!(target: "sift::text", query, regex = %source, "compiled text query");
    Regex::new(&source)
}

/// Returns the line and column of a byte offset.
pub(crate) fn position_at(content: &str, offset: usize) -> Position {
    let before = content.get(..offset).unwrap_or(content);
    let line_start = before.rfind('\n').map_or(0, |newline| newline.saturating_add(1));
    let line = before.bytes().filter(|&byte| byte == b'\n').count().saturating_add(1);
    let column = offset.saturating_sub(line_start);
    Position::new(
        u32::try_from(line).unwrap_or(u32::MAX),
        u32::try_from(column).unwrap_or(u32::MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn matches(query: &str, content: &str) -> Vec<String> {
        let compiled = TextQuery::compile(query, false).expect("valid query");
        compiled
            .find_all(content)
            .into_iter()
            .filter_map(|range| content.get(range).map(str::to_owned))
            .collect()
    }

    #[rstest]
    #[case("foo(a,b)", "foo( a, b )")]
    #[case("foo(a, b)", "foo(a,b)")]
    #[case("const a = 1;", "const   a=1")]
    fn whitespace_between_tokens_is_optional(#[case] query: &str, #[case] content: &str) {
        assert_eq!(matches(query, content), vec![content.to_owned()]);
    }

    #[test]
    fn quotes_are_interchangeable() {
        assert_eq!(matches("import 'react'", r#"import "react""#).len(), 1);
    }

    #[test]
    fn line_wildcards_stay_on_one_line() {
        assert_eq!(matches("foo($$)", "foo(a, b)"), vec!["foo(a, b)"]);
        assert!(matches("foo($$$)", "foo(\n  a\n)").is_empty());
    }

    #[test]
    fn multiline_wildcards_cross_lines() {
        assert_eq!(matches("foo($$$m)", "foo(\n  a\n)"), vec!["foo(\n  a\n)"]);
    }

    #[test]
    fn required_wildcards_need_content() {
        assert!(matches("foo($$$)", "foo()").is_empty());
        assert_eq!(matches("foo($$)", "foo()"), vec!["foo()"]);
    }

    #[test]
    fn case_insensitive_queries_ignore_case() {
        let compiled = TextQuery::compile("UseState", true).expect("valid query");
        assert_eq!(compiled.find_all("const x = usestate()").len(), 1);
    }

    #[test]
    fn blank_queries_are_rejected() {
        let error = TextQuery::compile("  ", false).expect_err("blank query");
        assert_eq!(error.text, "Empty query!");
    }

    #[test]
    fn tokenizer_separates_symbols_and_wildcards() {
        let pieces = tokenize("a.$$m(x)");
        assert_eq!(
            pieces,
            vec![
                Piece::Word("a"),
                Piece::Symbol('.'),
                Piece::Wildcard(Wildcard::Multiline),
                Piece::Symbol('('),
                Piece::Word("x"),
                Piece::Symbol(')'),
            ]
        );
    }

    #[rstest]
    #[case(0, Position::new(1, 0))]
    #[case(4, Position::new(1, 4))]
    #[case(6, Position::new(2, 0))]
    #[case(8, Position::new(2, 2))]
    fn offsets_map_to_positions(#[case] offset: usize, #[case] expected: Position) {
        assert_eq!(position_at("line1\nline2", offset), expected);
    }
}
