//! Tree-sitter parsing wrapper with error reporting.
//!
//! This module wraps the raw Tree-sitter parser and gives structured access
//! to parse results, syntax errors and the generic tree built from them.

use std::ops::Range;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::position::point_to_one_based;
use crate::tree::{GenericNode, TreeOptions, build_generic_tree};

/// Result of parsing source code.
///
/// Tree-sitter is error-tolerant, so a parse result may contain both a
/// usable tree and error nodes.
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
    language: SupportedLanguage,
}

impl ParseResult {
    /// Returns the parsed syntax tree.
    #[must_use]
    pub const fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Returns the source code that was parsed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the language of the parsed code.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns whether the parse result contains any syntax errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Collects all syntax errors found in the parse result.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &self.source, &mut errors);
        errors
    }

    /// Returns the first syntax error as a [`SyntaxError`], if any.
    #[must_use]
    pub fn first_error(&self) -> Option<SyntaxError> {
        if !self.has_errors() {
            return None;
        }
        let errors = self.errors();
        let Some(first) = errors.first() else {
            return Some(SyntaxError::invalid_source(
                self.language,
                1,
                1,
                "syntax error",
            ));
        };
        Some(SyntaxError::invalid_source(
            self.language,
            first.line,
            first.column,
            first.message.clone(),
        ))
    }

    /// Returns the root node of the syntax tree.
    #[must_use]
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Converts the syntax tree into the generic tree model.
    #[must_use]
    pub fn to_generic_tree(&self, options: &TreeOptions) -> GenericNode {
        build_generic_tree(self.tree.root_node(), &self.source, options)
    }
}

/// Information about a syntax error found during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the error in the source.
    pub byte_range: Range<usize>,
    /// Line number (one-based) where the error starts.
    pub line: u32,
    /// Column number (one-based) where the error starts.
    pub column: u32,
    /// A snippet of the problematic source text.
    pub context: String,
    /// Human-readable description of the error.
    pub message: String,
}

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>, source: &str) -> Self {
        let byte_range = node.byte_range();

        // Keep the context short enough for a single diagnostic line.
        let context = source
            .get(byte_range.clone())
            .map(|s| {
                if s.len() > 50 {
                    let truncated: String = s.chars().take(47).collect();
                    format!("{truncated}...")
                } else {
                    s.to_owned()
                }
            })
            .unwrap_or_default();

        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else if context.starts_with('"') || context.starts_with('\'') {
            "unterminated string".to_owned()
        } else {
            "syntax error".to_owned()
        };

        let (line, column) = point_to_one_based(node.start_position());

        Self {
            byte_range,
            line,
            column,
            context,
            message,
        }
    }
}

/// Tree-sitter parser wrapper for a specific language.
pub struct Parser {
    inner: tree_sitter::Parser,
    language: SupportedLanguage,
}

impl Parser {
    /// Creates a new parser for the given language.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tree-sitter parser cannot be initialised
    /// with the language grammar.
    pub fn new(language: SupportedLanguage) -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.tree_sitter_language())
            .map_err(|e| SyntaxError::parser_init(language, e.to_string()))?;

        Ok(Self { inner, language })
    }

    /// Returns the language this parser is configured for.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Parses source code and returns the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the parser fails to produce a syntax tree.
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse(self.language, "parsing failed"))?;

        Ok(ParseResult {
            tree,
            source: source.to_owned(),
            language: self.language,
        })
    }

    /// Parses source code and converts it into a generic tree, rejecting
    /// sources that contain syntax errors.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidSource`] located at the first error
    /// node, or any error from [`Parser::parse`].
    pub fn parse_generic(
        &mut self,
        source: &str,
        options: &TreeOptions,
    ) -> Result<GenericNode, SyntaxError> {
        let parsed = self.parse(source)?;
        if let Some(error) = parsed.first_error() {
            return Err(error);
        }
        Ok(parsed.to_generic_tree(options))
    }
}

fn collect_error_nodes(
    node: tree_sitter::Node<'_>,
    source: &str,
    errors: &mut Vec<SyntaxErrorInfo>,
) {
    if node.is_error() || node.is_missing() {
        errors.push(SyntaxErrorInfo::from_node(node, source));
    }

    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, source, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SupportedLanguage::Rust, "fn main() {}")]
    #[case(SupportedLanguage::Python, "def hello():\n    pass")]
    #[case(SupportedLanguage::TypeScript, "const a = <div>{value}</div>;")]
    fn parser_parses_valid_source(#[case] language: SupportedLanguage, #[case] source: &str) {
        let mut parser = Parser::new(language).expect("parser init");
        let result = parser.parse(source).expect("parse");

        assert!(!result.has_errors());
        assert!(result.first_error().is_none());
        assert_eq!(result.language(), language);
    }

    #[rstest]
    #[case(SupportedLanguage::Rust, "fn broken() {")]
    #[case(SupportedLanguage::Python, "def broken(")]
    #[case(SupportedLanguage::TypeScript, "function broken( {")]
    fn parser_detects_syntax_errors(#[case] language: SupportedLanguage, #[case] source: &str) {
        let mut parser = Parser::new(language).expect("parser init");
        let result = parser.parse(source).expect("parse");

        assert!(result.has_errors());
        assert!(!result.errors().is_empty());
    }

    #[test]
    fn first_error_carries_location() {
        let mut parser = Parser::new(SupportedLanguage::TypeScript).expect("parser init");
        let err = parser
            .parse_generic("const a = 1;\nconst = ;", &TreeOptions::default())
            .expect_err("invalid source");

        let (line, column) = err.location().expect("location");
        assert!(line >= 1);
        assert!(column >= 1);
    }
}
