//! Parser adapters.
//!
//! An adapter teaches the grammar-agnostic matcher about one Tree-sitter
//! grammar: which node kinds are identifiers or literals, where statement
//! lists live, which fields can be ignored, how wildcards are embedded in
//! query code and which grammar-specific equivalences hold between nodes.
//! Adapters are stateless unit structs reached through [`adapter_for`] or
//! [`adapter_by_name`].

mod python;
mod rust;
mod typescript;

use std::borrow::Cow;

use sift_syntax::{GenericNode, NodeSpan, Parser, SupportedLanguage, SyntaxError, TreeOptions};

use crate::error::SearchFailure;
use crate::matcher::NodesComparator;

pub use python::PythonAdapter;
pub use rust::RustAdapter;
pub use typescript::TypeScriptAdapter;

/// Placeholder substituted for `$$$` in grammars where `$` is not valid.
pub const NODES_TREE_PLACEHOLDER: &str = "a_x_3_x_a";

/// Placeholder substituted for `$$` in grammars where `$` is not valid.
pub const IDENTIFIER_PLACEHOLDER: &str = "a_x_2_x_a";

/// Grammar-specific knowledge used by the matcher.
pub trait ParserAdapter: Send + Sync {
    /// Grammar this adapter parses.
    fn language(&self) -> SupportedLanguage;

    /// Options used when building generic trees.
    fn tree_options(&self) -> TreeOptions;

    /// Node kinds that name things; all of them are interchangeable for
    /// identifier wildcards.
    fn identifier_kinds(&self) -> &'static [&'static str];

    /// Returns the decoded content of a string-like literal.
    fn string_like_literal_value<'n>(&self, node: &'n GenericNode) -> Option<&'n str>;

    /// Returns the raw text of a numeric literal.
    fn numeric_literal_value<'n>(&self, node: &'n GenericNode) -> Option<&'n str>;

    /// Kind of the root node of a parsed file.
    fn program_kind(&self) -> &'static str;

    /// Kind of a statement block.
    fn block_kind(&self) -> &'static str;

    /// Returns whether `node` is an identifier.
    fn is_identifier_node(&self, node: &GenericNode) -> bool {
        self.identifier_kinds().contains(&node.kind())
    }

    /// Returns the name of an identifier node.
    fn identifier_name<'n>(&self, node: &'n GenericNode) -> Option<&'n str> {
        if self.is_identifier_node(node) {
            node.text()
        } else {
            None
        }
    }

    /// Returns the top-level statements of a parsed file.
    fn program_body<'n>(&self, root: &'n GenericNode) -> &'n [GenericNode] {
        root.children()
    }

    /// Replaces an expression statement by its expression.
    fn unwrap_expression_statement<'n>(&self, node: &'n GenericNode) -> &'n GenericNode {
        if node.kind() != "expression_statement" {
            return node;
        }
        match node.children() {
            [only] => only,
            _ => node,
        }
    }

    /// Builds a block holding several query statements.
    fn create_block_node(&self, statements: Vec<GenericNode>, span: NodeSpan) -> GenericNode {
        let mut block = GenericNode::new(self.block_kind(), span);
        block.set_nodes(sift_syntax::CHILDREN_FIELD, statements);
        block
    }

    /// Fields ignored by comparisons and token extraction.
    fn ast_props_to_skip(&self) -> &'static [&'static str] {
        &[]
    }

    /// Kinds a node of `kind` may also match.
    fn alternative_node_types(&self, _kind: &str) -> &'static [&'static str] {
        &[]
    }

    /// Returns whether `field` of a `kind` node may be omitted in a query.
    fn is_node_field_optional(&self, _kind: &str, _field: &str) -> bool {
        true
    }

    /// Normalises a scalar before comparison.
    fn sanitize_value<'v>(&self, _kind: &str, _field: &str, value: &'v str) -> Cow<'v, str> {
        Cow::Borrowed(value)
    }

    /// Returns whether a list element takes part in comparisons.
    fn should_compare_node(&self, _node: &GenericNode) -> bool {
        true
    }

    /// Rewrites query code before parsing.
    fn preprocess_query_code<'c>(&self, code: &'c str) -> Cow<'c, str> {
        Cow::Borrowed(code)
    }

    /// Rewrites a parsed query tree.
    fn postprocess_query_node(&self, _node: &mut GenericNode) {}

    /// Wraps query code that failed to parse for a second attempt.
    fn wrap_query_for_retry(&self, _code: &str) -> Option<String> {
        None
    }

    /// Recovers the query from a tree parsed out of
    /// [`ParserAdapter::wrap_query_for_retry`] output.
    fn unwrap_retried_query(&self, root: GenericNode) -> GenericNode {
        root
    }

    /// Comparators run before wildcard handling.
    fn before_wildcards_comparators(&self) -> &'static [NodesComparator] {
        &[]
    }

    /// Comparators run after wildcard handling.
    fn after_wildcards_comparators(&self) -> &'static [NodesComparator] {
        &[]
    }

    /// Parses code into a generic tree.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidSource`] for code with syntax errors and
    /// [`SyntaxError::ParserInitError`] if the grammar cannot be loaded.
    fn parse_code(&self, code: &str) -> Result<GenericNode, SyntaxError> {
        Parser::new(self.language())?.parse_generic(code, &self.tree_options())
    }
}

static TYPESCRIPT: TypeScriptAdapter = TypeScriptAdapter;
static PYTHON: PythonAdapter = PythonAdapter;
static RUST: RustAdapter = RustAdapter;

/// Returns the adapter of a language.
#[must_use]
pub fn adapter_for(language: SupportedLanguage) -> &'static dyn ParserAdapter {
    match language {
        SupportedLanguage::TypeScript => &TYPESCRIPT,
        SupportedLanguage::Python => &PYTHON,
        SupportedLanguage::Rust => &RUST,
    }
}

/// Returns the adapter registered under a parser name.
///
/// # Errors
///
/// Returns [`SearchFailure::UnknownParser`] for names no adapter handles.
pub fn adapter_by_name(name: &str) -> Result<&'static dyn ParserAdapter, SearchFailure> {
    name.parse::<SupportedLanguage>()
        .map(adapter_for)
        .map_err(|_| SearchFailure::unknown_parser(name))
}

/// Replaces wildcards by identifier placeholders.
pub(crate) fn embed_wildcard_placeholders(code: &str) -> Cow<'_, str> {
    if !code.contains("$$") {
        return Cow::Borrowed(code);
    }
    Cow::Owned(
        code.replace("$$$", NODES_TREE_PLACEHOLDER)
            .replace("$$", IDENTIFIER_PLACEHOLDER),
    )
}

/// Turns identifier placeholders back into wildcards.
pub(crate) fn restore_wildcard_placeholders(node: &mut GenericNode) {
    node.rewrite_text(&mut |text: &mut String| {
        if text.contains(NODES_TREE_PLACEHOLDER) || text.contains(IDENTIFIER_PLACEHOLDER) {
            *text = text
                .replace(NODES_TREE_PLACEHOLDER, "$$$")
                .replace(IDENTIFIER_PLACEHOLDER, "$$");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("typescript", SupportedLanguage::TypeScript)]
    #[case("javascript", SupportedLanguage::TypeScript)]
    #[case("python", SupportedLanguage::Python)]
    #[case("rust", SupportedLanguage::Rust)]
    fn adapters_are_registered_by_name(#[case] name: &str, #[case] language: SupportedLanguage) {
        let adapter = adapter_by_name(name).expect("known parser");
        assert_eq!(adapter.language(), language);
    }

    #[test]
    fn unknown_parser_names_are_fatal() {
        let err = adapter_by_name("flow").err().expect("unknown parser");
        assert!(matches!(err, SearchFailure::UnknownParser { ref name } if name == "flow"));
    }

    #[test]
    fn placeholders_round_trip() {
        let adapter = adapter_for(SupportedLanguage::Python);
        let code = embed_wildcard_placeholders("$$_a($$$)");
        assert_eq!(code, "a_x_2_x_a_a(a_x_3_x_a)");

        let mut root = adapter.parse_code(&code).expect("valid python");
        restore_wildcard_placeholders(&mut root);
        let call = root
            .children()
            .first()
            .map(|statement| adapter.unwrap_expression_statement(statement))
            .expect("call");
        let callee = call.child("function").and_then(GenericNode::text);
        assert_eq!(callee, Some("$$_a"));
    }
}
