//! Rust adapter.

use std::borrow::Cow;

use sift_syntax::{CHILDREN_FIELD, GenericNode, SupportedLanguage, TreeOptions};

use super::{ParserAdapter, embed_wildcard_placeholders, restore_wildcard_placeholders};

const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "field_identifier",
    "type_identifier",
    "shorthand_field_identifier",
];

const QUERY_WRAPPER_NAME: &str = "__sift_query__";

/// Adapter for the Rust grammar.
///
/// Wildcards are embedded as placeholder identifiers. Queries that are not
/// valid at file level, such as a trailing expression, are retried inside
/// a function body.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustAdapter;

impl ParserAdapter for RustAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::Rust
    }

    fn tree_options(&self) -> TreeOptions {
        TreeOptions::new().with_skipped_kinds(&["line_comment", "block_comment"])
    }

    fn identifier_kinds(&self) -> &'static [&'static str] {
        IDENTIFIER_KINDS
    }

    fn string_like_literal_value<'n>(&self, node: &'n GenericNode) -> Option<&'n str> {
        (node.kind() == "string_content").then(|| node.text()).flatten()
    }

    fn numeric_literal_value<'n>(&self, node: &'n GenericNode) -> Option<&'n str> {
        matches!(node.kind(), "integer_literal" | "float_literal")
            .then(|| node.text())
            .flatten()
    }

    fn program_kind(&self) -> &'static str {
        "source_file"
    }

    fn block_kind(&self) -> &'static str {
        "block"
    }

    fn alternative_node_types(&self, kind: &str) -> &'static [&'static str] {
        if IDENTIFIER_KINDS.contains(&kind) {
            IDENTIFIER_KINDS
        } else {
            &[]
        }
    }

    fn preprocess_query_code<'c>(&self, code: &'c str) -> Cow<'c, str> {
        embed_wildcard_placeholders(code)
    }

    fn postprocess_query_node(&self, node: &mut GenericNode) {
        restore_wildcard_placeholders(node);
    }

    fn wrap_query_for_retry(&self, code: &str) -> Option<String> {
        Some(format!("fn {QUERY_WRAPPER_NAME}() {{\n{code}\n}}"))
    }

    fn unwrap_retried_query(&self, mut root: GenericNode) -> GenericNode {
        let span = *root.span();
        let statements = root
            .take_children()
            .into_iter()
            .find(|item| item.kind() == "function_item")
            .and_then(|function| function.child("body").cloned())
            .map(|mut body| body.take_children())
            .unwrap_or_default();
        let mut unwrapped = GenericNode::new(self.program_kind(), span);
        unwrapped.set_nodes(CHILDREN_FIELD, statements);
        unwrapped
    }
}
