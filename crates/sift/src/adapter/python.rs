//! Python adapter.

use std::borrow::Cow;

use sift_syntax::{GenericNode, SupportedLanguage, TreeOptions};

use super::{ParserAdapter, embed_wildcard_placeholders, restore_wildcard_placeholders};

/// Adapter for the Python grammar.
///
/// `$` is not valid in Python identifiers, so wildcards travel through the
/// parser as placeholder identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonAdapter;

impl ParserAdapter for PythonAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::Python
    }

    fn tree_options(&self) -> TreeOptions {
        // Quote delimiters are separate nodes; dropping them makes quote
        // style irrelevant.
        TreeOptions::new().with_skipped_kinds(&["comment", "string_start", "string_end"])
    }

    fn identifier_kinds(&self) -> &'static [&'static str] {
        &["identifier"]
    }

    fn string_like_literal_value<'n>(&self, node: &'n GenericNode) -> Option<&'n str> {
        (node.kind() == "string_content").then(|| node.text()).flatten()
    }

    fn numeric_literal_value<'n>(&self, node: &'n GenericNode) -> Option<&'n str> {
        matches!(node.kind(), "integer" | "float")
            .then(|| node.text())
            .flatten()
    }

    fn program_kind(&self) -> &'static str {
        "module"
    }

    fn block_kind(&self) -> &'static str {
        "block"
    }

    fn preprocess_query_code<'c>(&self, code: &'c str) -> Cow<'c, str> {
        embed_wildcard_placeholders(code)
    }

    fn postprocess_query_node(&self, node: &mut GenericNode) {
        restore_wildcard_placeholders(node);
    }
}
