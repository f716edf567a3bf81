//! TypeScript, TSX and JavaScript adapter.

mod comparators;

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

use sift_syntax::{GenericNode, SupportedLanguage, TEXT_FIELD, TreeOptions, VALUE_FIELD};

use super::ParserAdapter;
use crate::matcher::NodesComparator;

const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "property_identifier",
    "shorthand_property_identifier",
    "shorthand_property_identifier_pattern",
    "type_identifier",
    "private_property_identifier",
    "statement_identifier",
];

const BEFORE_WILDCARDS: &[NodesComparator] = &[
    comparators::identifier_with_default_value,
    comparators::type_keyword_wildcard,
];

const AFTER_WILDCARDS: &[NodesComparator] = &[
    comparators::optional_chaining,
    comparators::self_closing_jsx_element,
    comparators::renamed_destructuring,
    comparators::any_import,
    comparators::literal_object_keys,
    comparators::partial_template_fragment,
];

/// Adapter for the TSX grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptAdapter;

impl ParserAdapter for TypeScriptAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::TypeScript
    }

    fn tree_options(&self) -> TreeOptions {
        TreeOptions::new()
            .with_skipped_kinds(&["comment"])
            .with_transparent_kinds(&["parenthesized_expression"])
            .with_leaf_decoder(decode_string_literal)
    }

    fn identifier_kinds(&self) -> &'static [&'static str] {
        IDENTIFIER_KINDS
    }

    fn string_like_literal_value<'n>(&self, node: &'n GenericNode) -> Option<&'n str> {
        match node.kind() {
            "string" => node.text_field(VALUE_FIELD),
            "string_fragment" | "jsx_text" => node.text(),
            _ => None,
        }
    }

    fn numeric_literal_value<'n>(&self, node: &'n GenericNode) -> Option<&'n str> {
        (node.kind() == "number").then(|| node.text()).flatten()
    }

    fn program_kind(&self) -> &'static str {
        "program"
    }

    fn block_kind(&self) -> &'static str {
        "statement_block"
    }

    fn alternative_node_types(&self, kind: &str) -> &'static [&'static str] {
        if IDENTIFIER_KINDS.contains(&kind) {
            IDENTIFIER_KINDS
        } else {
            &[]
        }
    }

    fn sanitize_value<'v>(&self, kind: &str, field: &str, value: &'v str) -> Cow<'v, str> {
        if matches!(kind, "jsx_text" | "string_fragment") && field == TEXT_FIELD {
            Cow::Owned(value.split_whitespace().collect::<Vec<_>>().join(" "))
        } else {
            Cow::Borrowed(value)
        }
    }

    fn should_compare_node(&self, node: &GenericNode) -> bool {
        // Formatting whitespace between JSX children is not content.
        node.kind() != "jsx_text" || node.text().is_some_and(|text| !text.trim().is_empty())
    }

    fn wrap_query_for_retry(&self, code: &str) -> Option<String> {
        Some(format!("({code})"))
    }

    fn before_wildcards_comparators(&self) -> &'static [NodesComparator] {
        BEFORE_WILDCARDS
    }

    fn after_wildcards_comparators(&self) -> &'static [NodesComparator] {
        AFTER_WILDCARDS
    }
}

/// Collapses string literals to their unescaped content, so that quote
/// style and escape spelling do not affect matching.
fn decode_string_literal(kind: &str, raw: &str) -> Option<String> {
    if kind != "string" {
        return None;
    }
    let inner = raw.get(1..raw.len().checked_sub(1)?)?;
    let mut decoded = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(character) = chars.next() {
        if character != '\\' {
            decoded.push(character);
            continue;
        }
        let Some(escape) = chars.next() else {
            break;
        };
        match escape {
            'n' => decoded.push('\n'),
            't' => decoded.push('\t'),
            'r' => decoded.push('\r'),
            'b' => decoded.push('\u{8}'),
            'f' => decoded.push('\u{c}'),
            'v' => decoded.push('\u{b}'),
            '0' => decoded.push('\0'),
            // Line continuation.
            '\n' => {}
            'x' => push_code_point(&mut decoded, &mut chars, 'x', 2),
            'u' if chars.peek() == Some(&'{') => {
                chars.next();
                let digits: String = chars.by_ref().take_while(|digit| *digit != '}').collect();
                push_hex(&mut decoded, &digits, "\\u{", "}");
            }
            'u' => push_code_point(&mut decoded, &mut chars, 'u', 4),
            other => decoded.push(other),
        }
    }
    Some(decoded)
}

/// Decodes `\xHH` and `\uHHHH`, keeping malformed escapes as written.
fn push_code_point(
    decoded: &mut String,
    chars: &mut Peekable<Chars<'_>>,
    escape: char,
    width: usize,
) {
    let mut digits = String::with_capacity(width);
    while digits.len() < width {
        let Some(digit) = chars.next_if(char::is_ascii_hexdigit) else {
            break;
        };
        digits.push(digit);
    }
    let prefix = format!("\\{escape}");
    if digits.len() == width {
        push_hex(decoded, &digits, &prefix, "");
    } else {
        decoded.push_str(&prefix);
        decoded.push_str(&digits);
    }
}

/// Pushes the character a hex escape names, or the escape text itself when
/// it names no valid code point.
fn push_hex(decoded: &mut String, digits: &str, prefix: &str, suffix: &str) {
    match u32::from_str_radix(digits, 16).ok().and_then(char::from_u32) {
        Some(character) => decoded.push(character),
        None => {
            decoded.push_str(prefix);
            decoded.push_str(digits);
            decoded.push_str(suffix);
        }
    }
}
