//! Cross-module tests for parsing and tree conversion.

use rstest::rstest;

use crate::{FieldValue, GenericNode, Parser, SupportedLanguage, SyntaxError, TreeOptions};

fn generic(language: SupportedLanguage, source: &str) -> GenericNode {
    let mut parser = Parser::new(language).expect("parser init");
    parser
        .parse_generic(source, &TreeOptions::new())
        .expect("valid source")
}

// =============================================================================
// Root Kinds
// =============================================================================

#[rstest]
#[case(SupportedLanguage::TypeScript, "a;", "program")]
#[case(SupportedLanguage::Python, "a\n", "module")]
#[case(SupportedLanguage::Rust, "fn main() {}", "source_file")]
fn root_kind_matches_grammar(
    #[case] language: SupportedLanguage,
    #[case] source: &str,
    #[case] expected: &str,
) {
    assert_eq!(generic(language, source).kind(), expected);
}

// =============================================================================
// Spans
// =============================================================================

#[test]
fn spans_use_one_based_lines_and_byte_columns() {
    let root = generic(SupportedLanguage::TypeScript, "a;\n  foo(b);\n");
    let second = root.children().get(1).expect("second statement");

    assert_eq!(second.span().start.line, 2);
    assert_eq!(second.span().start.column, 2);
    assert_eq!(second.span().start_byte, 5);
    assert_eq!(second.source_text("a;\n  foo(b);\n"), "foo(b);");
}

#[test]
fn node_children_visits_every_field() {
    let root = generic(SupportedLanguage::TypeScript, "foo(a, b);");
    let call = root
        .children()
        .first()
        .and_then(|statement| statement.children().first())
        .expect("call expression");

    let kinds: Vec<_> = call.node_children().map(GenericNode::kind).collect();
    assert_eq!(kinds, ["identifier", "arguments"]);
}

#[test]
fn rewrite_text_reaches_nested_scalars() {
    let mut root = generic(SupportedLanguage::Python, "old_name(1)\n");
    root.rewrite_text(&mut |text| {
        if text == "old_name" {
            "new_name".clone_into(text);
        }
    });

    let call = root
        .children()
        .first()
        .and_then(|statement| statement.children().first())
        .expect("call");
    let function = call
        .field("function")
        .and_then(FieldValue::as_node)
        .expect("function");
    assert_eq!(function.text(), Some("new_name"));
}

#[test]
fn take_children_empties_the_list() {
    let mut root = generic(SupportedLanguage::Rust, "fn a() {}\nfn b() {}\n");
    let children = root.take_children();

    assert_eq!(children.len(), 2);
    assert!(root.children().is_empty());
}

// =============================================================================
// Errors
// =============================================================================

#[rstest]
#[case(SupportedLanguage::Rust, "fn broken() {")]
#[case(SupportedLanguage::Python, "def broken(")]
#[case(SupportedLanguage::TypeScript, "const = ;")]
fn invalid_sources_are_rejected(#[case] language: SupportedLanguage, #[case] source: &str) {
    let mut parser = Parser::new(language).expect("parser init");
    let err = parser
        .parse_generic(source, &TreeOptions::new())
        .expect_err("invalid source");

    assert!(matches!(err, SyntaxError::InvalidSource { .. }));
    assert!(err.location().is_some());
}
