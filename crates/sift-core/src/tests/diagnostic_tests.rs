//! Tests for query diagnostics and search errors.

use serde_json::json;

use crate::{Hint, HintToken, HintTokenKind, Position, QueryParseError, SearchError};

#[test]
fn hint_text_concatenates_tokens() {
    let hint = Hint::from_tokens(vec![
        HintToken::text("To look for object, add expression brackets "),
        HintToken::code("({ key:val })"),
    ]);
    assert_eq!(
        hint.text,
        "To look for object, add expression brackets ({ key:val })"
    );
    assert_eq!(
        hint.tokens.get(1).map(|token| token.kind),
        Some(HintTokenKind::Code)
    );
}

#[test]
fn query_parse_error_displays_its_text() {
    let error = QueryParseError::new("Empty query!");
    assert_eq!(error.to_string(), "Empty query!");
}

#[test]
fn query_errors_serialise_with_camel_case_fields() {
    let error = SearchError::query(
        "foo(",
        QueryParseError::new("syntax error")
            .with_location(Position::new(1, 4))
            .with_reason_code("syntax"),
    );

    let value = serde_json::to_value(&error).expect("serialise");
    assert_eq!(
        value,
        json!({
            "kind": "query",
            "queryCode": "foo(",
            "error": {
                "text": "syntax error",
                "location": {"line": 1, "column": 4},
                "code": null,
                "reasonCode": "syntax",
            },
        })
    );
}

#[test]
fn file_errors_expose_their_message() {
    let error = SearchError::file("src/a.ts", "missing ) (3:1)");
    assert_eq!(error.message(), "missing ) (3:1)");
}
