//! TypeScript equivalences applied on top of plain tree comparison.

use rstest::rstest;

use super::support::{codes, search_ts};
use crate::{FileInMemory, Mode, StringsSearchArgs, search_in_strings};

#[rstest]
#[case("a.b()", "a?.b();", 1)]
#[case("a?.b()", "a.b();", 1)]
#[case("a.b", "const x = a?.b;", 1)]
fn optional_chaining_is_ignored_outside_exact_mode(
    #[case] query: &str,
    #[case] content: &str,
    #[case] expected: usize,
) {
    assert_eq!(search_ts(Mode::Include, &[query], content).matches.len(), expected);
}

#[test]
fn exact_mode_keeps_optional_chaining_distinct() {
    assert!(search_ts(Mode::Exact, &["a?.b()"], "a.b();").matches.is_empty());
}

#[rstest]
#[case("<Foo />", "const el = <Foo></Foo>;")]
#[case("<Foo></Foo>", "const el = <Foo />;")]
fn self_closing_elements_match_empty_elements(#[case] query: &str, #[case] content: &str) {
    assert_eq!(search_ts(Mode::Include, &[query], content).matches.len(), 1);
}

#[test]
fn self_closing_query_does_not_match_elements_with_children() {
    let content = "const el = <Foo><Bar /></Foo>;";

    assert!(search_ts(Mode::Include, &["<Foo />"], content).matches.is_empty());
}

#[rstest]
#[case("({ 'a': 1 })")]
#[case("({ \"a\": 1 })")]
#[case("({ a: 1 })")]
fn object_keys_compare_by_literal_value(#[case] query: &str) {
    let results = search_ts(Mode::Include, &[query], "const o = { a: 1 };");

    assert_eq!(codes(&results), ["{ a: 1 }"]);
}

#[test]
fn shorthand_destructuring_matches_renamed_property() {
    let results = search_ts(Mode::Include, &["const { a } = obj"], "const { a: b } = obj;");

    assert_eq!(results.matches.len(), 1);
}

#[test]
fn destructuring_matches_property_with_default() {
    let results = search_ts(Mode::Include, &["const { a } = obj"], "const { a = 1 } = obj;");

    assert_eq!(results.matches.len(), 1);
}

#[test]
fn default_values_are_not_ignored_in_exact_mode() {
    let results = search_ts(Mode::Exact, &["const { a } = obj"], "const { a = 1 } = obj;");

    assert!(results.matches.is_empty());
}

#[rstest]
#[case("let x: number;")]
#[case("let x: string;")]
#[case("let x: Custom;")]
fn identifier_wildcard_matches_type_keywords(#[case] content: &str) {
    assert_eq!(search_ts(Mode::Include, &["let x: $$;"], content).matches.len(), 1);
}

#[test]
fn nodes_tree_wildcard_import_matches_any_import_clause() {
    let content = "import React, { useState } from 'react';\nimport { render } from 'react-dom';";
    let results = search_ts(Mode::Include, &["import $$$ from 'react'"], content);

    assert_eq!(codes(&results), ["import React, { useState } from 'react';"]);
}

#[test]
fn jsx_text_matching_ignores_layout() {
    let content = "const el = (\n  <p>\n    Hello   world\n  </p>\n);";
    let results = search_ts(Mode::Include, &["<p>Hello world</p>"], content);

    assert_eq!(results.matches.len(), 1);
}

const TEMPLATES: &str = "const a = 'text';\nconst b = \"other\";\nconst c = `${id}`;\n\
                         const d = `${id}${id2}`;\nconst e = `val ${id} text ${id2}`;";

#[rstest]
#[case(Mode::Exact, "`${id}`", 1)]
#[case(Mode::Exact, "`$$$${id}`", 0)]
#[case(Mode::Include, "`val ${id} text ${id2}`", 1)]
#[case(Mode::Include, "`val ${id} $$ ${id2}`", 1)]
#[case(Mode::Include, "`val ${$$} text ${$$}`", 1)]
#[case(Mode::Include, "`${$$}`", 3)]
#[case(Mode::Include, "`val ${$$}`", 1)]
#[case(Mode::Include, "`text`", 1)]
fn template_literals_match_by_parts(
    #[case] mode: Mode,
    #[case] query: &str,
    #[case] expected: usize,
) {
    let results = search_ts(mode, &[query], TEMPLATES);

    assert!(results.errors.is_empty(), "{:?}", results.errors);
    assert_eq!(results.matches.len(), expected);
}

#[rstest]
#[case("`${fn()}`")]
#[case("`pre${fn()}`")]
#[case("`pre${fn()}post`")]
fn template_query_matches_subset_of_parts(#[case] query: &str) {
    let files = vec![FileInMemory::new("file.ts", "const s = `pre${c}pre${fn()}post`;")];
    let args = StringsSearchArgs::new(files, [query])
        .with_mode(Mode::Include)
        .with_case_insensitive(true);
    let results = search_in_strings(&args).expect("search runs");

    assert_eq!(results.matches.len(), 1);
}

#[test]
fn blank_template_text_matches_any_text_outside_exact_mode() {
    let content = "const s = `${a}-${b}`;";

    assert_eq!(search_ts(Mode::Include, &["`${a} ${b}`"], content).matches.len(), 1);
    assert!(search_ts(Mode::Exact, &["`${a} ${b}`"], content).matches.is_empty());
}

#[rstest]
#[case("'\\u0041other'", "const s = 'Aother';")]
#[case("'\\x41other'", "const s = \"Aother\";")]
#[case("'\\u{41}other'", "const s = `Aother` + 'Aother';")]
fn escaped_characters_match_their_literal_form(#[case] query: &str, #[case] content: &str) {
    assert_eq!(search_ts(Mode::Include, &[query], content).matches.len(), 1);
}
