//! Structural matching across modes, wildcards and aliases.

use rstest::rstest;

use super::support::{codes, search_ts};
use crate::{Mode, adapter_for, compare_code, SupportedLanguage};

const CONSOLE_CALLS: &str = "console.log('a');\nfunction f() {\n  console.log(1, 2);\n}\nconsole.log();\n";

#[test]
fn include_mode_matches_calls_with_any_arguments() {
    let results = search_ts(Mode::Include, &["console.log()"], CONSOLE_CALLS);

    assert!(results.errors.is_empty(), "{:?}", results.errors);
    assert_eq!(codes(&results), ["console.log('a')", "console.log(1, 2)", "console.log()"]);
}

#[test]
fn exact_mode_requires_the_same_arguments() {
    let results = search_ts(Mode::Exact, &["console.log()"], CONSOLE_CALLS);

    assert_eq!(codes(&results), ["console.log()"]);
}

#[test]
fn matches_report_location_and_query() {
    let results = search_ts(Mode::Include, &["console.log(1)"], CONSOLE_CALLS);
    let found = results.matches.first().expect("one match");

    assert_eq!(found.query, "console.log(1)");
    assert_eq!(found.loc.start.line, 3);
    assert_eq!(found.loc.start.column, 2);
    assert_eq!(found.extended_code_frame.start_line, 2);
    assert_eq!(
        found.extended_code_frame.code,
        "function f() {\n  console.log(1, 2);\n}"
    );
}

#[rstest]
#[case(Mode::Include, "const a = [2, 1];\nconst b = [1, 3, 2];", vec!["[2, 1]", "[1, 3, 2]"])]
#[case(Mode::IncludeWithOrder, "const a = [2, 1];\nconst b = [1, 3, 2];", vec!["[1, 3, 2]"])]
#[case(Mode::Exact, "const a = [1, 2];\nconst b = [1, 3, 2];", vec!["[1, 2]"])]
fn list_matching_depends_on_mode(
    #[case] mode: Mode,
    #[case] content: &str,
    #[case] expected: Vec<&str>,
) {
    let results = search_ts(mode, &["[1, 2]"], content);

    assert_eq!(codes(&results), expected);
}

#[rstest]
#[case(Mode::Include, 2)]
#[case(Mode::IncludeWithOrder, 2)]
#[case(Mode::Exact, 1)]
fn object_properties_are_a_subset_outside_exact_mode(#[case] mode: Mode, #[case] expected: usize) {
    let content = "const a = { a: 1 };\nconst b = { b: 2, a: 1 };";
    let results = search_ts(mode, &["({ a: 1 })"], content);

    assert_eq!(results.matches.len(), expected);
}

#[test]
fn identifier_wildcards_match_name_parts() {
    let content = "setName();\nsetAge();\ngetName();";
    let results = search_ts(Mode::Include, &["set$$()"], content);

    assert_eq!(codes(&results), ["setName()", "setAge()"]);
}

#[test]
fn numeric_wildcard_matches_any_number() {
    let content = "wait(100);\nwait(0.5);\nwait('x');";
    let results = search_ts(Mode::Exact, &["wait(0x0)"], content);

    assert_eq!(codes(&results), ["wait(100)", "wait(0.5)"]);
}

#[test]
fn nodes_tree_wildcard_needs_an_element_in_include_mode() {
    let content = "foo(bar(1));\nfoo(1, 2);\nfoo();";
    let results = search_ts(Mode::Include, &["foo($$$)"], content);

    assert_eq!(codes(&results), ["foo(bar(1))", "foo(1, 2)"]);
}

#[test]
fn string_wildcards_ignore_quote_style() {
    let content = "const a = \"'other\";\nconst b = '\\'other';\nconst c = 'another';";
    let results = search_ts(Mode::Exact, &["\"$$other\""], content);

    assert_eq!(results.matches.len(), 3);
}

#[test]
fn required_string_wildcard_needs_text() {
    let content = "const a = 'other';\nconst b = 'another';";
    let results = search_ts(Mode::Exact, &["'$$$other'"], content);

    assert_eq!(codes(&results), ["'another'"]);
}

#[test]
fn repeated_aliases_must_bind_the_same_text() {
    let content = "foo(x, x);\nfoo(x, y);";
    let results = search_ts(Mode::Include, &["foo($$_a, $$_a)"], content);

    assert_eq!(codes(&results), ["foo(x, x)"]);
    let found = results.matches.first().expect("one match");
    assert_eq!(found.aliases.get("a"), Some("x"));
}

#[test]
fn nodes_tree_aliases_capture_source_text() {
    let results = search_ts(Mode::Exact, &["foo($$$_arg)"], "foo(bar(1));");
    let found = results.matches.first().expect("one match");

    assert_eq!(found.aliases.nodes_tree.get("arg").map(String::as_str), Some("bar(1)"));
}

#[test]
fn case_insensitive_search_relaxes_names_and_aliases() {
    let content = "FOO(Ab, aB);";
    let args = crate::StringsSearchArgs::new(
        vec![crate::FileInMemory::new("a.ts", content)],
        ["foo($$_a, $$_a)"],
    )
    .with_case_insensitive(true);
    let results = crate::search_in_strings(&args).expect("search runs");

    assert_eq!(results.matches.len(), 1);
}

#[test]
fn multistatement_match_spans_first_to_last_statement() {
    let content = "function f() {\n  const a = 1;\n  log();\n  const b = 2;\n  other();\n}\n";
    let results = search_ts(Mode::Include, &["const a = 1;\nconst b = 2;"], content);

    assert_eq!(codes(&results), ["const a = 1;\nlog();\nconst b = 2;"]);
    let found = results.matches.first().expect("one match");
    assert_eq!(found.loc.start.line, 2);
    assert_eq!(found.loc.end.line, 4);
    assert_eq!(found.indentation_base, 2);
}

#[test]
fn multistatement_order_matters_with_order_mode() {
    let content = "function f() {\n  const b = 2;\n  const a = 1;\n}\n";
    let query = "const a = 1;\nconst b = 2;";

    assert_eq!(search_ts(Mode::Include, &[query], content).matches.len(), 1);
    assert!(search_ts(Mode::IncludeWithOrder, &[query], content).matches.is_empty());
}

#[test]
fn every_query_reports_its_own_matches() {
    let results = search_ts(Mode::Include, &["foo()", "bar()"], "foo();\nbar();\nbaz();");

    let queries: Vec<&str> = results.matches.iter().map(|found| found.query.as_str()).collect();
    assert_eq!(queries, ["foo()", "bar()"]);
}

#[rstest]
#[case("foo( a,b )", "foo(a, b)", true)]
#[case("const x = { a: 1 }", "const x = {a:1}", true)]
#[case("foo(a)", "foo(b)", false)]
#[case("foo(a)", "foo(a, b)", false)]
fn compare_code_ignores_formatting(#[case] left: &str, #[case] right: &str, #[case] expected: bool) {
    let adapter = adapter_for(SupportedLanguage::TypeScript);

    assert_eq!(compare_code(left, right, adapter).expect("parses"), expected);
}

#[test]
fn compare_code_reports_syntax_errors() {
    let adapter = adapter_for(SupportedLanguage::TypeScript);

    assert!(compare_code("foo(", "foo()", adapter).is_err());
}

#[rstest]
#[case(Mode::Include)]
#[case(Mode::IncludeWithOrder)]
fn specific_wildcard_does_not_starve_earlier_elements(#[case] mode: Mode) {
    let results = search_ts(mode, &["[$$A, set$$]"], "const x = [setA, setB];");

    assert_eq!(codes(&results), ["[setA, setB]"]);
}

const MODE_CORPUS: &str = "const x = [setA, setB];\nconst y = [1, 2, 3];\nconst z = [3, 2, 1];\n\
                           foo(a, b);\nfoo(b, a);\nconst o = { a: 1, b: 2 };\n\
                           function f() {\n  foo(a);\n  bar(b);\n}\n";

fn match_spans(mode: Mode, query: &str) -> Vec<(usize, usize)> {
    search_ts(mode, &[query], MODE_CORPUS)
        .matches
        .iter()
        .map(|found| (found.start, found.end))
        .collect()
}

#[rstest]
fn stricter_modes_find_subsets_of_include(
    #[values(
        "[$$A, set$$]",
        "[1, 2]",
        "[2, 1]",
        "[$$$, 1]",
        "foo(a, b)",
        "foo(b)",
        "({ b: 2 })",
        "foo(a);\nbar(b);",
        "bar(b);\nfoo(a);"
    )]
    query: &str,
) {
    let include = match_spans(Mode::Include, query);

    for mode in [Mode::Exact, Mode::IncludeWithOrder] {
        let stricter = match_spans(mode, query);
        assert!(
            stricter.iter().all(|span| include.contains(span)),
            "{mode} found {stricter:?} outside include {include:?} for {query}",
        );
    }
}

#[rstest]
fn repeated_runs_report_the_same_positions(
    #[values(Mode::Exact, Mode::Include, Mode::IncludeWithOrder, Mode::Text)] mode: Mode,
    #[values("[$$A, set$$]", "foo($$)", "({ a: 1 })")] query: &str,
) {
    assert_eq!(match_spans(mode, query), match_spans(mode, query));
}
