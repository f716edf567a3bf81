//! File-system, in-memory and multi-threaded search runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tempfile::TempDir;

use crate::{
    FileInMemory, FileSystemSearchArgs, Mode, QueryCache, SearchError, StringsSearchArgs,
    SupportedLanguage, ThreadingConfig, adapter_for, create_hard_stop_flag, parse_queries,
    search_in_file_system, search_in_strings, search_multi_thread,
};

fn write_files(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().expect("temp dir");
    let paths = files
        .iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            fs::write(&path, content).expect("write fixture");
            path
        })
        .collect();
    (dir, paths)
}

fn file_names(results: &crate::SearchResults) -> Vec<String> {
    results
        .matches
        .iter()
        .filter_map(|found| found.file_path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn searches_files_on_disk_in_order() {
    let (_dir, paths) = write_files(&[
        ("a.ts", "fetchData(1);\nfetchData(2);\n"),
        ("b.ts", "other();\n"),
        ("c.ts", "await fetchData('x');\n"),
    ]);
    let args = FileSystemSearchArgs::new(paths, ["fetchData()"]);

    let results = search_in_file_system(&args).expect("search runs");

    assert!(results.errors.is_empty(), "{:?}", results.errors);
    assert_eq!(file_names(&results), ["a.ts", "a.ts", "c.ts"]);
}

#[test]
fn unreadable_and_unparsable_files_are_reported() {
    let (dir, mut paths) = write_files(&[("good.ts", "foo();\n"), ("broken.ts", "foo(;\n")]);
    paths.insert(0, dir.path().join("missing.ts"));
    let args = FileSystemSearchArgs::new(paths, ["foo()"]);

    let results = search_in_file_system(&args).expect("search runs");

    assert_eq!(file_names(&results), ["good.ts"]);
    let failed: Vec<&Path> = results
        .errors
        .iter()
        .filter_map(|error| match error {
            SearchError::File { file_path, .. } => file_path.file_name().map(Path::new),
            SearchError::Query { .. } => None,
        })
        .collect();
    assert_eq!(failed, [Path::new("missing.ts"), Path::new("broken.ts")]);
}

#[test]
fn files_without_query_tokens_are_not_parsed() {
    let (_dir, paths) = write_files(&[("broken.ts", "bar(;\n")]);
    let args = FileSystemSearchArgs::new(paths, ["foo()"]);

    let results = search_in_file_system(&args).expect("search runs");

    assert!(results.matches.is_empty());
    assert!(results.errors.is_empty(), "{:?}", results.errors);
}

#[test]
fn invalid_queries_are_reported_while_valid_ones_run() {
    let files = vec![FileInMemory::new("a.ts", "foo();")];
    let args = StringsSearchArgs::new(files, ["foo($$$$)", "foo()"]);

    let results = search_in_strings(&args).expect("search runs");

    assert_eq!(results.matches.len(), 1);
    let [SearchError::Query { query_code, error }] = results.errors.as_slice() else {
        panic!("expected one query error, got {:?}", results.errors);
    };
    assert_eq!(query_code, "foo($$$$)");
    assert_eq!(error.text, "More than three wildcard chars are not allowed");
    assert_eq!(results.hints.len(), 2);
}

#[test]
fn object_queries_receive_a_hint() {
    let files = vec![FileInMemory::new("a.ts", "const a = { key: 1 };")];
    let args = StringsSearchArgs::new(files, ["{ key: 1 }"]);

    let results = search_in_strings(&args).expect("search runs");
    let hint = results.hints.first().and_then(|hints| hints.first()).expect("object hint");

    assert!(hint.text.starts_with("To look for object"), "{hint:?}");
}

#[test]
fn max_results_limit_truncates_the_run() {
    let (_dir, paths) = write_files(&[
        ("a.ts", "foo(1);\nfoo(2);\n"),
        ("b.ts", "foo(3);\nfoo(4);\n"),
        ("c.ts", "foo(5);\n"),
    ]);
    let args = FileSystemSearchArgs::new(paths, ["foo()"]).with_max_results_limit(3);

    let results = search_in_file_system(&args).expect("search runs");

    assert_eq!(results.matches.len(), 3);
    assert_eq!(file_names(&results), ["a.ts", "a.ts", "b.ts"]);
}

#[test]
fn partial_results_arrive_per_file() {
    let (_dir, paths) = write_files(&[
        ("a.ts", "foo(1);\nfoo(2);\n"),
        ("b.ts", "bar();\n"),
        ("c.ts", "foo(3);\n"),
    ]);
    let batches = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&batches);
    let args = FileSystemSearchArgs::new(paths, ["foo()"])
        .with_partial_result_callback(move |found| {
            sink.lock().expect("batches lock").push(found.len());
        });

    let results = search_in_file_system(&args).expect("search runs");

    assert_eq!(results.matches.len(), 3);
    assert_eq!(*batches.lock().expect("batches lock"), [2, 1]);
}

#[test]
fn stopped_search_returns_empty_results() {
    let (_dir, paths) = write_files(&[("a.ts", "foo();\n")]);
    let flag = create_hard_stop_flag();
    flag.stop_search();
    let args = FileSystemSearchArgs::new(paths, ["foo()"]).with_hard_stop_flag(flag);

    let results = search_in_file_system(&args).expect("search runs");

    assert!(results.is_empty());
}

#[test]
fn text_mode_matches_normalised_whitespace() {
    let (_dir, paths) = write_files(&[("a.ts", "foo(a, b);\nfoo(a,\n  b);\n")]);
    let args = FileSystemSearchArgs::new(paths, ["foo(  a,b )"]).with_mode(Mode::Text);

    let results = search_in_file_system(&args).expect("search runs");

    assert_eq!(results.matches.len(), 2);
    let second = results.matches.get(1).expect("second match");
    assert_eq!(second.loc.start.line, 2);
    assert_eq!(second.loc.end.line, 3);
}

#[test]
fn parsed_queries_are_reused_across_runs() {
    let adapter = adapter_for(SupportedLanguage::TypeScript);
    let (queries, all_valid) = parse_queries(&["foo()"], false, adapter);
    assert!(all_valid);
    let files = vec![FileInMemory::new("a.ts", "foo(1);\nfoo();")];

    for mode in [Mode::Include, Mode::Exact] {
        let mut args = StringsSearchArgs::new(files.clone(), Vec::<String>::new()).with_mode(mode);
        args.queries = crate::QueryInput::Parsed(queries.clone());
        let expected = if mode == Mode::Exact { 1 } else { 2 };
        assert_eq!(search_in_strings(&args).expect("search runs").matches.len(), expected);
    }
}

#[test]
fn shared_query_cache_compiles_each_query_once() {
    let (_dir, paths) = write_files(&[("a.ts", "foo();\n")]);
    let cache = Arc::new(QueryCache::new(8));
    let args = FileSystemSearchArgs::new(paths, ["foo()", "foo()"]).with_query_cache(Arc::clone(&cache));

    search_in_file_system(&args).expect("first run");
    search_in_file_system(&args).expect("second run");

    assert_eq!(cache.len(), 1);
}

#[test]
fn multi_threaded_search_matches_single_threaded_order() {
    let files: Vec<(String, String)> = (0..9)
        .map(|index| (format!("f{index}.ts"), format!("foo({index});\nbar();\n")))
        .collect();
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(name, content)| (name.as_str(), content.as_str()))
        .collect();
    let (_dir, paths) = write_files(&borrowed);
    let args = FileSystemSearchArgs::new(paths, ["foo()"]);
    let threading = ThreadingConfig {
        files_per_thread: 2,
        text_files_per_thread: 2,
        max_threads: Some(4),
    };

    let single = search_in_file_system(&args).expect("single-threaded run");
    let multi = search_multi_thread(&args, &threading).expect("multi-threaded run");

    assert_eq!(multi.matches, single.matches);
    assert_eq!(multi.matches.len(), 9);
}

#[test]
fn multi_threaded_search_reports_query_errors_once() {
    let (_dir, paths) = write_files(&[("a.ts", "foo();\n"), ("b.ts", "foo();\n"), ("c.ts", "foo();\n")]);
    let args = FileSystemSearchArgs::new(paths, ["foo($$$$)", "foo()"]);
    let threading = ThreadingConfig {
        files_per_thread: 1,
        text_files_per_thread: 1,
        max_threads: Some(3),
    };

    let results = search_multi_thread(&args, &threading).expect("search runs");

    assert_eq!(results.matches.len(), 3);
    assert_eq!(results.errors.len(), 1);
}

#[test]
fn stopped_multi_threaded_search_is_empty() {
    let (_dir, paths) = write_files(&[("a.ts", "foo();\n"), ("b.ts", "foo();\n")]);
    let flag = create_hard_stop_flag();
    flag.stop_search();
    let args = FileSystemSearchArgs::new(paths, ["foo()"]).with_hard_stop_flag(flag);
    let threading = ThreadingConfig {
        files_per_thread: 1,
        text_files_per_thread: 1,
        max_threads: Some(2),
    };

    let results = search_multi_thread(&args, &threading).expect("search runs");

    assert!(results.is_empty());
}

#[test]
fn matches_render_as_expected() {
    let files = vec![
        FileInMemory::new("a.ts", "export function load() {\n  return fetchData('users');\n}\n"),
        FileInMemory::new("b.ts", "const data = await fetchData('posts');\n"),
    ];
    let args = StringsSearchArgs::new(files, ["fetchData($$$)"]);

    let results = search_in_strings(&args).expect("search runs");
    let rendered = results
        .matches
        .iter()
        .map(|found| {
            format!(
                "{}:{}:{} {}",
                found.file_path.display(),
                found.loc.start.line,
                found.loc.start.column,
                found.code
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    insta::assert_snapshot!(rendered, @r"
    a.ts:2:9 fetchData('users')
    b.ts:1:19 fetchData('posts')
    ");
}

#[test]
fn matches_serialise_with_camel_case_keys() {
    let files = vec![FileInMemory::new("a.ts", "foo(x);")];
    let args = StringsSearchArgs::new(files, ["foo($$_arg)"]).with_mode(Mode::Exact);

    let results = search_in_strings(&args).expect("search runs");
    let found = results.matches.first().expect("one match");
    let json = serde_json::to_value(found).expect("serialisable");

    assert_eq!(json.pointer("/filePath").and_then(Value::as_str), Some("a.ts"));
    assert_eq!(
        json.pointer("/extendedCodeFrame/startLine").and_then(Value::as_u64),
        Some(1)
    );
    assert_eq!(
        json.pointer("/aliases/identifier/arg").and_then(Value::as_str),
        Some("x")
    );
}
