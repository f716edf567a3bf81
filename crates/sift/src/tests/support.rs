//! Shared helpers for engine tests.

use crate::{FileInMemory, Mode, SearchResults, StringsSearchArgs, SupportedLanguage, search_in_strings};

/// Searches a single in-memory file.
pub(super) fn search_source(
    language: SupportedLanguage,
    mode: Mode,
    queries: &[&str],
    content: &str,
) -> SearchResults {
    let file_name = match language {
        SupportedLanguage::TypeScript => "file.tsx",
        SupportedLanguage::Python => "file.py",
        SupportedLanguage::Rust => "file.rs",
    };
    let args = StringsSearchArgs::new(vec![FileInMemory::new(file_name, content)], queries.iter().copied())
        .with_mode(mode)
        .with_language(language);
    search_in_strings(&args).expect("search runs")
}

/// Searches a single in-memory TypeScript file.
pub(super) fn search_ts(mode: Mode, queries: &[&str], content: &str) -> SearchResults {
    search_source(SupportedLanguage::TypeScript, mode, queries, content)
}

/// Returns the rendered code of every match.
pub(super) fn codes(results: &SearchResults) -> Vec<&str> {
    results.matches.iter().map(|found| found.code.as_str()).collect()
}
