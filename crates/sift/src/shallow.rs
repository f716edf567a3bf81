//! Token pre-filter applied before a file is parsed.

use std::borrow::Cow;

use crate::query::ParsedQuery;

/// Returns whether `content` may match at least one of `queries`.
///
/// A file passes when it contains every unique token of some compiled
/// query. Tokens of case-insensitive queries are already lowercased.
#[must_use]
pub fn shallow_search<'q>(
    content: &str,
    queries: impl IntoIterator<Item = &'q ParsedQuery>,
    case_insensitive: bool,
) -> bool {
    let haystack: Cow<'_, str> = if case_insensitive {
        Cow::Owned(content.to_lowercase())
    } else {
        Cow::Borrowed(content)
    };
    queries
        .into_iter()
        .filter(|query| query.error.is_none())
        .any(|query| {
            query
                .unique_tokens
                .iter()
                .all(|token| haystack.contains(token.as_str()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::adapter_for;
    use crate::query::parse_queries;
    use rstest::rstest;
    use sift_syntax::SupportedLanguage;

    fn compile(queries: &[&str], case_insensitive: bool) -> Vec<ParsedQuery> {
        let adapter = adapter_for(SupportedLanguage::TypeScript);
        parse_queries(queries, case_insensitive, adapter).0
    }

    #[rstest]
    #[case("fetchData(url)", true)]
    #[case("fetch(url)", false)]
    #[case("fetchData()", false)]
    fn files_need_every_token(#[case] content: &str, #[case] expected: bool) {
        let queries = compile(&["fetchData(url)"], false);
        assert_eq!(shallow_search(content, &queries, false), expected);
    }

    #[test]
    fn any_query_is_enough() {
        let queries = compile(&["alpha()", "beta()"], false);
        assert!(shallow_search("beta();", &queries, false));
    }

    #[test]
    fn case_insensitive_matching_lowercases_content() {
        let queries = compile(&["FetchData()"], true);
        assert!(shallow_search("FETCHDATA();", &queries, true));
    }

    #[test]
    fn failed_queries_never_pass() {
        let queries = compile(&["$$$$"], false);
        assert!(!shallow_search("anything", &queries, false));
    }

    #[test]
    fn wildcard_only_queries_pass_everything() {
        let queries = compile(&["$$$"], false);
        assert!(shallow_search("let x = 1;", &queries, false));
    }
}
