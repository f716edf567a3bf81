//! Key sets compared between a file node and a query node.

use sift_syntax::GenericNode;

use crate::adapter::ParserAdapter;

#[derive(Debug, Default)]
pub(super) struct KeySets {
    pub file: Vec<&'static str>,
    pub query: Vec<&'static str>,
    pub other_matches: Vec<&'static str>,
}

fn comparable_keys(node: &GenericNode, skipped: &[&str]) -> Vec<&'static str> {
    node.fields()
        .iter()
        .map(sift_syntax::Field::name)
        .filter(|name| !skipped.contains(name))
        .collect()
}

/// Computes the keys to compare.
///
/// Outside exact mode, file fields of same-kind nodes that the query leaves
/// out are ignored when the adapter marks them optional, which is what
/// lets `f()` match `f(a, b)` and `function f() {}` match
/// `async function f() {}`.
pub(super) fn keys_to_compare(
    file: &GenericNode,
    query: &GenericNode,
    exact: bool,
    adapter: &dyn ParserAdapter,
) -> KeySets {
    let skipped = adapter.ast_props_to_skip();
    let all_file = comparable_keys(file, skipped);
    let query_keys = comparable_keys(query, skipped);
    let other_matches = all_file
        .iter()
        .copied()
        .filter(|key| file.field(key).is_some_and(sift_syntax::FieldValue::holds_nodes))
        .collect();

    if exact || file.kind() != query.kind() {
        return KeySets {
            file: all_file,
            query: query_keys,
            other_matches,
        };
    }

    let file_keys = all_file
        .into_iter()
        .filter(|key| query_keys.contains(key) || !adapter.is_node_field_optional(file.kind(), key))
        .collect();
    KeySets {
        file: file_keys,
        query: query_keys,
        other_matches,
    }
}
