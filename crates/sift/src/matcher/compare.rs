//! Level comparison of a file node and a query node.

use sift_core::Mode;
use sift_syntax::{FieldValue, GenericNode, Scalar};

use super::aliases::match_string_or_identifier_aliases;
use super::ast::compare_ast;
use super::keys::{KeySets, keys_to_compare};
use super::{CompareInput, CompareOutcome, SearchSettings};
use crate::adapter::ParserAdapter;
use crate::match_context::{MatchContext, NodeAlias};
use crate::wildcard::{
    NODES_TREE_WILDCARD, NUMERIC_WILDCARD, WildcardMeta, has_wildcard, identifier_wildcards,
    string_wildcards, strip_aliases,
};

/// Compares two nodes at their own level.
///
/// Runs, in order: the adapter's before-wildcards comparators, node-subtree
/// wildcards, identifier wildcards, string wildcards, the numeric wildcard,
/// multi-statement blocks against a file's program node, the adapter's
/// after-wildcards comparators and finally a generic field comparison.
/// Aliases bound on the way are added to `context`.
pub fn compare_nodes<'f>(
    input: &CompareInput<'f, '_>,
    context: &mut MatchContext<'f>,
    settings: &SearchSettings<'_>,
) -> CompareOutcome {
    let _timing = settings.logger.measure("compare");
    compare_level(input, context, settings)
        .prefixed(input.query_keys_prefix, input.file_keys_prefix)
}

fn compare_level<'f>(
    input: &CompareInput<'f, '_>,
    context: &mut MatchContext<'f>,
    settings: &SearchSettings<'_>,
) -> CompareOutcome {
    let adapter = settings.adapter;
    let file = input.file_node;
    let query = input.query_node;
    let keys = keys_to_compare(file, query, settings.mode == Mode::Exact, adapter);
    let other = keys.other_matches.as_slice();

    settings.logger.log(format_args!(
        "compare: query {} ({:?}) file {} ({:?})",
        query.kind(),
        keys.query,
        file.kind(),
        keys.file,
    ));

    for comparator in adapter.before_wildcards_comparators() {
        if let Some(outcome) = comparator(input, context, settings, other) {
            return outcome;
        }
    }

    if let Some(wildcard) = nodes_tree_wildcard(query, adapter) {
        let level_match = bind_nodes_tree(file, wildcard, context, adapter);
        return CompareOutcome::level(level_match, other);
    }

    if let Some(outcome) = compare_identifier_wildcard(input, &keys, context, settings) {
        return outcome;
    }

    if let Some(level_match) = compare_string_wildcard(file, query, context, settings) {
        return CompareOutcome::level(level_match, other);
    }

    let is_numeric_wildcard = adapter.numeric_literal_value(query) == Some(NUMERIC_WILDCARD)
        && adapter.numeric_literal_value(file).is_some();
    if is_numeric_wildcard {
        return CompareOutcome::level(true, other);
    }

    if query.kind() == adapter.block_kind() && file.kind() == adapter.program_kind() {
        let body = [sift_syntax::CHILDREN_FIELD];
        return CompareOutcome::with_shared_keys(true, &body, other);
    }

    for comparator in adapter.after_wildcards_comparators() {
        if let Some(outcome) = comparator(input, context, settings, other) {
            return outcome;
        }
    }

    compare_fields(file, query, &keys, settings)
}

/// Returns the wildcard of a query that is a bare `$$$`, possibly aliased.
fn nodes_tree_wildcard(query: &GenericNode, adapter: &dyn ParserAdapter) -> Option<WildcardMeta> {
    let target = adapter.unwrap_expression_statement(query);
    let name = adapter.identifier_name(target)?;
    if strip_aliases(name) != NODES_TREE_WILDCARD {
        return None;
    }
    identifier_wildcards(name).into_iter().next()
}

fn bind_nodes_tree<'f>(
    file: &'f GenericNode,
    wildcard: WildcardMeta,
    context: &mut MatchContext<'f>,
    adapter: &dyn ParserAdapter,
) -> bool {
    let Some(alias) = wildcard.alias.clone() else {
        return true;
    };
    if let Some(bound) = context.nodes_tree_alias(&alias).map(|bound| bound.node) {
        return compare_ast(file, bound, adapter);
    }
    context.add_nodes_tree_alias(alias, NodeAlias { wildcard, node: file });
    true
}

fn compare_identifier_wildcard<'f>(
    input: &CompareInput<'f, '_>,
    keys: &KeySets,
    context: &mut MatchContext<'f>,
    settings: &SearchSettings<'_>,
) -> Option<CompareOutcome> {
    let adapter = settings.adapter;
    let (file, query) = (input.file_node, input.query_node);
    let query_name = adapter.identifier_name(query)?;
    if !has_wildcard(query_name) {
        return None;
    }

    settings.logger.log(format_args!("compare: identifier wildcard {query_name}"));
    let wildcards = identifier_wildcards(query_name);
    let compatible = file.kind() == query.kind()
        || adapter.alternative_node_types(query.kind()).contains(&file.kind());
    let level_match = compatible
        && adapter.identifier_name(file).is_some_and(|file_name| {
            match_string_or_identifier_aliases(query_name, file_name, &wildcards, context, settings)
        });

    let node_keys: Vec<&'static str> = keys
        .query
        .iter()
        .copied()
        .filter(|key| query.field(key).is_some_and(FieldValue::holds_nodes))
        .collect();
    Some(CompareOutcome::with_shared_keys(
        level_match,
        &node_keys,
        &keys.other_matches,
    ))
}

fn compare_string_wildcard<'f>(
    file: &'f GenericNode,
    query: &GenericNode,
    context: &mut MatchContext<'f>,
    settings: &SearchSettings<'_>,
) -> Option<bool> {
    let adapter = settings.adapter;
    let query_value = adapter.string_like_literal_value(query)?;
    let file_value = adapter.string_like_literal_value(file)?;
    if query.kind() != file.kind() || !has_wildcard(query_value) {
        return None;
    }
    let wildcards = string_wildcards(query_value);
    Some(match_string_or_identifier_aliases(
        query_value,
        file_value,
        &wildcards,
        context,
        settings,
    ))
}

fn compare_fields(
    file: &GenericNode,
    query: &GenericNode,
    keys: &KeySets,
    settings: &SearchSettings<'_>,
) -> CompareOutcome {
    let other = keys.other_matches.as_slice();
    if keys.query.len() != keys.file.len() || file.kind() != query.kind() {
        return CompareOutcome::level(false, other);
    }

    let mut to_validate = Vec::new();
    let mut level_match = true;
    for key in &keys.query {
        let (Some(query_value), Some(file_value)) = (query.field(key), file.field(key)) else {
            level_match = false;
            break;
        };
        if !keys.file.contains(key) {
            level_match = false;
            break;
        }
        if query_value.holds_nodes() || file_value.holds_nodes() {
            to_validate.push(*key);
            continue;
        }
        let equal = match (query_value, file_value) {
            (FieldValue::Scalar(query_scalar), FieldValue::Scalar(file_scalar)) => {
                scalars_equal(file.kind(), key, query_scalar, file_scalar, settings)
            }
            _ => false,
        };
        if !equal {
            level_match = false;
            break;
        }
    }

    CompareOutcome::with_shared_keys(level_match, &to_validate, other)
}

fn scalars_equal(
    kind: &str,
    key: &str,
    query: &Scalar,
    file: &Scalar,
    settings: &SearchSettings<'_>,
) -> bool {
    match (query, file) {
        (Scalar::Text(query_text), Scalar::Text(file_text)) => {
            let adapter = settings.adapter;
            let query_value = adapter.sanitize_value(kind, key, query_text);
            let file_value = adapter.sanitize_value(kind, key, file_text);
            if settings.case_insensitive {
                query_value.to_lowercase() == file_value.to_lowercase()
            } else {
                query_value == file_value
            }
        }
        _ => query == file,
    }
}
