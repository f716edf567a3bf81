//! Whole-tree comparisons.

use std::cmp::Reverse;

use sift_syntax::{FieldValue, GenericNode, Scalar, SyntaxError};

use crate::adapter::ParserAdapter;
use crate::wildcard::{NODES_TREE_WILDCARD, has_wildcard, literal_fragments, strip_aliases};

/// Compares two trees structurally, ignoring spans and formatting.
///
/// Fields listed by [`ParserAdapter::ast_props_to_skip`] and list elements
/// rejected by [`ParserAdapter::should_compare_node`] are ignored; scalars
/// are compared after [`ParserAdapter::sanitize_value`].
#[must_use]
pub fn compare_ast(left: &GenericNode, right: &GenericNode, adapter: &dyn ParserAdapter) -> bool {
    if left.kind() != right.kind() {
        return false;
    }
    let skipped = adapter.ast_props_to_skip();
    let mut left_fields = left.fields().iter().filter(|field| !skipped.contains(&field.name()));
    let mut right_fields = right.fields().iter().filter(|field| !skipped.contains(&field.name()));

    loop {
        match (left_fields.next(), right_fields.next()) {
            (None, None) => return true,
            (Some(left_field), Some(right_field)) => {
                let equal = left_field.name() == right_field.name()
                    && values_equal(
                        left.kind(),
                        left_field.name(),
                        left_field.value(),
                        right_field.value(),
                        adapter,
                    );
                if !equal {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

fn values_equal(
    kind: &str,
    name: &str,
    left: &FieldValue,
    right: &FieldValue,
    adapter: &dyn ParserAdapter,
) -> bool {
    match (left, right) {
        (FieldValue::Scalar(Scalar::Text(left_text)), FieldValue::Scalar(Scalar::Text(right_text))) => {
            adapter.sanitize_value(kind, name, left_text) == adapter.sanitize_value(kind, name, right_text)
        }
        (FieldValue::Scalar(left_scalar), FieldValue::Scalar(right_scalar)) => left_scalar == right_scalar,
        _ => {
            let (Some(left_nodes), Some(right_nodes)) = (left.as_nodes(), right.as_nodes()) else {
                return false;
            };
            let mut left_iter = left_nodes.iter().filter(|node| adapter.should_compare_node(node));
            let mut right_iter = right_nodes.iter().filter(|node| adapter.should_compare_node(node));
            loop {
                match (left_iter.next(), right_iter.next()) {
                    (None, None) => return true,
                    (Some(left_node), Some(right_node)) => {
                        if !compare_ast(left_node, right_node, adapter) {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }
        }
    }
}

/// Parses two snippets and compares them with [`compare_ast`].
///
/// # Errors
///
/// Returns the [`SyntaxError`] of the first snippet that fails to parse.
pub fn compare_code(left: &str, right: &str, adapter: &dyn ParserAdapter) -> Result<bool, SyntaxError> {
    let left_tree = adapter.parse_code(left)?;
    let right_tree = adapter.parse_code(right)?;
    Ok(compare_ast(&left_tree, &right_tree, adapter))
}

/// Sort key placing specific query nodes before wildcard identifiers.
///
/// Plain nodes come first, then identifiers with wildcards ordered by how
/// much literal text they contain, then bare `$$$`. Include-mode list
/// matching is greedy, so trying the most specific query elements first
/// keeps broad wildcards from claiming file elements that others need.
pub(crate) fn identifier_strength_rank(
    node: &GenericNode,
    adapter: &dyn ParserAdapter,
) -> (u8, Reverse<usize>) {
    let target = adapter.unwrap_expression_statement(node);
    let Some(name) = adapter.identifier_name(target) else {
        return (0, Reverse(0));
    };
    let stripped = strip_aliases(name);
    if !has_wildcard(&stripped) {
        return (0, Reverse(0));
    }
    if stripped == NODES_TREE_WILDCARD {
        return (2, Reverse(0));
    }
    let literal_len = literal_fragments(&stripped).iter().map(|fragment| fragment.len()).sum();
    (1, Reverse(literal_len))
}
