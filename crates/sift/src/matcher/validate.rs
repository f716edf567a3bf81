//! Recursive validation of level matches.

use sift_core::Mode;
use sift_syntax::{FieldValue, GenericNode};

use super::ast::identifier_strength_rank;
use super::compare::compare_nodes;
use super::{CompareInput, CompareOutcome, SearchSettings};
use crate::error::SearchFailure;
use crate::match_context::MatchContext;

/// Checks that `query_node` matches `file_node` including all descendants.
///
/// Starts from a copy of `context` and returns the extended bindings on
/// success, `None` when the nodes do not match.
///
/// # Errors
///
/// Returns [`SearchFailure::ContractViolation`] when a comparator returns
/// query and file key lists of different lengths.
pub fn validate_match<'f>(
    file_node: &'f GenericNode,
    query_node: &GenericNode,
    settings: &SearchSettings<'_>,
    context: &MatchContext<'f>,
) -> Result<Option<MatchContext<'f>>, SearchFailure> {
    let mut local = context.clone();
    let outcome = compare_nodes(&CompareInput::new(file_node, query_node), &mut local, settings);
    validate_outcome(file_node, query_node, &outcome, settings, local)
}

/// Validates the keys listed by an already computed [`CompareOutcome`].
pub(super) fn validate_outcome<'f>(
    file_node: &'f GenericNode,
    query_node: &GenericNode,
    outcome: &CompareOutcome,
    settings: &SearchSettings<'_>,
    context: MatchContext<'f>,
) -> Result<Option<MatchContext<'f>>, SearchFailure> {
    let _timing = settings.logger.measure("validate");
    if outcome.query_keys_to_validate.len() != outcome.file_keys_to_validate.len() {
        return Err(SearchFailure::contract_violation(format!(
            "keys to validate differ for {} and {}: {:?} vs {:?}",
            file_node.kind(),
            query_node.kind(),
            outcome.file_keys_to_validate,
            outcome.query_keys_to_validate,
        )));
    }
    if !outcome.level_match {
        return Ok(None);
    }

    let mut local = context;
    let key_pairs = outcome
        .query_keys_to_validate
        .iter()
        .zip(&outcome.file_keys_to_validate);
    for (query_key, file_key) in key_pairs {
        let (Some(query_value), Some(file_value)) =
            (query_node.value_at(query_key), file_node.value_at(file_key))
        else {
            settings
                .logger
                .log(format_args!("validate: missing {query_key} / {file_key}"));
            return Ok(None);
        };

        let validated = match (file_value, query_value) {
            (FieldValue::Scalar(file_scalar), FieldValue::Scalar(query_scalar)) => {
                (file_scalar == query_scalar).then_some(local)
            }
            (FieldValue::Node(file_child), FieldValue::Node(query_child)) => {
                validate_match(file_child, query_child, settings, &local)?
            }
            _ => match (file_value.as_nodes(), query_value.as_nodes()) {
                (Some(file_nodes), Some(query_nodes)) => {
                    validate_lists(file_nodes, query_nodes, settings, local)?
                }
                _ => None,
            },
        };
        match validated {
            Some(extended) => local = extended,
            None => return Ok(None),
        }
    }
    Ok(Some(local))
}

fn validate_lists<'f>(
    file_nodes: &'f [GenericNode],
    query_nodes: &[GenericNode],
    settings: &SearchSettings<'_>,
    context: MatchContext<'f>,
) -> Result<Option<MatchContext<'f>>, SearchFailure> {
    let adapter = settings.adapter;
    let file_nodes: Vec<&'f GenericNode> = file_nodes
        .iter()
        .filter(|node| adapter.should_compare_node(node))
        .collect();
    let query_nodes: Vec<&GenericNode> = query_nodes
        .iter()
        .filter(|node| adapter.should_compare_node(node))
        .collect();

    match settings.mode {
        Mode::Exact => validate_exact(&file_nodes, &query_nodes, settings, context),
        Mode::IncludeWithOrder => validate_ordered(&file_nodes, &query_nodes, settings, context),
        Mode::Include | Mode::Text => validate_unordered(&file_nodes, &query_nodes, settings, context),
    }
}

fn validate_exact<'f>(
    file_nodes: &[&'f GenericNode],
    query_nodes: &[&GenericNode],
    settings: &SearchSettings<'_>,
    context: MatchContext<'f>,
) -> Result<Option<MatchContext<'f>>, SearchFailure> {
    if file_nodes.len() != query_nodes.len() {
        return Ok(None);
    }
    let mut local = context;
    for (file_node, query_node) in file_nodes.iter().zip(query_nodes) {
        match validate_match(*file_node, query_node, settings, &local)? {
            Some(extended) => local = extended,
            None => return Ok(None),
        }
    }
    Ok(Some(local))
}

/// Greedy first-fit assignment of query elements to unused file elements.
///
/// Specific query elements are placed first. When that reordering makes the
/// assignment fail, the elements are retried in their written order, so an
/// ordered match is always also an unordered one.
fn validate_unordered<'f>(
    file_nodes: &[&'f GenericNode],
    query_nodes: &[&GenericNode],
    settings: &SearchSettings<'_>,
    context: MatchContext<'f>,
) -> Result<Option<MatchContext<'f>>, SearchFailure> {
    if query_nodes.len() > file_nodes.len() {
        settings
            .logger
            .log(format_args!("validate: more query nodes than file nodes"));
        return Ok(None);
    }
    let mut ranked = query_nodes.to_vec();
    ranked.sort_by_key(|node| identifier_strength_rank(node, settings.adapter));
    let reordered = ranked
        .iter()
        .zip(query_nodes)
        .any(|(left, right)| !std::ptr::eq(*left, *right));

    if let Some(extended) = assign_first_fit(file_nodes, &ranked, settings, &context)? {
        return Ok(Some(extended));
    }
    if !reordered {
        return Ok(None);
    }
    settings
        .logger
        .log(format_args!("validate: retrying list in written order"));
    validate_ordered(file_nodes, query_nodes, settings, context)
}

fn assign_first_fit<'f>(
    file_nodes: &[&'f GenericNode],
    query_nodes: &[&GenericNode],
    settings: &SearchSettings<'_>,
    context: &MatchContext<'f>,
) -> Result<Option<MatchContext<'f>>, SearchFailure> {
    let mut used = vec![false; file_nodes.len()];
    let mut local = context.clone();
    for query_node in query_nodes {
        let mut assigned = None;
        for (index, file_node) in file_nodes.iter().enumerate() {
            if used.get(index).copied().unwrap_or(true) {
                continue;
            }
            if let Some(extended) = validate_match(*file_node, query_node, settings, &local)? {
                assigned = Some((index, extended));
                break;
            }
        }
        let Some((index, extended)) = assigned else {
            return Ok(None);
        };
        if let Some(slot) = used.get_mut(index) {
            *slot = true;
        }
        local = extended;
    }
    Ok(Some(local))
}

/// Matches query elements against file elements in order, skipping file
/// elements that do not match.
fn validate_ordered<'f>(
    file_nodes: &[&'f GenericNode],
    query_nodes: &[&GenericNode],
    settings: &SearchSettings<'_>,
    context: MatchContext<'f>,
) -> Result<Option<MatchContext<'f>>, SearchFailure> {
    if query_nodes.len() > file_nodes.len() {
        return Ok(None);
    }
    let mut local = context;
    let mut next = 0;
    for file_node in file_nodes {
        let Some(query_node) = query_nodes.get(next) else {
            break;
        };
        if let Some(extended) = validate_match(*file_node, query_node, settings, &local)? {
            local = extended;
            next += 1;
        }
    }
    Ok((next == query_nodes.len()).then_some(local))
}
