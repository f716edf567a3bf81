//! Whole-file traversal.

use sift_syntax::{GenericNode, NodeSpan};

use super::compare::compare_nodes;
use super::validate::validate_outcome;
use super::{CompareInput, SearchSettings};
use crate::error::SearchFailure;
use crate::match_context::MatchContext;

/// A validated match inside a file tree.
#[derive(Debug, Clone)]
pub struct AstMatch<'f> {
    /// Matched file node.
    pub node: &'f GenericNode,
    /// Reported span; narrower than the node for multi-statement queries.
    pub span: NodeSpan,
    /// Aliases bound by the match.
    pub context: MatchContext<'f>,
}

/// Finds every match of `query` in the tree rooted at `root`.
///
/// Nodes are visited in pre-order. Traversal continues below matched nodes,
/// so nested occurrences are reported as separate matches.
///
/// # Errors
///
/// Returns [`SearchFailure::ContractViolation`] when a comparator names
/// keys missing from the node it describes.
pub fn traverse_and_match<'f>(
    root: &'f GenericNode,
    query: &GenericNode,
    settings: &SearchSettings<'_>,
) -> Result<Vec<AstMatch<'f>>, SearchFailure> {
    let _timing = settings.logger.measure("traverse");
    let mut matches = Vec::new();
    let mut pending = vec![root];

    while let Some(node) = pending.pop() {
        let mut context = MatchContext::new();
        let outcome = compare_nodes(&CompareInput::new(node, query), &mut context, settings);
        if outcome.level_match {
            settings
                .logger
                .log(format_args!("traverse: level match at {}", node.kind()));
            if let Some(bound) = validate_outcome(node, query, &outcome, settings, context)? {
                matches.push(AstMatch {
                    node,
                    span: *node.span(),
                    context: bound,
                });
            }
        }

        for key in outcome.file_keys_for_other_matches.iter().rev() {
            let field = node.field(key).ok_or_else(|| {
                SearchFailure::contract_violation(format!(
                    "'{key}' is not a field of {}",
                    node.kind()
                ))
            })?;
            if let Some(children) = field.as_nodes() {
                pending.extend(children.iter().rev());
            }
        }
    }
    Ok(matches)
}

/// Narrows a multi-statement match to the statements the query names.
///
/// Each query statement is matched again inside the matched block and the
/// first match not already picked is kept; the reported span runs from the
/// earliest picked statement to the latest. The match is returned unchanged
/// when a statement cannot be located.
///
/// # Errors
///
/// Propagates [`traverse_and_match`] failures.
pub fn tighten_multistatement_span<'f>(
    found: AstMatch<'f>,
    query: &GenericNode,
    settings: &SearchSettings<'_>,
) -> Result<AstMatch<'f>, SearchFailure> {
    let mut picked: Vec<&'f GenericNode> = vec![found.node];
    let mut spans: Vec<NodeSpan> = Vec::new();

    for statement in query.children() {
        let candidates = traverse_and_match(found.node, statement, settings)?;
        let Some(first) = candidates
            .into_iter()
            .find(|candidate| !picked.iter().any(|node| std::ptr::eq(*node, candidate.node)))
        else {
            return Ok(found);
        };
        picked.push(first.node);
        spans.push(first.span);
    }

    let earliest = spans.iter().min_by_key(|span| span.start_byte);
    let latest = spans.iter().max_by_key(|span| span.end_byte);
    let (Some(start), Some(end)) = (earliest, latest) else {
        return Ok(found);
    };
    let span = NodeSpan::new(start.start_byte, end.end_byte, start.start, end.end);
    Ok(AstMatch { span, ..found })
}
