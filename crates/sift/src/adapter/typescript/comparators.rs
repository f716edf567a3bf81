//! TypeScript-specific node equivalences.

use sift_core::Mode;
use sift_syntax::{Field, GenericNode, VALUE_FIELD};

use crate::match_context::{MatchContext, TextAlias};
use crate::matcher::{
    CompareInput, CompareOutcome, SearchSettings, compare_nodes, match_identifier_text,
};
use crate::wildcard::{IDENTIFIER_WILDCARD, NODES_TREE_WILDCARD, identifier_wildcards, strip_aliases};

/// `{ a }` and `[a]` in a query match `{ a = 1 }` and `[a = 1]`.
pub(super) fn identifier_with_default_value<'f>(
    input: &CompareInput<'f, '_>,
    context: &mut MatchContext<'f>,
    settings: &SearchSettings<'_>,
    _other: &[&'static str],
) -> Option<CompareOutcome> {
    if settings.mode == Mode::Exact {
        return None;
    }
    let (file, query) = (input.file_node, input.query_node);
    let query_is_name = matches!(
        query.kind(),
        "identifier" | "shorthand_property_identifier_pattern"
    );
    let file_has_default = matches!(
        file.kind(),
        "object_assignment_pattern" | "assignment_pattern"
    );
    if !query_is_name || !file_has_default {
        return None;
    }
    let left = file.child("left")?;
    Some(compare_nodes(
        &CompareInput::new(left, query).with_file_prefix("left"),
        context,
        settings,
    ))
}

/// A `$$` type reference matches built-in types such as `string`.
pub(super) fn type_keyword_wildcard<'f>(
    input: &CompareInput<'f, '_>,
    context: &mut MatchContext<'f>,
    _settings: &SearchSettings<'_>,
    other: &[&'static str],
) -> Option<CompareOutcome> {
    let (file, query) = (input.file_node, input.query_node);
    if query.kind() != "type_identifier" || file.kind() != "predefined_type" {
        return None;
    }
    let name = query.text()?;
    if strip_aliases(name) != IDENTIFIER_WILDCARD {
        return None;
    }
    let wildcard = identifier_wildcards(name).into_iter().next()?;
    if let (Some(alias), Some(keyword)) = (wildcard.alias.clone(), file.fields().first().map(Field::name)) {
        if let Some(bound) = context.text_alias(&alias) {
            return Some(CompareOutcome::level(bound.value == keyword, other));
        }
        context.add_identifier_alias(
            alias,
            TextAlias {
                wildcard,
                value: keyword.to_owned(),
            },
        );
    }
    Some(CompareOutcome::level(true, other))
}

const OPTIONAL_CHAIN_FIELD: &str = "optional_chain";

/// `a.b` matches `a?.b` and `f()` matches `f?.()`, in both directions.
pub(super) fn optional_chaining<'f>(
    input: &CompareInput<'f, '_>,
    _context: &mut MatchContext<'f>,
    settings: &SearchSettings<'_>,
    other: &[&'static str],
) -> Option<CompareOutcome> {
    if settings.mode == Mode::Exact {
        return None;
    }
    let (file, query) = (input.file_node, input.query_node);
    let is_chainable = matches!(query.kind(), "member_expression" | "call_expression");
    if !is_chainable || file.kind() != query.kind() {
        return None;
    }
    let file_chained = file.field(OPTIONAL_CHAIN_FIELD).is_some();
    let query_chained = query.field(OPTIONAL_CHAIN_FIELD).is_some();
    if file_chained == query_chained {
        return None;
    }

    let keys: Vec<&'static str> = query
        .fields()
        .iter()
        .map(Field::name)
        .filter(|name| *name != OPTIONAL_CHAIN_FIELD)
        .collect();
    let level_match = keys.iter().all(|key| file.field(key).is_some());
    Some(CompareOutcome::with_shared_keys(level_match, &keys, other))
}

fn has_jsx_children(element: &GenericNode, settings: &SearchSettings<'_>) -> bool {
    element
        .children()
        .iter()
        .any(|child| settings.adapter.should_compare_node(child))
}

/// `<A b />` matches `<A b></A>` and the other way round.
pub(super) fn self_closing_jsx_element<'f>(
    input: &CompareInput<'f, '_>,
    _context: &mut MatchContext<'f>,
    settings: &SearchSettings<'_>,
    other: &[&'static str],
) -> Option<CompareOutcome> {
    let (file, query) = (input.file_node, input.query_node);
    match (query.kind(), file.kind()) {
        ("jsx_self_closing_element", "jsx_element") => {
            let open_tag = file.child("open_tag")?;
            let level_match = !has_jsx_children(file, settings)
                && attributes_compatible(query, open_tag, settings.mode);
            let (query_keys, file_keys) = tag_keys(query);
            Some(CompareOutcome::with_keys(level_match, query_keys, file_keys, other))
        }
        ("jsx_element", "jsx_self_closing_element") => {
            let open_tag = query.child("open_tag")?;
            let level_match = !has_jsx_children(query, settings)
                && attributes_compatible(open_tag, file, settings.mode);
            let (file_keys, query_keys) = tag_keys(open_tag);
            Some(CompareOutcome::with_keys(level_match, query_keys, file_keys, other))
        }
        _ => None,
    }
}

/// Exact mode rejects attributes present on one side only.
fn attributes_compatible(query_tag: &GenericNode, file_tag: &GenericNode, mode: Mode) -> bool {
    mode != Mode::Exact || query_tag.field("attribute").is_some() == file_tag.field("attribute").is_some()
}

/// Pairs the `name` and `attribute` keys present on `tag` with the same keys
/// below an element's `open_tag`.
fn tag_keys(tag: &GenericNode) -> (Vec<&'static str>, Vec<String>) {
    ["name", "attribute"]
        .into_iter()
        .filter(|key| tag.field(key).is_some())
        .map(|key| (key, format!("open_tag.{key}")))
        .unzip()
}

/// `const { a } = x` matches `const { a: b } = x`.
pub(super) fn renamed_destructuring<'f>(
    input: &CompareInput<'f, '_>,
    context: &mut MatchContext<'f>,
    settings: &SearchSettings<'_>,
    other: &[&'static str],
) -> Option<CompareOutcome> {
    if settings.mode == Mode::Exact {
        return None;
    }
    let (file, query) = (input.file_node, input.query_node);
    if query.kind() != "shorthand_property_identifier_pattern" || file.kind() != "pair_pattern" {
        return None;
    }
    let query_name = query.text()?;
    let file_key = file.child("key").and_then(GenericNode::text)?;
    let level_match = match_identifier_text(query_name, file_key, context, settings);
    Some(CompareOutcome::level(level_match, other))
}

/// `import $$$ from 'x'` matches every import clause.
pub(super) fn any_import<'f>(
    input: &CompareInput<'f, '_>,
    _context: &mut MatchContext<'f>,
    _settings: &SearchSettings<'_>,
    other: &[&'static str],
) -> Option<CompareOutcome> {
    let (file, query) = (input.file_node, input.query_node);
    if query.kind() != "import_clause" || file.kind() != "import_clause" {
        return None;
    }
    let [only] = query.children() else {
        return None;
    };
    let is_bare_wildcard = only.kind() == "identifier" && only.text() == Some(NODES_TREE_WILDCARD);
    if !is_bare_wildcard || query.fields().len() != 1 {
        return None;
    }
    Some(CompareOutcome::level(true, other))
}

fn literal_key(key: &GenericNode) -> Option<&str> {
    match key.kind() {
        "property_identifier" | "number" => key.text(),
        "string" => key.text_field(VALUE_FIELD),
        _ => None,
    }
}

/// `{ a: 1 }`, `{ 'a': 1 }` and `{ "a": 1 }` are the same object.
pub(super) fn literal_object_keys<'f>(
    input: &CompareInput<'f, '_>,
    _context: &mut MatchContext<'f>,
    _settings: &SearchSettings<'_>,
    other: &[&'static str],
) -> Option<CompareOutcome> {
    let (file, query) = (input.file_node, input.query_node);
    if query.kind() != "pair" || file.kind() != "pair" {
        return None;
    }
    let query_key = query.child("key")?;
    let file_key = file.child("key")?;
    if query_key.kind() == file_key.kind() {
        return None;
    }
    let level_match = matches!(
        (literal_key(query_key), literal_key(file_key)),
        (Some(query_value), Some(file_value)) if query_value == file_value
    );
    Some(CompareOutcome::with_shared_keys(level_match, &["value"], other))
}

/// Outside exact mode a blank text run of a template string matches any
/// text run, so `` `${a} ${b}` `` finds `` `${a}-${b}` ``.
pub(super) fn partial_template_fragment<'f>(
    input: &CompareInput<'f, '_>,
    _context: &mut MatchContext<'f>,
    settings: &SearchSettings<'_>,
    other: &[&'static str],
) -> Option<CompareOutcome> {
    if settings.mode == Mode::Exact {
        return None;
    }
    let (file, query) = (input.file_node, input.query_node);
    if query.kind() != "string_fragment" || file.kind() != "string_fragment" {
        return None;
    }
    query
        .text()
        .is_some_and(|text| text.trim().is_empty())
        .then(|| CompareOutcome::level(true, other))
}
