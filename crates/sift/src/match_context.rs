//! Alias bindings collected during one match attempt.

use std::collections::BTreeMap;

use sift_core::MatchAliases;
use sift_syntax::GenericNode;

use crate::wildcard::WildcardMeta;

/// A text value bound to an identifier or string alias.
#[derive(Debug, Clone)]
pub struct TextAlias {
    /// Wildcard that captured the value.
    pub wildcard: WildcardMeta,
    /// Captured text.
    pub value: String,
}

/// A subtree bound to a node-subtree alias.
#[derive(Debug, Clone)]
pub struct NodeAlias<'f> {
    /// Wildcard that captured the subtree.
    pub wildcard: WildcardMeta,
    /// Captured file node.
    pub node: &'f GenericNode,
}

/// Alias bindings of one match attempt.
///
/// Bindings borrow file nodes, so a context lives no longer than the file
/// tree being searched. Branches of an include-mode search work on clones
/// and only successful branches are merged back.
#[derive(Debug, Clone, Default)]
pub struct MatchContext<'f> {
    identifier: BTreeMap<String, TextAlias>,
    string: BTreeMap<String, TextAlias>,
    nodes_tree: BTreeMap<String, NodeAlias<'f>>,
}

impl<'f> MatchContext<'f> {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds an identifier alias.
    pub fn add_identifier_alias(&mut self, alias: impl Into<String>, value: TextAlias) {
        self.identifier.insert(alias.into(), value);
    }

    /// Looks up an identifier alias.
    #[must_use]
    pub fn identifier_alias(&self, alias: &str) -> Option<&TextAlias> {
        self.identifier.get(alias)
    }

    /// Binds a string alias.
    pub fn add_string_alias(&mut self, alias: impl Into<String>, value: TextAlias) {
        self.string.insert(alias.into(), value);
    }

    /// Looks up a string alias.
    #[must_use]
    pub fn string_alias(&self, alias: &str) -> Option<&TextAlias> {
        self.string.get(alias)
    }

    /// Binds a node-subtree alias.
    pub fn add_nodes_tree_alias(&mut self, alias: impl Into<String>, value: NodeAlias<'f>) {
        self.nodes_tree.insert(alias.into(), value);
    }

    /// Looks up a node-subtree alias.
    #[must_use]
    pub fn nodes_tree_alias(&self, alias: &str) -> Option<&NodeAlias<'f>> {
        self.nodes_tree.get(alias)
    }

    /// Looks up a text alias, identifiers first.
    ///
    /// Identifier and string aliases share one namespace.
    #[must_use]
    pub fn text_alias(&self, alias: &str) -> Option<&TextAlias> {
        self.identifier_alias(alias)
            .or_else(|| self.string_alias(alias))
    }

    /// Folds the bindings of another context into this one.
    ///
    /// Validation threads contexts by value and never joins branches, so the
    /// matcher itself does not call this; it is for callers combining
    /// contexts built separately.
    pub fn merge(&mut self, other: &Self) {
        self.identifier
            .extend(other.identifier.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.string
            .extend(other.string.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.nodes_tree
            .extend(other.nodes_tree.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Returns whether nothing has been bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifier.is_empty() && self.string.is_empty() && self.nodes_tree.is_empty()
    }

    /// Snapshots the bindings for a match record.
    ///
    /// Node aliases are rendered as the source text they cover.
    #[must_use]
    pub fn to_aliases(&self, source: &str) -> MatchAliases {
        MatchAliases {
            identifier: self
                .identifier
                .iter()
                .map(|(alias, bound)| (alias.clone(), bound.value.clone()))
                .collect(),
            string: self
                .string
                .iter()
                .map(|(alias, bound)| (alias.clone(), bound.value.clone()))
                .collect(),
            nodes_tree: self
                .nodes_tree
                .iter()
                .map(|(alias, bound)| (alias.clone(), bound.node.source_text(source).to_owned()))
                .collect(),
        }
    }
}
