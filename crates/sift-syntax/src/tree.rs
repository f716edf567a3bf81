//! Parser-agnostic tree model.
//!
//! Every grammar is searched through [`GenericNode`]: a node kind plus an
//! ordered list of named fields, where each field holds a scalar, a single
//! child node or an ordered list of child nodes. The matcher inspects fields
//! generically, so it never depends on a concrete grammar's node types.
//!
//! Conversion from Tree-sitter follows a few fixed rules:
//!
//! - named children are stored under their grammar field name, or under
//!   [`CHILDREN_FIELD`] when the grammar gives them none;
//! - a field seen twice or more becomes a [`FieldValue::NodeList`];
//! - anonymous tokens stored under a field (operators, `let`/`const`) become
//!   [`Scalar::Text`] values, unfielded keyword tokens (`async`, `export`)
//!   become [`Scalar::Flag`] values named after the keyword;
//! - leaves keep their source text under [`TEXT_FIELD`].

use crate::position::TextPosition;

/// Field holding unfielded named children.
pub const CHILDREN_FIELD: &str = "children";

/// Field holding the source text of a leaf node.
pub const TEXT_FIELD: &str = "text";

/// Field holding the decoded value of a literal collapsed by a
/// [`LeafDecoder`].
pub const VALUE_FIELD: &str = "value";

/// Decodes a literal node into a plain value.
///
/// Receives the node kind and its raw source text. Returning `Some` turns
/// the node into a leaf whose only field is [`VALUE_FIELD`].
pub type LeafDecoder = fn(kind: &str, raw: &str) -> Option<String>;

/// Grammar-specific knobs for building a generic tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeOptions {
    /// Node kinds dropped entirely, such as comments.
    pub skipped_kinds: &'static [&'static str],
    /// Wrapper kinds replaced by their single named child.
    pub transparent_kinds: &'static [&'static str],
    /// Optional literal decoder.
    pub leaf_decoder: Option<LeafDecoder>,
}

impl TreeOptions {
    /// Creates options that keep every node.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            skipped_kinds: &[],
            transparent_kinds: &[],
            leaf_decoder: None,
        }
    }

    /// Drops the given node kinds during conversion.
    #[must_use]
    pub const fn with_skipped_kinds(mut self, kinds: &'static [&'static str]) -> Self {
        self.skipped_kinds = kinds;
        self
    }

    /// Replaces the given wrapper kinds by their only named child.
    #[must_use]
    pub const fn with_transparent_kinds(mut self, kinds: &'static [&'static str]) -> Self {
        self.transparent_kinds = kinds;
        self
    }

    /// Collapses literals through `decoder`.
    #[must_use]
    pub const fn with_leaf_decoder(mut self, decoder: LeafDecoder) -> Self {
        self.leaf_decoder = Some(decoder);
        self
    }

    fn skips(&self, kind: &str) -> bool {
        self.skipped_kinds.contains(&kind)
    }

    fn is_transparent(&self, kind: &str) -> bool {
        self.transparent_kinds.contains(&kind)
    }
}

/// Byte range and line/column span of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeSpan {
    /// Start byte offset (inclusive).
    pub start_byte: usize,
    /// End byte offset (exclusive).
    pub end_byte: usize,
    /// Start position.
    pub start: TextPosition,
    /// End position.
    pub end: TextPosition,
}

impl NodeSpan {
    /// Creates a span from byte offsets and positions.
    #[must_use]
    pub const fn new(
        start_byte: usize,
        end_byte: usize,
        start: TextPosition,
        end: TextPosition,
    ) -> Self {
        Self {
            start_byte,
            end_byte,
            start,
            end,
        }
    }

    fn of(node: tree_sitter::Node<'_>) -> Self {
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start: node.start_position().into(),
            end: node.end_position().into(),
        }
    }
}

/// A primitive field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// Textual value: identifier names, operators, literal contents.
    Text(String),
    /// Presence marker for keyword tokens.
    Flag(bool),
}

impl Scalar {
    /// Returns the text of a [`Scalar::Text`] value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) => None,
        }
    }
}

/// The value held by a node field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// A primitive.
    Scalar(Scalar),
    /// A single child node.
    Node(Box<GenericNode>),
    /// An ordered list of child nodes.
    NodeList(Vec<GenericNode>),
}

impl FieldValue {
    /// Returns the scalar, if this field holds one.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            Self::Node(_) | Self::NodeList(_) => None,
        }
    }

    /// Returns the child node, if this field holds a single node.
    #[must_use]
    pub fn as_node(&self) -> Option<&GenericNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Scalar(_) | Self::NodeList(_) => None,
        }
    }

    /// Returns the field as a slice of nodes.
    ///
    /// A single node is viewed as a one-element list; scalars yield `None`.
    #[must_use]
    pub fn as_nodes(&self) -> Option<&[GenericNode]> {
        match self {
            Self::Node(node) => Some(std::slice::from_ref(node.as_ref())),
            Self::NodeList(nodes) => Some(nodes),
            Self::Scalar(_) => None,
        }
    }

    /// Returns whether the field holds nodes rather than a primitive.
    #[must_use]
    pub const fn holds_nodes(&self) -> bool {
        matches!(self, Self::Node(_) | Self::NodeList(_))
    }
}

/// A named field of a [`GenericNode`].
#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    value: FieldValue,
}

impl Field {
    /// Returns the field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the field value.
    #[must_use]
    pub const fn value(&self) -> &FieldValue {
        &self.value
    }
}

/// One node of the generic tree.
#[derive(Debug, Clone)]
pub struct GenericNode {
    kind: &'static str,
    fields: Vec<Field>,
    span: NodeSpan,
}

impl GenericNode {
    /// Creates a node without fields.
    #[must_use]
    pub const fn new(kind: &'static str, span: NodeSpan) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            span,
        }
    }

    /// Returns the grammar kind of the node.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns the node span.
    #[must_use]
    pub const fn span(&self) -> &NodeSpan {
        &self.span
    }

    /// Returns all fields in source order of first appearance.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Returns a textual scalar field.
    #[must_use]
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.field(name)
            .and_then(FieldValue::as_scalar)
            .and_then(Scalar::as_text)
    }

    /// Returns the source text of a leaf.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text_field(TEXT_FIELD)
    }

    /// Returns the children stored under [`CHILDREN_FIELD`].
    #[must_use]
    pub fn children(&self) -> &[GenericNode] {
        self.field(CHILDREN_FIELD)
            .and_then(FieldValue::as_nodes)
            .unwrap_or_default()
    }

    /// Returns the single child node stored under `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&GenericNode> {
        self.field(name).and_then(FieldValue::as_node)
    }

    /// Resolves a dotted key path such as `open_tag.name`.
    ///
    /// Every segment but the last must name a single-node field.
    #[must_use]
    pub fn value_at(&self, path: &str) -> Option<&FieldValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut value = self.field(first)?;
        for segment in segments {
            value = value.as_node()?.field(segment)?;
        }
        Some(value)
    }

    /// Iterates over every direct child node, field by field.
    pub fn node_children(&self) -> impl Iterator<Item = &GenericNode> {
        self.fields
            .iter()
            .filter_map(|field| field.value.as_nodes())
            .flatten()
    }

    /// Returns the source text covered by the node.
    #[must_use]
    pub fn source_text<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.span.start_byte..self.span.end_byte)
            .unwrap_or_default()
    }

    /// Appends a child node under `name`.
    ///
    /// Repeated names turn the field into a list; [`CHILDREN_FIELD`] is
    /// always a list.
    pub fn push_node(&mut self, name: &'static str, node: Self) {
        let Some(field) = self.fields.iter_mut().find(|field| field.name == name) else {
            let value = if name == CHILDREN_FIELD {
                FieldValue::NodeList(vec![node])
            } else {
                FieldValue::Node(Box::new(node))
            };
            self.fields.push(Field { name, value });
            return;
        };

        match &mut field.value {
            FieldValue::NodeList(nodes) => nodes.push(node),
            FieldValue::Node(existing) => {
                let first = std::mem::replace(existing.as_mut(), Self::new(name, NodeSpan::default()));
                field.value = FieldValue::NodeList(vec![first, node]);
            }
            // Scalars never share a name with nodes in practice; keep the scalar.
            FieldValue::Scalar(_) => {}
        }
    }

    /// Adds a scalar field unless a field with that name already exists.
    pub fn push_scalar(&mut self, name: &'static str, scalar: Scalar) {
        if self.field(name).is_none() {
            self.fields.push(Field {
                name,
                value: FieldValue::Scalar(scalar),
            });
        }
    }

    /// Stores a node list under `name`, replacing any previous value.
    pub fn set_nodes(&mut self, name: &'static str, nodes: Vec<Self>) {
        let value = FieldValue::NodeList(nodes);
        if let Some(field) = self.fields.iter_mut().find(|field| field.name == name) {
            field.value = value;
        } else {
            self.fields.push(Field { name, value });
        }
    }

    /// Applies `rewrite` to every text scalar in this subtree.
    pub fn rewrite_text(&mut self, rewrite: &mut dyn FnMut(&mut String)) {
        for field in &mut self.fields {
            match &mut field.value {
                FieldValue::Scalar(Scalar::Text(text)) => rewrite(text),
                FieldValue::Scalar(Scalar::Flag(_)) => {}
                FieldValue::Node(node) => node.rewrite_text(rewrite),
                FieldValue::NodeList(nodes) => {
                    for node in nodes {
                        node.rewrite_text(rewrite);
                    }
                }
            }
        }
    }

    /// Takes the children list out of the node, leaving it empty.
    pub fn take_children(&mut self) -> Vec<Self> {
        let Some(index) = self
            .fields
            .iter()
            .position(|field| field.name == CHILDREN_FIELD)
        else {
            return Vec::new();
        };
        match self.fields.remove(index).value {
            FieldValue::NodeList(nodes) => nodes,
            FieldValue::Node(node) => vec![*node],
            FieldValue::Scalar(_) => Vec::new(),
        }
    }
}

/// Converts a Tree-sitter subtree into a [`GenericNode`].
#[must_use]
pub fn build_generic_tree(
    root: tree_sitter::Node<'_>,
    source: &str,
    options: &TreeOptions,
) -> GenericNode {
    let node = unwrap_transparent(root, options);
    let mut generic = GenericNode::new(node.kind(), NodeSpan::of(node));
    let raw = source.get(node.byte_range()).unwrap_or_default();

    if let Some(decoded) = options.leaf_decoder.and_then(|decode| decode(node.kind(), raw)) {
        generic.push_scalar(VALUE_FIELD, Scalar::Text(decoded));
        return generic;
    }

    if node.child_count() == 0 {
        generic.push_scalar(TEXT_FIELD, Scalar::Text(raw.to_owned()));
        return generic;
    }

    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return generic;
    }
    loop {
        let child = cursor.node();
        let field_name = cursor.field_name();
        if options.skips(child.kind()) {
            // dropped
        } else if child.is_named() {
            let converted = build_generic_tree(child, source, options);
            generic.push_node(field_name.unwrap_or(CHILDREN_FIELD), converted);
        } else if let Some(name) = field_name {
            generic.push_scalar(name, Scalar::Text(child.kind().to_owned()));
        } else if is_keyword(child.kind()) {
            generic.push_scalar(child.kind(), Scalar::Flag(true));
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }

    generic
}

fn unwrap_transparent<'t>(mut node: tree_sitter::Node<'t>, options: &TreeOptions) -> tree_sitter::Node<'t> {
    while options.is_transparent(node.kind()) {
        let single = {
            let mut cursor = node.walk();
            let mut named = node
                .named_children(&mut cursor)
                .filter(|child| !options.skips(child.kind()));
            match (named.next(), named.next()) {
                (Some(only), None) => Some(only),
                _ => None,
            }
        };
        let Some(only) = single else {
            break;
        };
        node = only;
    }
    node
}

fn is_keyword(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
}
