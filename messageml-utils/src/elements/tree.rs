//! Arena-allocated element tree.
//!
//! All nodes are stored in one vector owned by the [`Tree`]; children are index
//! lists and the parent link is a plain index. The builder is the only writer;
//! once parsing succeeds the tree is handed out behind shared references.

use super::{Dialect, ElementKind};
use crate::users::UserPresentation;
use serde_json::Value;

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Ordered attribute bag. Re-setting a name keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let position = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(position).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort();
        pairs
    }
}

/// Data resolved for an entity-bearing node while building.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityData {
    /// The user a mention refers to
    User(UserPresentation),
    /// Extension entity payload, re-emitted verbatim
    Extension(Value),
}

/// A node in the element tree.
#[derive(Debug, Clone)]
pub struct Node {
    kind: ElementKind,
    format: Dialect,
    attributes: Attributes,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    entity_id: Option<String>,
    entity_data: Option<EntityData>,
    presentation_tag: Option<&'static str>,
}

impl Node {
    fn new(kind: ElementKind, format: Dialect, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            format,
            attributes: Attributes::default(),
            text: None,
            children: Vec::new(),
            parent,
            entity_id: None,
            entity_data: None,
            presentation_tag: None,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn format(&self) -> Dialect {
        self.format
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Attribute value, `None` when unset
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// Text content of a text node
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_text(&self) -> bool {
        self.kind == ElementKind::Text
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub(crate) fn set_entity_id(&mut self, id: impl Into<String>) {
        self.entity_id = Some(id.into());
    }

    pub fn entity_data(&self) -> Option<&EntityData> {
        self.entity_data.as_ref()
    }

    pub(crate) fn set_entity_data(&mut self, data: EntityData) {
        self.entity_data = Some(data);
    }

    /// Tag used when rendering PresentationML
    pub fn presentation_tag(&self) -> &'static str {
        self.presentation_tag
            .unwrap_or_else(|| self.kind.presentationml_tag())
    }

    pub(crate) fn set_presentation_tag(&mut self, tag: &'static str) {
        self.presentation_tag = Some(tag);
    }
}

/// The arena owning every node of one parsed message.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    format: Dialect,
}

impl Tree {
    /// A tree containing only the `messageML` root
    pub fn new(format: Dialect) -> Self {
        Tree {
            nodes: vec![Node::new(ElementKind::MessageMl, format, None)],
            format,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Dialect the document was parsed from
    pub fn format(&self) -> Dialect {
        self.format
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1 && self.nodes[0].children.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> ElementKind {
        self.node(id).kind
    }

    /// Attach a new element under `parent`
    pub fn append(&mut self, parent: NodeId, kind: ElementKind, format: Dialect) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, format, Some(parent)));
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Attach a text node under `parent`
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        let format = self.node(parent).format;
        let id = self.append(parent, ElementKind::Text, format);
        self.nodes[id.index()].text = Some(text.into());
        id
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Children that are elements (text nodes skipped)
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| !self.node(*child).is_text())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn parent_kind(&self, id: NodeId) -> Option<ElementKind> {
        self.parent(id).map(|p| self.kind(p))
    }

    /// Ancestors from the parent upwards to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    pub fn has_ancestor_of(&self, id: NodeId, kinds: &[ElementKind]) -> bool {
        self.ancestors(id).any(|a| kinds.contains(&self.kind(a)))
    }

    /// Every node below `id` in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn find_descendants<P>(&self, id: NodeId, predicate: P) -> Vec<NodeId>
    where
        P: Fn(&Node) -> bool,
    {
        self.descendants(id)
            .into_iter()
            .filter(|d| predicate(self.node(*d)))
            .collect()
    }

    pub fn count_children_of(&self, id: NodeId, kind: ElementKind) -> usize {
        self.children(id)
            .iter()
            .filter(|c| self.kind(**c) == kind)
            .count()
    }

    pub fn count_descendants_of(&self, id: NodeId, kind: ElementKind) -> usize {
        self.find_descendants(id, |n| n.kind == kind).len()
    }

    /// Concatenated text of every text node below `id`
    pub fn text_content(&self, id: NodeId) -> String {
        let node = self.node(id);
        if let Some(text) = node.text() {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.node(d).text())
            .collect()
    }

    /// Content equality: kinds, attribute sets and text, ignoring identifiers
    /// and the dialect each tree came from.
    pub fn content_eq(&self, other: &Tree) -> bool {
        self.subtree_eq(self.root(), other, other.root())
    }

    fn subtree_eq(&self, id: NodeId, other: &Tree, other_id: NodeId) -> bool {
        let a = self.node(id);
        let b = other.node(other_id);
        a.kind == b.kind
            && a.text == b.text
            && a.attributes.sorted() == b.attributes.sorted()
            && a.children.len() == b.children.len()
            && a.children
                .iter()
                .zip(b.children.iter())
                .all(|(x, y)| self.subtree_eq(*x, other, *y))
    }
}

/// Iterator over the ancestors of a node.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
