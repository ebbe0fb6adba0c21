//! Filter definitions as authored by the caller.
//!
//! A [`FilterTree`] owns its nodes in an arena and links them by [`NodeId`],
//! so a node can be linked under several parents (or, by mistake, under its
//! own subtree). The compiler rejects the latter.

use std::fmt;

use super::matcher::{AttrMatcher, TextMatcher};

/// Identity of a node inside one [`FilterTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Matches a start tag by name, then by its attributes.
#[derive(Debug, Clone)]
pub struct ElementFilter {
    pub tag: String,
    pub matcher: AttrMatcher,
    /// `(attribute name, output name)` pairs captured on match.
    pub outputs: Vec<(String, String)>,
}

impl ElementFilter {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            matcher: AttrMatcher::Any,
            outputs: Vec::new(),
        }
    }

    #[must_use]
    pub fn matcher(mut self, matcher: AttrMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Capture attribute `attr` under `name` every time this filter matches.
    #[must_use]
    pub fn output(mut self, attr: impl Into<String>, name: impl Into<String>) -> Self {
        self.outputs.push((attr.into(), name.into()));
        self
    }
}

/// Matches a text chunk.
#[derive(Debug, Clone, Default)]
pub struct TextFilter {
    pub matcher: TextMatcher,
    pub output: Option<String>,
}

impl TextFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn matcher(mut self, matcher: TextMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Capture the whole text chunk under `name`.
    #[must_use]
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.output = Some(name.into());
        self
    }
}

#[derive(Debug, Clone)]
pub enum FilterNode {
    Element(ElementFilter),
    Text(TextFilter),
}

impl FilterNode {
    pub fn tag(&self) -> Option<&str> {
        match self {
            FilterNode::Element(element) => Some(&element.tag),
            FilterNode::Text(_) => None,
        }
    }

    /// Output names this node may write to.
    pub fn output_names(&self) -> Vec<&str> {
        match self {
            FilterNode::Element(element) => {
                element.outputs.iter().map(|(_, name)| name.as_str()).collect()
            }
            FilterNode::Text(text) => text.output.iter().map(String::as_str).collect(),
        }
    }
}

impl From<ElementFilter> for FilterNode {
    fn from(element: ElementFilter) -> Self {
        FilterNode::Element(element)
    }
}

impl From<TextFilter> for FilterNode {
    fn from(text: TextFilter) -> Self {
        FilterNode::Text(text)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    node: FilterNode,
    children: Vec<NodeId>,
}

/// Arena of filter nodes plus the ordered list of roots.
///
/// Ids are only meaningful for the tree that minted them; the accessors
/// panic when given an id from another tree.
#[derive(Debug, Clone, Default)]
pub struct FilterTree {
    slots: Vec<Slot>,
    roots: Vec<NodeId>,
}

impl FilterTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node that is not linked anywhere yet.
    pub fn insert(&mut self, node: impl Into<FilterNode>) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            node: node.into(),
            children: Vec::new(),
        });
        id
    }

    pub fn add_root(&mut self, node: impl Into<FilterNode>) -> NodeId {
        let id = self.insert(node);
        self.roots.push(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, node: impl Into<FilterNode>) -> NodeId {
        let id = self.insert(node);
        self.link(parent, id);
        id
    }

    /// Append an existing node to `parent`'s children.
    pub fn link(&mut self, parent: NodeId, child: NodeId) {
        self.slots[parent.0].children.push(child);
    }

    /// Append an existing node to the roots.
    pub fn push_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &FilterNode {
        &self.slots[id.0].node
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
