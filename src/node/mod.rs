//! The node tree and its read/write operations.
//!
//! A [`Document`] owns every node in an arena; [`NodeRef`] is a cheap
//! borrowed view used for reading. The only mutations after construction are
//! [`Document::set_value`] and the projection flag, both of which need
//! `&mut Document`, so no reader can observe them half way.
//!
//! # Value access is deliberately asymmetric
//!
//! [`NodeRef::value`] follows first children down to the left-most text leaf
//! and returns only that leaf's value. [`Document::set_value`] on a non-leaf
//! overwrites the value of *every* text leaf below it. A set followed by a
//! get on a container therefore returns the new value, but a get on a
//! container never reflects its other leaves.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::arena::{Arena, Children, Node, NodeId, NodeType, Shape};
use crate::nav::Navigator;
use crate::num::Scalar;
use crate::{Error, MarkupOptions, Result};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

pub struct Document {
    id: u64,
    arena: Arena,
}

impl Document {
    pub(crate) fn from_arena(arena: Arena) -> Self {
        Self {
            id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            arena,
        }
    }

    /// Process-unique identity of this tree.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of nodes, the document node included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() <= 1
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            doc: self,
            id: NodeId::ROOT,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.arena.get(id).map(|_| NodeRef { doc: self, id })
    }

    pub fn navigator(&self) -> Navigator<'_> {
        Navigator::new(self.root())
    }

    pub(crate) fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Overwrites the value of `id` if it is a text leaf, otherwise the value
    /// of every text leaf in its subtree. Labels are left untouched.
    ///
    /// `id` must come from this document. Ids are plain indices, so an id
    /// taken from another document is not detected unless it is out of range,
    /// in which case nothing changes and `false` is returned.
    pub fn set_value(&mut self, id: NodeId, value: impl Into<Scalar>) -> bool {
        let Some(node) = self.arena.get(id) else {
            return false;
        };
        let value = value.into();
        if node.node_type == NodeType::Text {
            self.arena[id].value = Some(value);
            return true;
        }

        let mut stack: Vec<NodeId> = self.arena.children(id).collect();
        while let Some(current) = stack.pop() {
            if self.arena[current].node_type == NodeType::Text {
                self.arena[current].value = Some(value.clone());
            } else {
                stack.extend(self.arena.children(current));
            }
        }
        true
    }

    /// Flags `id` (and only `id`) for exclusion from filtered JSON output.
    ///
    /// As with [`Document::set_value`], `id` must come from this document;
    /// out-of-range ids return `false`.
    pub fn mark_projected_out(&mut self, id: NodeId) -> bool {
        self.set_projected_out(id, true)
    }

    pub fn clear_projection(&mut self, id: NodeId) -> bool {
        self.set_projected_out(id, false)
    }

    fn set_projected_out(&mut self, id: NodeId, flag: bool) -> bool {
        match self.arena.get_mut(id) {
            Some(node) => {
                node.projected_out = flag;
                true
            }
            None => false,
        }
    }

    pub fn to_json(&self, filter_projected: bool) -> Result<Value> {
        self.root().to_json(filter_projected)
    }

    pub fn to_markup_text(&self) -> String {
        self.root().to_markup_text()
    }

    pub fn to_markup_text_with_options(&self, options: &MarkupOptions) -> String {
        crate::encode::markup::to_markup_text(self.root(), options)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("nodes", &self.arena.len())
            .finish()
    }
}

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    fn node(&self) -> &'a Node {
        &self.doc.arena[self.id]
    }

    fn link(&self, id: Option<NodeId>) -> Option<NodeRef<'a>> {
        id.map(|id| NodeRef { doc: self.doc, id })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn node_type(&self) -> NodeType {
        self.node().node_type
    }

    /// Key for object entries, empty for array entries, text for leaves.
    pub fn label(&self) -> &'a str {
        self.node().label.as_str()
    }

    pub fn depth(&self) -> usize {
        self.node().depth
    }

    pub fn shape(&self) -> Option<Shape> {
        self.node().shape
    }

    pub fn is_projected_out(&self) -> bool {
        self.node().projected_out
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().parent)
    }

    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().first_child)
    }

    pub fn last_child(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().last_child)
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().next_sibling)
    }

    pub fn prev_sibling(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().prev_sibling)
    }

    pub fn child_nodes(&self) -> ChildNodes<'a> {
        ChildNodes {
            doc: self.doc,
            inner: self.doc.arena.children(self.id),
        }
    }

    /// Labels of every text leaf below this node, in document order.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        self.push_inner_text(&mut out);
        out
    }

    fn push_inner_text(&self, out: &mut String) {
        if self.node_type() == NodeType::Text {
            out.push_str(self.label());
            return;
        }
        for child in self.child_nodes() {
            child.push_inner_text(out);
        }
    }

    pub fn select_element(&self, name: &str) -> Option<NodeRef<'a>> {
        self.child_nodes().find(|child| child.label() == name)
    }

    /// Nearest proper ancestor recorded at `depth`.
    pub fn ancestor_at_depth(&self, depth: usize) -> Result<NodeRef<'a>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.depth() == depth {
                return Ok(node);
            }
            current = node.parent();
        }
        Err(Error::depth_not_found(depth))
    }

    /// Value of the left-most text leaf, reached through first children only.
    pub fn value(&self) -> Option<&'a Scalar> {
        let mut current = *self;
        loop {
            if current.node_type() == NodeType::Text {
                return current.node().value.as_ref();
            }
            current = current.first_child()?;
        }
    }

    pub fn navigator(&self) -> Navigator<'a> {
        Navigator::new(*self)
    }

    pub fn to_json(&self, filter_projected: bool) -> Result<Value> {
        crate::encode::to_json(*self, filter_projected)
    }

    /// Markup for the whole tree when called on the document node, or for
    /// this node alone otherwise.
    pub fn to_markup_text(&self) -> String {
        crate::encode::markup::to_markup_text(*self, &MarkupOptions::default())
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.doc.id == other.doc.id && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id.index())
            .field("type", &self.node_type())
            .field("label", &self.label())
            .finish()
    }
}

/// Direct children of a node, first to last.
#[derive(Clone)]
pub struct ChildNodes<'a> {
    doc: &'a Document,
    inner: Children<'a>,
}

impl<'a> Iterator for ChildNodes<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<NodeRef<'a>> {
        self.inner.next().map(|id| NodeRef { doc: self.doc, id })
    }
}
