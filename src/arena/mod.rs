use smol_str::SmolStr;

use crate::num::Scalar;

/// Index of a node inside its document's arena.
///
/// Nodes are allocated in pre-order, so comparing two ids of the same
/// document compares their document order.
///
/// An id carries no document identity. It is only meaningful on the document
/// that produced it; on any other document it names whatever node happens to
/// sit at the same index, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
}

/// What a subtree reconstructs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Array,
    Object,
    String,
    Number,
    Bool,
    Null,
}

impl Shape {
    pub fn is_container(self) -> bool {
        matches!(self, Shape::Array | Shape::Object)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub node_type: NodeType,
    pub label: SmolStr,
    pub depth: usize,
    pub shape: Option<Shape>,
    pub value: Option<Scalar>,
    pub projected_out: bool,
    pub parent: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
}

impl Node {
    pub fn new(node_type: NodeType, label: SmolStr, depth: usize) -> Self {
        Self {
            node_type,
            label,
            depth,
            shape: None,
            value: None,
            projected_out: false,
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
        }
    }

    pub fn document() -> Self {
        Self::new(NodeType::Document, SmolStr::default(), 0)
    }

    pub fn text(value: Scalar, depth: usize) -> Self {
        let mut node = Self::new(NodeType::Text, value.to_label(), depth);
        node.shape = Some(value.shape());
        node.value = Some(value);
        node
    }
}

/// Owns every node of one tree; links between nodes are plain ids.
#[derive(Debug, Default, Clone)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Links `child` as the new last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev = self.nodes[parent.0].last_child;
        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = None;
        }
        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            arena: self,
            next: self.get(id).and_then(|node| node.first_child),
        }
    }
}

impl std::ops::Index<NodeId> for Arena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl std::ops::IndexMut<NodeId> for Arena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

/// Forward iterator over the direct children of a node.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    arena: &'a Arena,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.arena[current].next_sibling;
        Some(current)
    }
}
