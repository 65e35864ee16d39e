//! Cursor over one document.
//!
//! A [`Navigator`] is a document reference plus a node id, so copying it or
//! taking a [`Position`] never touches the tree. Edge moves return `false`
//! and leave the cursor where it was.

use std::cmp::Ordering;

use crate::arena::{NodeId, NodeType};
use crate::node::{Document, NodeRef};
use crate::num::Scalar;
use crate::query::TreeNavigator;
use crate::{Error, Result};

/// Three-way node classification consumed by the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKind {
    Root,
    Element,
    Text,
}

impl From<NodeType> for NavKind {
    fn from(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Document => NavKind::Root,
            NodeType::Element => NavKind::Element,
            NodeType::Text => NavKind::Text,
        }
    }
}

/// Saved cursor position, tied to the document it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    document: u64,
    node: NodeId,
}

impl Position {
    pub fn node(&self) -> NodeId {
        self.node
    }
}

#[derive(Clone, Copy)]
pub struct Navigator<'a> {
    doc: &'a Document,
    current: NodeId,
}

impl<'a> Navigator<'a> {
    pub fn new(start: NodeRef<'a>) -> Self {
        Self {
            doc: start.document(),
            current: start.id(),
        }
    }

    fn node(&self) -> &'a crate::arena::Node {
        &self.doc.arena()[self.current]
    }

    fn move_if(&mut self, target: Option<NodeId>) -> bool {
        match target {
            Some(id) => {
                self.current = id;
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> NodeRef<'a> {
        NodeRef::new(self.doc, self.current)
    }

    pub fn move_to_root(&mut self) {
        self.current = NodeId::ROOT;
    }

    pub fn move_to_parent(&mut self) -> bool {
        self.move_if(self.node().parent)
    }

    pub fn move_to_first_child(&mut self) -> bool {
        self.move_if(self.node().first_child)
    }

    pub fn move_to_first_sibling(&mut self) -> bool {
        let first = self
            .node()
            .parent
            .and_then(|parent| self.doc.arena()[parent].first_child);
        self.move_if(first)
    }

    pub fn move_to_next_sibling(&mut self) -> bool {
        self.move_if(self.node().next_sibling)
    }

    pub fn move_to_previous_sibling(&mut self) -> bool {
        self.move_if(self.node().prev_sibling)
    }

    pub fn snapshot(&self) -> Position {
        Position {
            document: self.doc.id(),
            node: self.current,
        }
    }

    /// Returns to a saved position; positions from another document are
    /// rejected and leave the cursor unchanged.
    pub fn restore(&mut self, position: &Position) -> Result<()> {
        if position.document != self.doc.id() || self.doc.node(position.node).is_none() {
            tracing::debug!(
                expected = self.doc.id(),
                actual = position.document,
                "rejected foreign cursor position"
            );
            return Err(Error::cursor_mismatch());
        }
        self.current = position.node;
        Ok(())
    }

    pub fn kind(&self) -> NavKind {
        self.node().node_type.into()
    }

    /// Element name; empty for array entries, text leaves and the root.
    pub fn local_name(&self) -> &'a str {
        match self.node().node_type {
            NodeType::Element => self.node().label.as_str(),
            NodeType::Document | NodeType::Text => "",
        }
    }

    pub fn text_value(&self) -> String {
        self.current().inner_text()
    }

    pub fn typed_value(&self) -> Option<&'a Scalar> {
        self.current().value()
    }

    pub fn is_same_position(&self, other: &Navigator<'_>) -> bool {
        self.doc.id() == other.doc.id() && self.current == other.current
    }

    /// Document order of two positions; cursors on different documents are
    /// ordered by document identity.
    pub fn compare_position(&self, other: &Navigator<'_>) -> Ordering {
        self.doc
            .id()
            .cmp(&other.doc.id())
            .then(self.current.cmp(&other.current))
    }
}

impl std::fmt::Debug for Navigator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("document", &self.doc.id())
            .field("node", &self.current.index())
            .finish()
    }
}

impl TreeNavigator for Navigator<'_> {
    fn kind(&self) -> NavKind {
        Navigator::kind(self)
    }

    fn local_name(&self) -> &str {
        Navigator::local_name(self)
    }

    fn text_value(&self) -> String {
        Navigator::text_value(self)
    }

    fn typed_value(&self) -> Option<&Scalar> {
        Navigator::typed_value(self)
    }

    fn move_to_root(&mut self) {
        Navigator::move_to_root(self)
    }

    fn move_to_parent(&mut self) -> bool {
        Navigator::move_to_parent(self)
    }

    fn move_to_first_child(&mut self) -> bool {
        Navigator::move_to_first_child(self)
    }

    fn move_to_first_sibling(&mut self) -> bool {
        Navigator::move_to_first_sibling(self)
    }

    fn move_to_next_sibling(&mut self) -> bool {
        Navigator::move_to_next_sibling(self)
    }

    fn move_to_previous_sibling(&mut self) -> bool {
        Navigator::move_to_previous_sibling(self)
    }

    fn is_same_position(&self, other: &Self) -> bool {
        Navigator::is_same_position(self, other)
    }

    fn compare_position(&self, other: &Self) -> Ordering {
        Navigator::compare_position(self, other)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{build, from_str, ErrorKind};

    const CARS: &str = r#"{
        "name": "John",
        "age": 30,
        "cars": [
            { "name": "Ford", "models": [ "Fiesta", "Focus", "Mustang" ] },
            { "name": "BMW", "models": [ "320", "X3", "X5" ] },
            { "name": "Fiat", "models": [ "500", "Panda" ] }
        ]
    }"#;

    #[rstest]
    fn test_walks_cars_document() {
        let doc = from_str(CARS).unwrap();
        let mut nav = doc.navigator();
        nav.move_to_root();
        assert_eq!(nav.kind(), NavKind::Root);

        assert!(nav.move_to_first_child());
        assert_eq!(nav.current().label(), "age");
        assert_eq!(nav.typed_value(), Some(&Scalar::from(30u64)));

        assert!(nav.move_to_next_sibling());
        assert_eq!(nav.current().label(), "cars");

        let mut models = Vec::new();
        let cars = nav.snapshot();
        let mut more = nav.move_to_first_child();
        while more {
            let entry = nav.snapshot();
            let mut field = nav.move_to_first_child();
            while field {
                if nav.local_name() == "models" {
                    let list = nav.snapshot();
                    let mut model = nav.move_to_first_child();
                    while model {
                        models.push(nav.text_value());
                        model = nav.move_to_next_sibling();
                    }
                    nav.restore(&list).unwrap();
                }
                field = nav.move_to_next_sibling();
            }
            nav.restore(&entry).unwrap();
            more = nav.move_to_next_sibling();
        }
        assert_eq!(models.len(), 8);
        assert_eq!(models[0], "Fiesta");

        nav.restore(&cars).unwrap();
        assert!(nav.move_to_next_sibling());
        assert_eq!(nav.current().label(), "name");
        assert!(!nav.move_to_next_sibling());

        assert!(nav.move_to_previous_sibling());
        assert_eq!(nav.current().label(), "cars");

        assert!(nav.move_to_first_sibling());
        assert_eq!(nav.current().label(), "age");
        assert!(!nav.move_to_previous_sibling());

        assert!(nav.move_to_parent());
        assert_eq!(nav.current().node_type(), NodeType::Document);
        assert!(!nav.move_to_parent());
    }

    #[rstest]
    fn test_restore_returns_to_identical_node() {
        let doc = from_str(CARS).unwrap();
        let mut nav = doc.navigator();
        nav.move_to_first_child();
        nav.move_to_next_sibling();
        nav.move_to_first_child();
        let saved = nav.snapshot();
        let before = nav.current();
        assert_eq!(saved.node(), before.id());

        nav.move_to_root();
        nav.move_to_first_child();
        nav.restore(&saved).unwrap();

        assert_eq!(nav.current(), before);
        assert_eq!(nav.current().id(), before.id());
    }

    #[rstest]
    fn test_restore_rejects_other_document() {
        let a = from_str(CARS).unwrap();
        let b = from_str(CARS).unwrap();
        let mut nav_a = a.navigator();
        let mut nav_b = b.navigator();
        nav_b.move_to_first_child();

        let foreign = nav_b.snapshot();
        let err = nav_a.restore(&foreign).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CursorMismatch);
        assert_eq!(nav_a.kind(), NavKind::Root);
    }

    #[rstest]
    fn test_first_child_of_leaf_fails() {
        let doc = build(&serde_json::json!({"a": "x"})).unwrap();
        let mut nav = doc.navigator();
        assert!(nav.move_to_first_child());
        assert!(nav.move_to_first_child());
        assert_eq!(nav.kind(), NavKind::Text);
        assert_eq!(nav.local_name(), "");
        assert!(!nav.move_to_first_child());
        assert!(nav.move_to_first_sibling());
        assert_eq!(nav.kind(), NavKind::Text);

        nav.move_to_root();
        assert!(!nav.move_to_first_sibling());
        assert_eq!(nav.kind(), NavKind::Root);
    }

    #[rstest]
    fn test_identity_and_document_order() {
        let doc = from_str(CARS).unwrap();
        let mut first = doc.navigator();
        first.move_to_first_child();
        let mut second = first;
        second.move_to_next_sibling();

        assert!(first.is_same_position(&first));
        assert!(!first.is_same_position(&second));
        assert_eq!(first.compare_position(&second), Ordering::Less);

        // A deep node of `cars` still precedes the later sibling `name`.
        let mut deep = second;
        deep.move_to_first_child();
        deep.move_to_first_child();
        let mut name = second;
        name.move_to_next_sibling();
        assert_eq!(deep.compare_position(&name), Ordering::Less);
    }

    #[rstest]
    fn test_root_of_scalar_document() {
        let doc = from_str("\"hello\"").unwrap();
        let nav = doc.navigator();
        assert_eq!(nav.text_value(), "hello");
        assert_eq!(nav.typed_value(), Some(&Scalar::from("hello")));
    }
}
