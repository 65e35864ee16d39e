//! Document Builder: turns a decoded JSON value into a node tree.
//!
//! Array entries become anonymous elements in index order; object entries
//! become elements named by their key, sorted by byte order of the key so the
//! tree does not depend on how the decoder ordered the map. Every scalar
//! hangs off its parent as exactly one text leaf.

use std::io::Read;

use serde::Serialize;
use serde_json::Value;
use smol_str::SmolStr;

use crate::arena::{Arena, Node, NodeId, NodeType, Shape};
use crate::node::Document;
use crate::num::Scalar;
use crate::{BuildOptions, Error, Result};

pub fn build(value: &Value) -> Result<Document> {
    build_with_options(value, &BuildOptions::default())
}

pub fn build_with_options(value: &Value, options: &BuildOptions) -> Result<Document> {
    let mut builder = Builder::new(options);
    let root = builder.arena.alloc(Node::document());
    builder.attach_value(value, root, 1)?;

    let deepest = builder.deepest;
    let doc = Document::from_arena(builder.arena);
    tracing::debug!(
        document = doc.id(),
        nodes = doc.len(),
        depth = deepest,
        "built document tree"
    );
    Ok(doc)
}

/// Builds from any serializable value by converting it to a JSON graph first.
///
/// Values the JSON model cannot express, such as maps keyed by non-strings,
/// fail with an `UnsupportedType` error.
pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Document> {
    let value = serde_json::to_value(value).map_err(|err| Error::unsupported_type(err.to_string()))?;
    build(&value)
}

pub fn from_str(input: &str) -> Result<Document> {
    let value: Value = serde_json::from_str(input)?;
    build(&value)
}

pub fn from_slice(input: &[u8]) -> Result<Document> {
    let value: Value = serde_json::from_slice(input)?;
    build(&value)
}

pub fn from_reader<R: Read>(reader: R) -> Result<Document> {
    let value: Value = serde_json::from_reader(reader)?;
    build(&value)
}

struct Builder {
    arena: Arena,
    max_depth: usize,
    deepest: usize,
}

impl Builder {
    fn new(options: &BuildOptions) -> Self {
        Self {
            arena: Arena::new(),
            max_depth: options.max_depth,
            deepest: 0,
        }
    }

    /// Attaches the nodes for `value` below `parent`; new nodes sit at `depth`.
    fn attach_value(&mut self, value: &Value, parent: NodeId, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::depth_limit_exceeded(self.max_depth));
        }
        self.deepest = self.deepest.max(depth);

        match value {
            Value::Array(items) => {
                self.set_shape(parent, Shape::Array);
                for item in items {
                    let child = self.append_element(parent, SmolStr::default(), depth);
                    self.attach_value(item, child, depth + 1)?;
                }
            }
            Value::Object(map) => {
                self.set_shape(parent, Shape::Object);
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
                for (key, item) in entries {
                    let child = self.append_element(parent, SmolStr::from(key.as_str()), depth);
                    self.attach_value(item, child, depth + 1)?;
                }
            }
            leaf => {
                let scalar = Scalar::from_json(leaf)
                    .ok_or_else(|| Error::unsupported_type(value_type_name(leaf)))?;
                self.set_shape(parent, scalar.shape());
                let text = self.arena.alloc(Node::text(scalar, depth));
                self.arena.append_child(parent, text);
            }
        }
        Ok(())
    }

    fn append_element(&mut self, parent: NodeId, label: SmolStr, depth: usize) -> NodeId {
        let child = self
            .arena
            .alloc(Node::new(NodeType::Element, label, depth));
        self.arena.append_child(parent, child);
        child
    }

    fn set_shape(&mut self, id: NodeId, shape: Shape) {
        if let Some(node) = self.arena.get_mut(id) {
            node.shape = Some(shape);
        }
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
