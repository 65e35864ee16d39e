pub mod markup;

use serde_json::{Map, Value};

use crate::arena::{NodeType, Shape};
use crate::node::NodeRef;
use crate::{Error, Result};

/// Rebuilds the JSON value a subtree was built from.
///
/// With `filter_projected`, children flagged as projected out are left out of
/// their parent array or object. The node passed in is never filtered itself.
pub fn to_json(node: NodeRef<'_>, filter_projected: bool) -> Result<Value> {
    let shape = node.shape().ok_or_else(Error::unsupported_content_type)?;
    match shape {
        Shape::Array => {
            let mut items = Vec::new();
            for child in included_children(node, filter_projected) {
                items.push(to_json(child, filter_projected)?);
            }
            Ok(Value::Array(items))
        }
        Shape::Object => {
            let mut map = Map::new();
            for child in included_children(node, filter_projected) {
                map.insert(child.label().to_string(), to_json(child, filter_projected)?);
            }
            Ok(Value::Object(map))
        }
        Shape::String | Shape::Number | Shape::Bool | Shape::Null => {
            let leaf = if node.node_type() == NodeType::Text {
                Some(node)
            } else {
                node.first_child()
            };
            leaf.and_then(|leaf| leaf.value())
                .map(|scalar| scalar.to_json())
                .ok_or_else(Error::unsupported_content_type)
        }
    }
}

fn included_children<'a>(
    node: NodeRef<'a>,
    filter_projected: bool,
) -> impl Iterator<Item = NodeRef<'a>> {
    node.child_nodes()
        .filter(move |child| !(filter_projected && child.is_projected_out()))
}
