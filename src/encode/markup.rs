//! Markup rendering of a node tree.
//!
//! Output is fixed as the declaration `<?xml version="1.0" encoding="utf-8"?>`
//! followed by a synthetic `<root>` element. Each element becomes a tag named
//! by its label (`element` for array entries) with no attributes and no
//! whitespace between tags. Text content has `&`, `<` and `>` escaped; tag
//! names are written verbatim.

use crate::arena::NodeType;
use crate::constants::{ANONYMOUS_TAG, MARKUP_DECLARATION, MARKUP_ROOT_TAG};
use crate::node::NodeRef;
use crate::text::{escape_text_into, needs_escape};
use crate::MarkupOptions;

pub fn to_markup_text(node: NodeRef<'_>, options: &MarkupOptions) -> String {
    let mut writer = Writer::new();
    if options.declaration {
        writer.write_str(MARKUP_DECLARATION);
    }
    writer.open_tag(MARKUP_ROOT_TAG);
    match node.node_type() {
        NodeType::Document => {
            for child in node.child_nodes() {
                writer.write_node(child);
            }
        }
        NodeType::Element | NodeType::Text => writer.write_node(node),
    }
    writer.close_tag(MARKUP_ROOT_TAG);
    writer.finish()
}

pub(crate) struct Writer {
    buffer: String,
}

impl Writer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    pub fn write_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    pub fn write_text(&mut self, s: &str) {
        if needs_escape(s) {
            escape_text_into(&mut self.buffer, s);
        } else {
            self.buffer.push_str(s);
        }
    }

    pub fn open_tag(&mut self, name: &str) {
        self.buffer.push('<');
        self.buffer.push_str(name);
        self.buffer.push('>');
    }

    pub fn close_tag(&mut self, name: &str) {
        self.buffer.push_str("</");
        self.buffer.push_str(name);
        self.buffer.push('>');
    }

    fn write_node(&mut self, node: NodeRef<'_>) {
        match node.node_type() {
            NodeType::Text => self.write_text(node.label()),
            NodeType::Element | NodeType::Document => {
                let tag = tag_name(node);
                self.open_tag(tag);
                for child in node.child_nodes() {
                    self.write_node(child);
                }
                self.close_tag(tag);
            }
        }
    }
}

fn tag_name<'a>(node: NodeRef<'a>) -> &'a str {
    match node.label() {
        "" => ANONYMOUS_TAG,
        label => label,
    }
}
