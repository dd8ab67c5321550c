//! Filtered, indenting serializer for parsed snapshot trees.
//!
//! One recursive walk does both reduction passes and the formatting:
//! stripped-tag subtrees are skipped before their children are ever
//! visited, attributes outside the allow-set are dropped as each open tag
//! is written, and nesting depth drives the indentation.

use std::collections::HashSet;

use markup5ever_rcdom::{Handle, NodeData};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Serializes a parsed tree to indented markup, applying the sanitization
/// rule sets as it walks. Borrows the rule sets from the owning
/// [`Sanitizer`](super::Sanitizer); one instance serves one `sanitize` call.
pub(crate) struct TreePrinter<'a> {
    allowed_attributes: &'a HashSet<String>,
    stripped_tags: &'a HashSet<String>,
    indent_size: usize,
}

impl<'a> TreePrinter<'a> {
    pub(crate) fn new(
        allowed_attributes: &'a HashSet<String>,
        stripped_tags: &'a HashSet<String>,
        indent_size: usize,
    ) -> Self {
        Self {
            allowed_attributes,
            stripped_tags,
            indent_size,
        }
    }

    /// Write one node (and its subtree) at the given nesting depth.
    ///
    /// Stripped elements, whitespace-only text runs and non-content nodes
    /// (doctypes, processing instructions) produce no output at all.
    pub(crate) fn write_node(&self, node: &Handle, depth: usize, out: &mut String) {
        match &node.data {
            NodeData::Element { name, .. } => {
                let tag: &str = &name.local;
                if self.stripped_tags.contains(tag) {
                    return;
                }
                self.write_element(node, tag, depth, out);
            }
            NodeData::Text { contents } => {
                let text = contents.borrow();
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    self.push_indent(out, depth);
                    out.push_str(&html_escape::encode_text(trimmed));
                    out.push('\n');
                }
            }
            NodeData::Comment { contents } => {
                self.push_indent(out, depth);
                out.push_str("<!--");
                out.push_str(contents);
                out.push_str("-->\n");
            }
            _ => {}
        }
    }

    fn write_element(&self, node: &Handle, tag: &str, depth: usize, out: &mut String) {
        self.push_indent(out, depth);
        out.push('<');
        out.push_str(tag);
        self.write_attributes(node, out);

        if VOID_ELEMENTS.contains(&tag) {
            out.push_str(">\n");
            return;
        }

        let children: Vec<Handle> = child_nodes(node)
            .into_iter()
            .filter(|child| self.is_printable(child))
            .collect();

        match children.as_slice() {
            [] => {
                out.push_str("></");
                out.push_str(tag);
                out.push_str(">\n");
            }
            // A lone text run stays on the element's own line.
            [only] if matches!(only.data, NodeData::Text { .. }) => {
                out.push('>');
                if let NodeData::Text { contents } = &only.data {
                    out.push_str(&html_escape::encode_text(contents.borrow().trim()));
                }
                out.push_str("</");
                out.push_str(tag);
                out.push_str(">\n");
            }
            _ => {
                out.push_str(">\n");
                for child in &children {
                    self.write_node(child, depth + 1, out);
                }
                self.push_indent(out, depth);
                out.push_str("</");
                out.push_str(tag);
                out.push_str(">\n");
            }
        }
    }

    fn write_attributes(&self, node: &Handle, out: &mut String) {
        if let NodeData::Element { attrs, .. } = &node.data {
            // Vec-backed, so iteration follows source order.
            for attr in attrs.borrow().iter() {
                let name: &str = &attr.name.local;
                if !self.allowed_attributes.contains(name) {
                    continue;
                }
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(&*attr.value));
                out.push('"');
            }
        }
    }

    /// Whether the node will produce any output.
    ///
    /// Needed before writing an open tag so that empty and single-text
    /// elements can be formatted on one line.
    fn is_printable(&self, node: &Handle) -> bool {
        match &node.data {
            NodeData::Element { name, .. } => {
                let tag: &str = &name.local;
                !self.stripped_tags.contains(tag)
            }
            NodeData::Text { contents } => !contents.borrow().trim().is_empty(),
            NodeData::Comment { .. } => true,
            _ => false,
        }
    }

    fn push_indent(&self, out: &mut String, depth: usize) {
        for _ in 0..depth * self.indent_size {
            out.push(' ');
        }
    }
}

/// Children of a node, reaching through the separate content fragment that
/// the parser builds for `<template>` elements.
fn child_nodes(node: &Handle) -> Vec<Handle> {
    if let NodeData::Element {
        template_contents, ..
    } = &node.data
    {
        if let Some(fragment) = template_contents.borrow().as_ref() {
            return fragment.children.borrow().clone();
        }
    }
    node.children.borrow().clone()
}
