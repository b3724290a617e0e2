//! # Document values
//!
//! The root of a document: top-level children, the selection, annotations
//! keyed by identity and root data. Each applied operation produces a new
//! `Value`; nothing mutates a published snapshot in place.

use crate::node::collect_string;
use crate::{Data, Element, Node, NodeObject, Point, Range, Text};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Value {
    #[serde(default)]
    pub children: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Range>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, Annotation>,

    #[serde(default, skip_serializing_if = "Data::is_empty")]
    pub data: Data,
}

impl Value {
    pub fn new(children: impl IntoIterator<Item = Node>) -> Self {
        Self {
            children: children.into_iter().collect(),
            ..Value::default()
        }
    }

    pub fn with_selection(mut self, selection: Range) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, annotation: Annotation) -> Self {
        self.annotations.insert(key.into(), annotation);
        self
    }

    pub fn has_block_children(&self) -> bool {
        self.children.iter().any(Node::is_block)
    }

    pub fn string(&self) -> String {
        let mut out = String::new();
        collect_string(&self.children, &mut out);
        out
    }

    /// Number of nodes below the root
    pub fn node_count(&self) -> usize {
        self.children.iter().map(Node::count).sum()
    }
}

/// Metadata over a span of text that lives outside the tree and is kept in
/// place by transforming its points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub kind: String,

    pub anchor: Point,

    pub focus: Point,

    #[serde(default, skip_serializing_if = "Data::is_empty")]
    pub data: Data,
}

impl Annotation {
    pub fn new(kind: impl Into<String>, range: Range) -> Self {
        Self {
            kind: kind.into(),
            anchor: range.anchor,
            focus: range.focus,
            data: Data::new(),
        }
    }

    pub fn range(&self) -> Range {
        Range::new(self.anchor.clone(), self.focus.clone())
    }
}

/// Borrowed view of any node, the root included
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Value(&'a Value),
    Element(&'a Element),
    Text(&'a Text),
}

impl<'a> NodeRef<'a> {
    pub fn children(&self) -> &'a [Node] {
        match self {
            NodeRef::Value(value) => &value.children,
            NodeRef::Element(element) => &element.children,
            NodeRef::Text(_) => &[],
        }
    }

    pub fn as_element(&self) -> Option<&'a Element> {
        match self {
            NodeRef::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&'a Text> {
        match self {
            NodeRef::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn object(&self) -> NodeObject {
        match self {
            NodeRef::Value(_) => NodeObject::Document,
            NodeRef::Element(element) => element.object(),
            NodeRef::Text(_) => NodeObject::Text,
        }
    }

    pub fn kind(&self) -> Option<&'a str> {
        self.as_element().map(|element| element.kind.as_str())
    }

    /// The root and non-inline elements can hold blocks
    pub fn has_block_children(&self) -> bool {
        match self {
            NodeRef::Value(value) => value.has_block_children(),
            NodeRef::Element(element) => element.has_block_children(),
            NodeRef::Text(_) => false,
        }
    }

    pub fn string(&self) -> String {
        match self {
            NodeRef::Value(value) => value.string(),
            NodeRef::Element(element) => element.string(),
            NodeRef::Text(text) => text.text.clone(),
        }
    }
}

impl<'a> From<&'a Node> for NodeRef<'a> {
    fn from(node: &'a Node) -> Self {
        match node {
            Node::Element(element) => NodeRef::Element(element),
            Node::Text(text) => NodeRef::Text(text),
        }
    }
}
