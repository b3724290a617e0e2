//! # Document nodes
//!
//! Children of the document are either elements or text leaves. Elements
//! carry a type tag, an open data map and their children; texts carry a
//! string and a set of marks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Open attribute map attached to elements, marks and annotations
pub type Data = BTreeMap<String, serde_json::Value>;

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Coarse node classification used by schema matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeObject {
    Document,
    Block,
    Inline,
    Text,
}

/// Formatting attached to a run of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Data::is_empty")]
    pub data: Data,
}

impl Mark {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: Data::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,

    /// Kept sorted by mark type, without duplicates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn with_marks(mut self, marks: impl IntoIterator<Item = Mark>) -> Self {
        for mark in marks {
            self.add_mark(mark);
        }
        self
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn byte_offset(&self, offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(offset)
            .map(|(index, _)| index)
            .unwrap_or(self.text.len())
    }

    /// Characters in `start..end`, clamped to the text
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.text
            .chars()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }

    pub(crate) fn insert_str(&mut self, offset: usize, text: &str) {
        let at = self.byte_offset(offset);
        self.text.insert_str(at, text);
    }

    pub(crate) fn remove_chars(&mut self, offset: usize, count: usize) {
        let start = self.byte_offset(offset);
        let end = self.byte_offset(offset + count);
        self.text.replace_range(start..end, "");
    }

    pub(crate) fn split_off(&mut self, offset: usize) -> String {
        let at = self.byte_offset(offset);
        self.text.split_off(at)
    }

    pub fn has_mark(&self, mark: &Mark) -> bool {
        self.marks.contains(mark)
    }

    /// Add a mark, keeping the set sorted. Returns false if already present.
    pub fn add_mark(&mut self, mark: Mark) -> bool {
        if self.has_mark(&mark) {
            return false;
        }
        let at = self.marks.partition_point(|m| m.kind <= mark.kind);
        self.marks.insert(at, mark);
        true
    }

    pub fn remove_mark(&mut self, mark: &Mark) -> bool {
        let before = self.marks.len();
        self.marks.retain(|m| m != mark);
        before != self.marks.len()
    }

    pub fn same_marks(&self, other: &Text) -> bool {
        self.marks.len() == other.marks.len() && self.marks.iter().all(|m| other.has_mark(m))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Data::is_empty")]
    pub data: Data,

    #[serde(default)]
    pub children: Vec<Node>,

    /// Void elements are atomic for editing and hold a single empty text
    #[serde(default, rename = "void", skip_serializing_if = "is_false")]
    pub is_void: bool,

    #[serde(default, rename = "inline", skip_serializing_if = "is_false")]
    pub is_inline: bool,
}

impl Element {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: Data::new(),
            children: Vec::new(),
            is_void: false,
            is_inline: false,
        }
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn void(mut self) -> Self {
        self.is_void = true;
        if self.children.is_empty() {
            self.children.push(Node::text(""));
        }
        self
    }

    pub fn inline(mut self) -> Self {
        self.is_inline = true;
        self
    }

    pub fn is_block(&self) -> bool {
        !self.is_inline
    }

    /// True if any child is a block element
    pub fn has_block_children(&self) -> bool {
        self.children.iter().any(Node::is_block)
    }

    pub fn object(&self) -> NodeObject {
        if self.is_inline {
            NodeObject::Inline
        } else {
            NodeObject::Block
        }
    }

    /// Concatenated text of all descendants
    pub fn string(&self) -> String {
        let mut out = String::new();
        collect_string(&self.children, &mut out);
        out
    }

    /// No text content and no void descendants
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(|child| match child {
            Node::Text(text) => text.is_empty(),
            Node::Element(element) => !element.is_void && element.is_empty(),
        })
    }
}

pub(crate) fn collect_string(children: &[Node], out: &mut String) {
    for child in children {
        match child {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(element) => collect_string(&element.children, out),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    pub fn element(kind: impl Into<String>, children: impl IntoIterator<Item = Node>) -> Self {
        Node::Element(Element::new(kind).with_children(children))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Node::Element(element) if !element.is_inline)
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Node::Element(element) if element.is_inline)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Node::Element(element) if element.is_void)
    }

    pub fn object(&self) -> NodeObject {
        match self {
            Node::Element(element) => element.object(),
            Node::Text(_) => NodeObject::Text,
        }
    }

    pub fn kind(&self) -> Option<&str> {
        self.as_element().map(|element| element.kind.as_str())
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Text(_) => &[],
        }
    }

    pub fn string(&self) -> String {
        match self {
            Node::Element(element) => element.string(),
            Node::Text(text) => text.text.clone(),
        }
    }

    /// Length used by `merge_node` and `split_node` positions: characters
    /// for texts, children for elements.
    pub fn merge_length(&self) -> usize {
        match self {
            Node::Element(element) => element.children.len(),
            Node::Text(text) => text.len(),
        }
    }

    /// Number of nodes in this subtree, including itself
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Node::count).sum::<usize>()
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

/// The non-content fields of a node, each optional.
///
/// Operations use this both as a patch (`Some` fields get written) and as a
/// precondition (`Some` fields must match the current node).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,

    #[serde(rename = "void", default, skip_serializing_if = "Option::is_none")]
    pub is_void: Option<bool>,

    #[serde(rename = "inline", default, skip_serializing_if = "Option::is_none")]
    pub is_inline: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Mark>>,
}

impl Properties {
    /// Snapshot every property of `node`
    pub fn of(node: &Node) -> Self {
        match node {
            Node::Element(element) => Properties {
                kind: Some(element.kind.clone()),
                data: Some(element.data.clone()),
                is_void: Some(element.is_void),
                is_inline: Some(element.is_inline),
                marks: None,
            },
            Node::Text(text) => Properties {
                marks: Some(text.marks.clone()),
                ..Properties::default()
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.data.is_none()
            && self.is_void.is_none()
            && self.is_inline.is_none()
            && self.marks.is_none()
    }

    /// Whether every set field equals the node's current value
    pub fn matches(&self, node: &Node) -> bool {
        match node {
            Node::Element(element) => {
                self.marks.is_none()
                    && self.kind.as_ref().map_or(true, |kind| *kind == element.kind)
                    && self.data.as_ref().map_or(true, |data| *data == element.data)
                    && self.is_void.map_or(true, |flag| flag == element.is_void)
                    && self.is_inline.map_or(true, |flag| flag == element.is_inline)
            }
            Node::Text(text) => {
                self.kind.is_none()
                    && self.data.is_none()
                    && self.is_void.is_none()
                    && self.is_inline.is_none()
                    && self.marks.as_ref().map_or(true, |marks| {
                        marks.len() == text.marks.len() && marks.iter().all(|m| text.has_mark(m))
                    })
            }
        }
    }

    /// Write every set field onto the node. Fields that do not apply to the
    /// node's variant are ignored.
    pub fn apply_to(&self, node: &mut Node) {
        match node {
            Node::Element(element) => {
                if let Some(kind) = &self.kind {
                    element.kind = kind.clone();
                }
                if let Some(data) = &self.data {
                    element.data = data.clone();
                }
                if let Some(flag) = self.is_void {
                    element.is_void = flag;
                }
                if let Some(flag) = self.is_inline {
                    element.is_inline = flag;
                }
            }
            Node::Text(text) => {
                if let Some(marks) = &self.marks {
                    text.marks.clear();
                    for mark in marks {
                        text.add_mark(mark.clone());
                    }
                }
            }
        }
    }
}
