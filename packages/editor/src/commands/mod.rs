//! # Commands
//!
//! High-level edits built from operations. Every command runs in a
//! transaction, takes an optional [`Location`] that defaults to the
//! selection, and moves the selection only when it acted on it.

mod annotations;
mod marks;
mod nodes;
mod selection;
mod text;

use weft_model::{Data, Location, Node, Path, Point, Range, Unit, Value};

use crate::{EditorError, EditorResult};

/// Options for [`Editor::delete`](crate::Editor::delete)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOptions {
    pub distance: usize,
    pub unit: Unit,
    pub reverse: bool,
}

impl DeleteOptions {
    pub fn backward(unit: Unit) -> Self {
        Self {
            unit,
            reverse: true,
            ..Self::default()
        }
    }

    pub fn forward(unit: Unit) -> Self {
        Self {
            unit,
            ..Self::default()
        }
    }
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            distance: 1,
            unit: Unit::Character,
            reverse: false,
        }
    }
}

/// Which nodes a structural command acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// Blocks without block children
    #[default]
    LeafBlocks,
    /// Blocks at this depth (1 = children of the root)
    Depth(usize),
    Texts,
    Inlines,
}

impl Target {
    fn matches(&self, path: &Path, node: &Node) -> bool {
        match self {
            Target::LeafBlocks => node
                .as_element()
                .is_some_and(|element| element.is_block() && !element.has_block_children()),
            Target::Depth(depth) => node.is_block() && path.len() == *depth,
            Target::Texts => node.is_text(),
            Target::Inlines => node.is_inline(),
        }
    }
}

/// How far up [`Editor::split_nodes`](crate::Editor::split_nodes) splits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitHeight {
    /// The text plus this many ancestors
    Exact(usize),
    /// Up to and including the closest block
    Block,
}

impl Default for SplitHeight {
    fn default() -> Self {
        SplitHeight::Exact(0)
    }
}

/// Changes to element properties. `Null` data values remove the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub kind: Option<String>,
    pub data: Option<Data>,
    pub is_void: Option<bool>,
    pub is_inline: Option<bool>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data
            .get_or_insert_with(Data::new)
            .insert(key.into(), value);
        self
    }

    pub fn void(mut self, is_void: bool) -> Self {
        self.is_void = Some(is_void);
        self
    }

    pub fn inline(mut self, is_inline: bool) -> Self {
        self.is_inline = Some(is_inline);
        self
    }
}

/// Turn a range ending at the very start of a later block into one that
/// ends at the close of the previous text
pub(crate) fn unhang(value: &Value, range: Range) -> Range {
    let (start, end) = range.edges();
    if range.is_collapsed() || end.offset != 0 || start.path == end.path {
        return range;
    }
    let Some((block, _)) = value.closest_block(&end.path) else {
        return range;
    };
    if value.start(&block).ok().as_ref() != Some(&end) || block.is_ancestor_of(&start.path) {
        return range;
    }
    match value.previous_text(&end.path) {
        Some((path, text)) if path >= start.path => {
            Range::new(start, Point::new(path, text.len()))
        }
        _ => range,
    }
}

/// Paths of nodes at `at` matching `target`, in document order, without
/// descendants of another match
pub(crate) fn matching_paths(value: &Value, at: &Location, target: Target) -> Vec<Path> {
    let (from, to) = match at {
        Location::Path(path) => return vec![path.clone()],
        Location::Point(point) => (point.path.clone(), point.path.clone()),
        Location::Range(range) => {
            let (start, end) = range.edges();
            (start.path, end.path)
        }
    };

    let mut paths: Vec<Path> = Vec::new();
    for (path, node) in value.nodes_between(&from, &to) {
        if !target.matches(&path, node) {
            continue;
        }
        if paths.last().is_some_and(|last| last.is_ancestor_of(&path)) {
            continue;
        }
        paths.push(path);
    }
    paths
}

pub(crate) fn require_distance(distance: usize) -> EditorResult<()> {
    if distance == 0 {
        return Err(EditorError::invalid_option("distance must be at least 1"));
    }
    Ok(())
}
