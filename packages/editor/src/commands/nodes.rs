//! Structural commands: splitting, merging, moving, wrapping and patching
//! nodes

use tracing::{debug, instrument};
use weft_model::{
    Affinity, Element, Location, Node, Operation, Path, Properties, Range, RangeAffinity,
};

use super::{matching_paths, unhang, NodePatch, SplitHeight, Target};
use crate::{Editor, EditorError, EditorResult};

impl Editor {
    /// Split at a point, up through `height` levels. A path splits its
    /// parent right before it.
    #[instrument(skip(self))]
    pub fn split_nodes(&mut self, at: Option<Location>, height: SplitHeight) -> EditorResult<()> {
        self.transact("split_nodes", |editor| {
            let Some(at) = at.or_else(|| editor.selection_location()) else {
                return Ok(());
            };

            let (path, position) = match at {
                Location::Path(path) => {
                    let parent = path.parent()?;
                    let index = path[path.len() - 1];
                    (parent, index)
                }
                location => {
                    let Some(point) = editor.insertion_point(Some(location))? else {
                        return Ok(());
                    };
                    match editor.value.furthest_void(&point.path) {
                        Some(void) => (void.parent()?, void[void.len() - 1] + 1),
                        None => (point.path, point.offset),
                    }
                }
            };
            if path.is_root() {
                return Ok(());
            }

            let top = match height {
                SplitHeight::Exact(levels) => path.len().saturating_sub(levels),
                SplitHeight::Block => match editor.value.closest_block(&path) {
                    Some((block, _)) => block.len(),
                    None => path.len(),
                },
            };
            editor.split_up(&path, position, top).map(|_| ())
        })
    }

    /// Merge with the previous sibling at a path, or the previous leaf block
    /// at a point
    #[instrument(skip(self))]
    pub fn merge_nodes(&mut self, at: Option<Location>) -> EditorResult<()> {
        self.transact("merge_nodes", |editor| {
            let Some(at) = at.or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            match at {
                Location::Path(path) => {
                    let Ok(previous_path) = path.previous() else {
                        return Ok(());
                    };
                    let previous = editor.value.get(&previous_path)?;
                    if previous
                        .as_element()
                        .is_some_and(|element| !element.is_void && element.is_empty())
                    {
                        editor.remove_node_at(&previous_path)
                    } else {
                        editor.merge_node_at(&path)
                    }
                }
                Location::Point(point) => editor.merge_block_at(&point.path),
                Location::Range(range) => editor.merge_block_at(&range.start().path),
            }
        })
    }

    /// Move the matched nodes, in order, to `to`
    #[instrument(skip(self))]
    pub fn move_nodes(&mut self, at: Option<Location>, target: Target, to: Path) -> EditorResult<()> {
        self.transact("move_nodes", |editor| {
            let Some(at) = at.or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let paths = matching_paths(&editor.value, &at, target);
            let to_ref = editor.refs.path_ref(to, Some(Affinity::Forward));
            let handles: Vec<_> = paths
                .into_iter()
                .map(|path| editor.refs.path_ref(path, None))
                .collect();

            for handle in handles {
                let Some(path) = editor.refs.unref_path(handle) else {
                    continue;
                };
                let Some(new_path) = editor.refs.path(&to_ref) else {
                    break;
                };
                if path != new_path {
                    editor.apply_op(Operation::MoveNode {
                        path: path.clone(),
                        new_path: new_path.clone(),
                    })?;
                }
                if new_path.is_sibling_of(&path) && new_path > path {
                    let next = editor.refs.path(&to_ref).map(|to| to.next()).transpose()?;
                    editor.refs.set_path(&to_ref, next);
                }
            }

            let _ = editor.refs.unref_path(to_ref);
            Ok(())
        })
    }

    /// Patch the type, data or flags of matched elements
    #[instrument(skip(self))]
    pub fn set_nodes(&mut self, patch: NodePatch, at: Option<Location>, target: Target) -> EditorResult<()> {
        self.transact("set_nodes", |editor| {
            let Some(at) = at.or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let at = match at {
                Location::Range(range) => Location::Range(unhang(&editor.value, range)),
                at => at,
            };

            for path in matching_paths(&editor.value, &at, target) {
                let Some(element) = editor.value.get(&path)?.as_element() else {
                    continue;
                };
                let (properties, new_properties) = patch_properties(element, &patch);
                if new_properties.is_empty() {
                    continue;
                }
                editor.apply_op(Operation::SetNode {
                    path,
                    properties,
                    new_properties,
                })?;
            }
            Ok(())
        })
    }

    /// Wrap the matched nodes in a copy of `wrapper`. Block wrappers enclose
    /// the run of siblings spanning the matches; inline wrappers enclose the
    /// text covered by an expanded range, once per block.
    #[instrument(skip(self))]
    pub fn wrap_nodes(&mut self, wrapper: Element, at: Option<Location>, target: Target) -> EditorResult<()> {
        self.transact("wrap_nodes", |editor| {
            let Some(at) = at.or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let wrapper = Element {
                children: Vec::new(),
                ..wrapper
            };

            if wrapper.is_inline {
                match at {
                    Location::Range(range) if range.is_expanded() => editor.wrap_inline(wrapper, range),
                    _ => Ok(()),
                }
            } else {
                let paths = matching_paths(&editor.value, &at, target);
                editor.wrap_block(wrapper, &paths)
            }
        })
    }

    fn wrap_block(&mut self, wrapper: Element, paths: &[Path]) -> EditorResult<()> {
        let (Some(first), Some(last)) = (paths.first(), paths.last()) else {
            return Ok(());
        };
        let parent = if first == last {
            first.parent()?
        } else {
            first.common(last)
        };
        let depth = parent.len();
        let start = first[depth];
        let end = last[depth];
        self.wrap_children(wrapper, &parent, start, end)
    }

    /// Put children `start..=end` of `parent` into a new `wrapper`
    fn wrap_children(&mut self, wrapper: Element, parent: &Path, start: usize, end: usize) -> EditorResult<()> {
        let wrapper_path = parent.child(end + 1);
        self.insert_node_at(&wrapper_path, Node::Element(wrapper))?;
        let wrapper_ref = self.refs.path_ref(wrapper_path, None);

        for index in 0..=(end - start) {
            let Some(wrapper_path) = self.refs.path(&wrapper_ref) else {
                break;
            };
            self.apply_op(Operation::MoveNode {
                path: parent.child(start),
                new_path: wrapper_path.child(index),
            })?;
        }

        let _ = self.refs.unref_path(wrapper_ref);
        Ok(())
    }

    fn wrap_inline(&mut self, wrapper: Element, range: Range) -> EditorResult<()> {
        let range = self.split_text_edges(range)?;
        let (start, end) = range.edges();

        let mut groups: Vec<(Path, usize, usize)> = Vec::new();
        for (block, _) in self.value.leaf_blocks_between(&start.path, &end.path) {
            let children = self.value.children_at(&block)?;
            let mut covered = (0..children.len()).filter(|index| {
                let child = block.child(*index);
                let child_start = self.value.start(&child);
                let child_end = self.value.end(&child);
                match (child_start, child_end) {
                    (Ok(child_start), Ok(child_end)) => child_start < end && child_end > start,
                    _ => false,
                }
            });
            if let Some(first) = covered.next() {
                let last = covered.last().unwrap_or(first);
                groups.push((block, first, last));
            }
        }

        debug!(groups = groups.len(), "wrapping inline");
        for (block, first, last) in groups.into_iter().rev() {
            self.wrap_children(wrapper.clone(), &block, first, last)?;
        }
        Ok(())
    }

    /// Lift the children of matching elements of type `kind` out and remove
    /// the emptied elements
    #[instrument(skip(self))]
    pub fn unwrap_nodes(&mut self, kind: &str, at: Option<Location>) -> EditorResult<()> {
        self.transact("unwrap_nodes", |editor| {
            let Some(at) = at.or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let matches: Vec<Path> = match &at {
                Location::Path(path) => editor
                    .value
                    .levels(path)?
                    .into_iter()
                    .filter(|(_, node)| node.kind() == Some(kind))
                    .map(|(path, _)| path)
                    .collect(),
                Location::Point(point) => editor.kind_between(kind, &point.path, &point.path),
                Location::Range(range) => {
                    let (start, end) = range.edges();
                    editor.kind_between(kind, &start.path, &end.path)
                }
            };

            let handles: Vec<_> = matches
                .into_iter()
                .map(|path| editor.refs.path_ref(path, None))
                .collect();
            for handle in handles.into_iter().rev() {
                let count = match editor.refs.path(&handle) {
                    Some(path) => editor.value.children_at(&path)?.len(),
                    None => 0,
                };
                for _ in 0..count {
                    let Some(current) = editor.refs.path(&handle) else {
                        break;
                    };
                    editor.apply_op(Operation::MoveNode {
                        path: current.child(0),
                        new_path: current,
                    })?;
                }
                if let Some(path) = editor.refs.unref_path(handle) {
                    editor.remove_node_at(&path)?;
                }
            }
            Ok(())
        })
    }

    fn kind_between(&self, kind: &str, from: &Path, to: &Path) -> Vec<Path> {
        self.value
            .nodes_between(from, to)
            .into_iter()
            .filter(|(_, node)| node.kind() == Some(kind))
            .map(|(path, _)| path)
            .collect()
    }

    /// Remove the matched nodes
    #[instrument(skip(self))]
    pub fn remove_nodes(&mut self, at: Option<Location>, target: Target) -> EditorResult<()> {
        self.transact("remove_nodes", |editor| {
            let Some(at) = at.or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let handles: Vec<_> = matching_paths(&editor.value, &at, target)
                .into_iter()
                .map(|path| editor.refs.path_ref(path, None))
                .collect();
            for handle in handles {
                if let Some(path) = editor.refs.unref_path(handle) {
                    editor.remove_node_at(&path)?;
                }
            }
            Ok(())
        })
    }

    /// Insert nodes at a path, or next to the content at a point
    #[instrument(skip(self, nodes), fields(nodes = nodes.len()))]
    pub fn insert_nodes(&mut self, nodes: Vec<Node>, at: Option<Location>) -> EditorResult<()> {
        self.transact("insert_nodes", |editor| {
            let tracking = at.is_none();
            match at {
                Some(Location::Path(path)) => {
                    let mut path = path;
                    for node in nodes {
                        editor.insert_node_at(&path, node)?;
                        path = path.next()?;
                    }
                    Ok(())
                }
                at => {
                    let Some(point) = editor.insertion_point(at)? else {
                        return Ok(());
                    };
                    editor.insert_at_point(nodes, point, false, tracking)
                }
            }
        })
    }

    /// Split the texts at the edges of `range` when an edge falls inside a
    /// text, returning the range over the split pieces
    pub(crate) fn split_text_edges(&mut self, range: Range) -> EditorResult<Range> {
        let range_ref = self
            .refs
            .range_ref(range.clone(), Some(RangeAffinity::Inward));
        let (start, end) = range.edges();

        for point in [end, start] {
            let len = self.value.text(&point.path)?.len();
            if point.offset > 0 && point.offset < len {
                self.split_node_at(&point.path, point.offset)?;
            }
        }

        self.refs
            .unref_range(range_ref)
            .ok_or_else(|| EditorError::invalid_location("range was removed while splitting"))
    }
}

/// Old and new properties for the fields `patch` changes on `element`
fn patch_properties(element: &Element, patch: &NodePatch) -> (Properties, Properties) {
    let mut properties = Properties::default();
    let mut new_properties = Properties::default();

    if let Some(kind) = &patch.kind {
        if *kind != element.kind {
            properties.kind = Some(element.kind.clone());
            new_properties.kind = Some(kind.clone());
        }
    }

    if let Some(changes) = &patch.data {
        let mut data = element.data.clone();
        for (key, value) in changes {
            if value.is_null() {
                data.remove(key);
            } else {
                data.insert(key.clone(), value.clone());
            }
        }
        if data != element.data {
            properties.data = Some(element.data.clone());
            new_properties.data = Some(data);
        }
    }

    if let Some(flag) = patch.is_void {
        if flag != element.is_void {
            properties.is_void = Some(element.is_void);
            new_properties.is_void = Some(flag);
        }
    }

    if let Some(flag) = patch.is_inline {
        if flag != element.is_inline {
            properties.is_inline = Some(element.is_inline);
            new_properties.is_inline = Some(flag);
        }
    }

    (properties, new_properties)
}
