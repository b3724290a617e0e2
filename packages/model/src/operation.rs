//! # Operations
//!
//! The atomic, path-addressed mutations every edit is built from.
//!
//! ## Design
//!
//! - Each operation carries enough data to invert itself without looking at
//!   the document it was applied to
//! - `apply` is pure: it returns a new snapshot and leaves the input alone,
//!   so a failed operation never leaves a half-edited document behind
//! - After the tree changes, the selection and every annotation are carried
//!   along with the content they point at

use crate::{
    Affinity, Annotation, Element, Mark, ModelError, ModelResult, Node, Path, Point, Properties,
    Range, Text, Value,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Insert `node` so that it ends up at `path`
    InsertNode { path: Path, node: Node },

    /// Remove the node at `path`, which must equal `node`
    RemoveNode { path: Path, node: Node },

    /// Fold the node at `path` into its previous sibling. `position` is the
    /// previous sibling's length and `properties` those of the removed node.
    MergeNode {
        path: Path,
        position: usize,
        #[serde(default)]
        properties: Properties,
    },

    /// Split the node at `path` at `position` (a character offset for texts,
    /// a child index for elements). The new right sibling gets `properties`.
    SplitNode {
        path: Path,
        position: usize,
        #[serde(default)]
        properties: Properties,
    },

    MoveNode {
        path: Path,
        #[serde(rename = "newPath")]
        new_path: Path,
    },

    SetNode {
        path: Path,
        properties: Properties,
        #[serde(rename = "newProperties")]
        new_properties: Properties,
    },

    InsertText {
        path: Path,
        offset: usize,
        text: String,
    },

    RemoveText {
        path: Path,
        offset: usize,
        text: String,
    },

    SetSelection {
        #[serde(default)]
        properties: Option<Range>,
        #[serde(rename = "newProperties", default)]
        new_properties: Option<Range>,
    },

    AddMark { path: Path, mark: Mark },

    RemoveMark { path: Path, mark: Mark },

    AddAnnotation { key: String, annotation: Annotation },

    RemoveAnnotation { key: String, annotation: Annotation },

    SetAnnotation {
        key: String,
        properties: Annotation,
        #[serde(rename = "newProperties")]
        new_properties: Annotation,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::InsertNode { .. } => "insert_node",
            Operation::RemoveNode { .. } => "remove_node",
            Operation::MergeNode { .. } => "merge_node",
            Operation::SplitNode { .. } => "split_node",
            Operation::MoveNode { .. } => "move_node",
            Operation::SetNode { .. } => "set_node",
            Operation::InsertText { .. } => "insert_text",
            Operation::RemoveText { .. } => "remove_text",
            Operation::SetSelection { .. } => "set_selection",
            Operation::AddMark { .. } => "add_mark",
            Operation::RemoveMark { .. } => "remove_mark",
            Operation::AddAnnotation { .. } => "add_annotation",
            Operation::RemoveAnnotation { .. } => "remove_annotation",
            Operation::SetAnnotation { .. } => "set_annotation",
        }
    }

    /// The path the operation is addressed to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Operation::InsertNode { path, .. }
            | Operation::RemoveNode { path, .. }
            | Operation::MergeNode { path, .. }
            | Operation::SplitNode { path, .. }
            | Operation::MoveNode { path, .. }
            | Operation::SetNode { path, .. }
            | Operation::InsertText { path, .. }
            | Operation::RemoveText { path, .. }
            | Operation::AddMark { path, .. }
            | Operation::RemoveMark { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn is_selection(&self) -> bool {
        matches!(self, Operation::SetSelection { .. })
    }

    /// Operations that can shift existing points
    fn moves_points(&self) -> bool {
        matches!(
            self,
            Operation::InsertNode { .. }
                | Operation::RemoveNode { .. }
                | Operation::MergeNode { .. }
                | Operation::SplitNode { .. }
                | Operation::MoveNode { .. }
                | Operation::InsertText { .. }
                | Operation::RemoveText { .. }
        )
    }

    /// The operation that undoes this one when applied right after it
    pub fn inverse(&self) -> ModelResult<Operation> {
        let inverse = match self {
            Operation::InsertNode { path, node } => Operation::RemoveNode {
                path: path.clone(),
                node: node.clone(),
            },

            Operation::RemoveNode { path, node } => Operation::InsertNode {
                path: path.clone(),
                node: node.clone(),
            },

            Operation::MergeNode {
                path,
                position,
                properties,
            } => Operation::SplitNode {
                path: path.previous()?,
                position: *position,
                properties: properties.clone(),
            },

            Operation::SplitNode {
                path,
                position,
                properties,
            } => Operation::MergeNode {
                path: path.next()?,
                position: *position,
                properties: properties.clone(),
            },

            Operation::MoveNode { path, new_path } => {
                if path == new_path {
                    self.clone()
                } else if path.is_sibling_of(new_path) {
                    Operation::MoveNode {
                        path: new_path.clone(),
                        new_path: path.clone(),
                    }
                } else {
                    let invalid = || ModelError::InvalidMove {
                        path: path.clone(),
                        new_path: new_path.clone(),
                    };
                    let moved = path.transform(self, None).ok_or_else(invalid)?;
                    let back = path.next()?.transform(self, None).ok_or_else(invalid)?;
                    Operation::MoveNode {
                        path: moved,
                        new_path: back,
                    }
                }
            }

            Operation::SetNode {
                path,
                properties,
                new_properties,
            } => Operation::SetNode {
                path: path.clone(),
                properties: new_properties.clone(),
                new_properties: properties.clone(),
            },

            Operation::InsertText { path, offset, text } => Operation::RemoveText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
            },

            Operation::RemoveText { path, offset, text } => Operation::InsertText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
            },

            Operation::SetSelection {
                properties,
                new_properties,
            } => Operation::SetSelection {
                properties: new_properties.clone(),
                new_properties: properties.clone(),
            },

            Operation::AddMark { path, mark } => Operation::RemoveMark {
                path: path.clone(),
                mark: mark.clone(),
            },

            Operation::RemoveMark { path, mark } => Operation::AddMark {
                path: path.clone(),
                mark: mark.clone(),
            },

            Operation::AddAnnotation { key, annotation } => Operation::RemoveAnnotation {
                key: key.clone(),
                annotation: annotation.clone(),
            },

            Operation::RemoveAnnotation { key, annotation } => Operation::AddAnnotation {
                key: key.clone(),
                annotation: annotation.clone(),
            },

            Operation::SetAnnotation {
                key,
                properties,
                new_properties,
            } => Operation::SetAnnotation {
                key: key.clone(),
                properties: new_properties.clone(),
                new_properties: properties.clone(),
            },
        };

        Ok(inverse)
    }

    /// Apply to a snapshot, producing the next one
    pub fn apply(&self, value: &Value) -> ModelResult<Value> {
        let mut next = value.clone();
        self.apply_tree(&mut next)?;
        if self.moves_points() {
            self.carry_points(&mut next);
        }
        Ok(next)
    }

    fn apply_tree(&self, value: &mut Value) -> ModelResult<()> {
        match self {
            Operation::InsertNode { path, node } => {
                let (parent, index) = split_index(path)?;
                let children = value.children_at_mut(&parent)?;
                if index > children.len() {
                    return Err(ModelError::out_of_range(path));
                }
                children.insert(index, node.clone());
            }

            Operation::RemoveNode { path, node } => {
                let (parent, index) = split_index(path)?;
                let children = value.children_at_mut(&parent)?;
                match children.get(index) {
                    Some(current) if current == node => {
                        children.remove(index);
                    }
                    Some(_) => return Err(ModelError::NodeMismatch { path: path.clone() }),
                    None => return Err(ModelError::out_of_range(path)),
                }
            }

            Operation::MergeNode { path, position, .. } => {
                let (parent, index) = split_index(path)?;
                if index == 0 {
                    return Err(ModelError::invalid_merge(path, "there is no previous sibling"));
                }
                let children = value.children_at_mut(&parent)?;
                if index >= children.len() {
                    return Err(ModelError::out_of_range(path));
                }
                let node = children.remove(index);
                let previous = &mut children[index - 1];
                if previous.merge_length() != *position {
                    return Err(ModelError::invalid_merge(
                        path,
                        format!(
                            "position {} does not match the previous sibling's length {}",
                            position,
                            previous.merge_length()
                        ),
                    ));
                }
                match (previous, node) {
                    (Node::Text(previous), Node::Text(node)) => previous.text.push_str(&node.text),
                    (Node::Element(previous), Node::Element(node)) => {
                        previous.children.extend(node.children)
                    }
                    _ => {
                        return Err(ModelError::invalid_merge(
                            path,
                            "a text and an element cannot be merged",
                        ))
                    }
                }
            }

            Operation::SplitNode {
                path,
                position,
                properties,
            } => {
                let (parent, index) = split_index(path)?;
                let children = value.children_at_mut(&parent)?;
                let node = children
                    .get_mut(index)
                    .ok_or_else(|| ModelError::out_of_range(path))?;
                let mut right = match node {
                    Node::Text(text) => {
                        if *position > text.len() {
                            return Err(ModelError::OffsetOutOfRange {
                                path: path.clone(),
                                offset: *position,
                                len: text.len(),
                            });
                        }
                        let tail = text.split_off(*position);
                        Node::Text(Text {
                            text: tail,
                            marks: text.marks.clone(),
                        })
                    }
                    Node::Element(element) => {
                        if *position > element.children.len() {
                            return Err(ModelError::out_of_range(&path.child(*position)));
                        }
                        let tail = element.children.split_off(*position);
                        Node::Element(Element {
                            kind: element.kind.clone(),
                            data: element.data.clone(),
                            children: tail,
                            is_void: element.is_void,
                            is_inline: element.is_inline,
                        })
                    }
                };
                properties.apply_to(&mut right);
                children.insert(index + 1, right);
            }

            Operation::MoveNode { path, new_path } => {
                let invalid = || ModelError::InvalidMove {
                    path: path.clone(),
                    new_path: new_path.clone(),
                };
                if path.is_root() || path == new_path || path.is_ancestor_of(new_path) {
                    return Err(invalid());
                }
                let target = path.transform(self, None).ok_or_else(invalid)?;
                let (parent, index) = split_index(path)?;
                let children = value.children_at_mut(&parent)?;
                if index >= children.len() {
                    return Err(ModelError::out_of_range(path));
                }
                let node = children.remove(index);
                let (new_parent, new_index) = split_index(&target)?;
                let siblings = value
                    .children_at_mut(&new_parent)
                    .map_err(|_| ModelError::out_of_range(new_path))?;
                if new_index > siblings.len() {
                    return Err(ModelError::out_of_range(new_path));
                }
                siblings.insert(new_index, node);
            }

            Operation::SetNode {
                path,
                properties,
                new_properties,
            } => {
                let node = value.get_mut(path)?;
                if !properties.matches(node) {
                    return Err(ModelError::PropertiesMismatch { path: path.clone() });
                }
                new_properties.apply_to(node);
            }

            Operation::InsertText { path, offset, text } => {
                let leaf = value.text_mut(path)?;
                if *offset > leaf.len() {
                    return Err(ModelError::OffsetOutOfRange {
                        path: path.clone(),
                        offset: *offset,
                        len: leaf.len(),
                    });
                }
                leaf.insert_str(*offset, text);
            }

            Operation::RemoveText { path, offset, text } => {
                let leaf = value.text_mut(path)?;
                let count = text.chars().count();
                let actual = leaf.slice(*offset, offset + count);
                if actual != *text {
                    return Err(ModelError::TextMismatch {
                        path: path.clone(),
                        offset: *offset,
                        expected: text.clone(),
                        actual,
                    });
                }
                leaf.remove_chars(*offset, count);
            }

            Operation::SetSelection { new_properties, .. } => {
                value.selection = new_properties.clone();
            }

            Operation::AddMark { path, mark } => {
                value.text_mut(path)?.add_mark(mark.clone());
            }

            Operation::RemoveMark { path, mark } => {
                value.text_mut(path)?.remove_mark(mark);
            }

            Operation::AddAnnotation { key, annotation } => {
                if value.annotations.contains_key(key) {
                    return Err(ModelError::AnnotationExists(key.clone()));
                }
                value.annotations.insert(key.clone(), annotation.clone());
            }

            Operation::RemoveAnnotation { key, .. } => {
                if value.annotations.remove(key).is_none() {
                    return Err(ModelError::AnnotationMissing(key.clone()));
                }
            }

            Operation::SetAnnotation {
                key,
                new_properties,
                ..
            } => {
                let annotation = value
                    .annotations
                    .get_mut(key)
                    .ok_or_else(|| ModelError::AnnotationMissing(key.clone()))?;
                *annotation = new_properties.clone();
            }
        }

        Ok(())
    }

    /// Move the selection and annotations along with the edit
    fn carry_points(&self, value: &mut Value) {
        if let Some(selection) = value.selection.take() {
            value.selection = self.carry_range(&selection, value);
        }

        let annotations = std::mem::take(&mut value.annotations);
        for (key, annotation) in annotations {
            if let Some(range) = self.carry_range(&annotation.range(), value) {
                value.annotations.insert(
                    key,
                    Annotation {
                        anchor: range.anchor,
                        focus: range.focus,
                        ..annotation
                    },
                );
            }
        }
    }

    fn carry_range(&self, range: &Range, value: &Value) -> Option<Range> {
        let anchor = self.carry_point(&range.anchor, value)?;
        let focus = self.carry_point(&range.focus, value)?;
        Some(Range::new(anchor, focus))
    }

    /// Transform a point, relocating it to the nearest surviving text when
    /// its own leaf was removed
    fn carry_point(&self, point: &Point, value: &Value) -> Option<Point> {
        if let Some(point) = point.transform(self, Some(Affinity::Forward)) {
            return Some(point);
        }

        let Operation::RemoveNode { path, .. } = self else {
            return None;
        };

        let mut previous = None;
        let mut next = None;
        for (text_path, text) in value.texts() {
            if text_path < *path {
                previous = Some((text_path, text.len()));
            } else {
                next = Some(text_path);
                break;
            }
        }

        let prefer_next = match (&previous, &next) {
            (Some((previous, _)), Some(next)) => {
                if next == path {
                    !next.has_previous()
                } else {
                    previous.common(path).len() < next.common(path).len()
                }
            }
            _ => false,
        };

        match (previous, next) {
            (Some((path, len)), _) if !prefer_next => Some(Point::new(path, len)),
            (_, Some(path)) => Some(Point::new(path, 0)),
            _ => None,
        }
    }
}

fn split_index(path: &Path) -> ModelResult<(Path, usize)> {
    let parent = path.parent()?;
    let index = path[path.len() - 1];
    Ok((parent, index))
}
