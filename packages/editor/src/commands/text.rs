//! Deleting and inserting content

use tracing::instrument;
use weft_model::{Affinity, Location, Node, Operation, Path, Point, Range, RangeAffinity, Unit};

use super::{require_distance, DeleteOptions};
use crate::{Editor, EditorError, EditorResult};

impl Editor {
    /// Delete the content at `at`, or `distance` units next to it when `at`
    /// is a point
    #[instrument(skip(self))]
    pub fn delete(&mut self, at: Option<Location>, options: DeleteOptions) -> EditorResult<()> {
        require_distance(options.distance)?;
        self.transact("delete", |editor| editor.delete_in(at, options))
    }

    pub fn delete_backward(&mut self, unit: Unit) -> EditorResult<()> {
        self.delete(None, DeleteOptions::backward(unit))
    }

    pub fn delete_forward(&mut self, unit: Unit) -> EditorResult<()> {
        self.delete(None, DeleteOptions::forward(unit))
    }

    fn delete_in(&mut self, at: Option<Location>, options: DeleteOptions) -> EditorResult<()> {
        let tracking = at.is_none();
        let Some(at) = at.or_else(|| self.selection_location()) else {
            return Ok(());
        };

        let point = match at {
            Location::Path(path) => return self.remove_node_at(&path),
            Location::Range(range) if range.is_expanded() => {
                return self.delete_range(range, tracking)
            }
            Location::Range(range) => range.anchor,
            Location::Point(point) => point,
        };

        if let Some(void) = self.value.furthest_void(&point.path) {
            return self.remove_node_at(&void);
        }

        if self.delete_empty_block(&point, options, tracking)? {
            return Ok(());
        }

        let target = if options.reverse {
            self.value
                .previous_point(&point, options.unit, options.distance)
        } else {
            self.value.next_point(&point, options.unit, options.distance)
        };
        match target {
            Some(target) => self.delete_range(Range::new(point, target), tracking),
            None => Ok(()),
        }
    }

    /// Remove an empty block instead of merging into it, landing on the
    /// neighbouring position. Returns whether it applied.
    fn delete_empty_block(
        &mut self,
        point: &Point,
        options: DeleteOptions,
        tracking: bool,
    ) -> EditorResult<bool> {
        let Some((block_path, block)) = self.value.closest_block(&point.path) else {
            return Ok(false);
        };
        if block.is_void || !block.is_empty() {
            return Ok(false);
        }

        let target = if options.reverse {
            self.value.previous_point(point, Unit::Character, 1)
        } else {
            self.value.next_point(point, Unit::Character, 1)
        };
        let Some(target) = target else {
            return Ok(false);
        };

        let target_ref = self.refs.point_ref(target, Some(Affinity::Forward));
        self.remove_node_at(&block_path)?;
        let target = self.refs.unref_point(target_ref);

        if tracking {
            if let Some(target) = target {
                self.set_selection(Some(Range::collapsed(target)))?;
            }
        }
        Ok(true)
    }

    /// Delete an expanded range: split both edges up to the common ancestor,
    /// drop everything between and merge the trailing block back in
    pub(crate) fn delete_range(&mut self, range: Range, tracking: bool) -> EditorResult<()> {
        let (start, end) = range.edges();
        if start == end {
            return Ok(());
        }

        let start_void = self.value.furthest_void(&start.path);
        let end_void = self.value.furthest_void(&end.path);

        if start.path == end.path && start_void.is_none() {
            let text = self.value.text(&start.path)?.slice(start.offset, end.offset);
            self.apply_op(Operation::RemoveText {
                path: start.path.clone(),
                offset: start.offset,
                text,
            })?;
            if tracking {
                self.set_selection(Some(Range::collapsed(start)))?;
            }
            return Ok(());
        }

        if let (Some(first), Some(last)) = (&start_void, &end_void) {
            if first == last {
                return self.remove_node_at(first);
            }
        }

        let common = start.path.common(&end.path);
        let has_blocks = self.value.node(&common)?.has_block_children();
        let top = common.len() + 1;

        let range_ref = self
            .refs
            .range_ref(Range::new(start.clone(), end.clone()), Some(RangeAffinity::Inward));
        let start_ref = self.refs.point_ref(start.clone(), Some(Affinity::Backward));
        let after_ref = self.refs.point_ref(end.clone(), Some(Affinity::Forward));

        let end_split = match &end_void {
            Some(void) => self.split_up(&void.parent()?, void[void.len() - 1] + 1, top)?,
            None => self.split_up(&end.path, end.offset, top)?,
        };
        let start_split = match &start_void {
            Some(void) => self.split_up(&void.parent()?, void[void.len() - 1], top)?,
            None => self.split_up(&start.path, start.offset, top)?,
        };

        let span = self.refs.unref_range(range_ref);
        if let Some(span) = span {
            let depth = common.len();
            let first = span.start().path[depth];
            let last = span.end().path[depth];
            for index in (first..=last).rev() {
                self.remove_node_at(&common.child(index))?;
            }
        }

        let after = self.refs.unref_point(after_ref);
        if has_blocks && start_split.is_some() && end_split.is_some() {
            if let Some(after) = &after {
                self.merge_block_at(&after.path)?;
            }
        }

        let start = self.refs.unref_point(start_ref);
        if tracking {
            let caret = start.filter(|point| self.value.is_valid_point(point));
            if let Some(point) = caret.or(after) {
                self.set_selection(Some(Range::collapsed(point)))?;
            }
        }
        Ok(())
    }

    /// Fold the leaf block at `path` into the previous leaf block
    pub(crate) fn merge_block_at(&mut self, path: &Path) -> EditorResult<()> {
        let Some((block_path, block)) = self.value.leaf_block_at(path) else {
            return Ok(());
        };
        let Some((previous_path, previous)) = self.value.previous_leaf_block(&block_path) else {
            return Ok(());
        };

        if !previous.is_void && previous.is_empty() {
            return self.remove_node_at(&previous_path);
        }
        if block.is_void || previous.is_void {
            return Ok(());
        }

        let target = previous_path.next()?;

        if block_path != target {
            let mut emptied = None;
            let mut current = block_path.clone();
            loop {
                let parent = current.parent()?;
                if parent.is_root()
                    || parent.is_ancestor_of(&previous_path)
                    || self.value.children_at(&parent)?.len() != 1
                {
                    break;
                }
                emptied = Some(parent.clone());
                current = parent;
            }

            let emptied_ref = emptied.map(|path| self.refs.path_ref(path, None));
            self.apply_op(Operation::MoveNode {
                path: block_path.clone(),
                new_path: target.clone(),
            })?;
            if let Some(emptied) = emptied_ref.and_then(|handle| self.refs.unref_path(handle)) {
                self.remove_node_at(&emptied)?;
            }
        }

        self.merge_node_at(&target)
    }

    /// Insert `text` at the location, replacing an expanded range
    #[instrument(skip(self))]
    pub fn insert_text(&mut self, text: &str, at: Option<Location>) -> EditorResult<()> {
        self.transact("insert_text", |editor| {
            let Some(point) = editor.insertion_point(at)? else {
                return Ok(());
            };
            if text.is_empty() || editor.value.furthest_void(&point.path).is_some() {
                return Ok(());
            }

            let atomic: Vec<_> = editor
                .value
                .annotations
                .iter()
                .filter(|(_, annotation)| {
                    editor.schema.is_atomic(&annotation.kind) && annotation.range().includes(&point)
                })
                .map(|(key, annotation)| (key.clone(), annotation.clone()))
                .collect();
            for (key, annotation) in atomic {
                editor.apply_op(Operation::RemoveAnnotation { key, annotation })?;
            }

            editor.apply_op(Operation::InsertText {
                path: point.path,
                offset: point.offset,
                text: text.to_string(),
            })
        })
    }

    /// Insert nodes copied from another document. Block fragments land
    /// between the halves of the closest block, an empty block is replaced,
    /// and the caret ends after the inserted content.
    #[instrument(skip(self, fragment), fields(nodes = fragment.len()))]
    pub fn insert_fragment(&mut self, fragment: Vec<Node>, at: Option<Location>) -> EditorResult<()> {
        self.transact("insert_fragment", |editor| {
            let tracking = at.is_none();
            let Some(point) = editor.insertion_point(at)? else {
                return Ok(());
            };
            editor.insert_at_point(fragment, point, true, tracking)
        })
    }

    /// Resolve a location to the point content is inserted at, deleting an
    /// expanded range first
    pub(crate) fn insertion_point(&mut self, at: Option<Location>) -> EditorResult<Option<Point>> {
        let tracking = at.is_none();
        let Some(at) = at.or_else(|| self.selection_location()) else {
            return Ok(None);
        };
        match at {
            Location::Path(path) => Err(EditorError::invalid_location(format!(
                "expected a point or range, got path {}",
                path
            ))),
            Location::Point(point) => Ok(Some(point)),
            Location::Range(range) if range.is_collapsed() => Ok(Some(range.anchor)),
            Location::Range(range) => {
                let end_ref = self.refs.point_ref(range.end().clone(), Some(Affinity::Forward));
                self.delete_range(range, tracking)?;
                let point = self.refs.unref_point(end_ref);
                if let (true, Some(point)) = (tracking, &point) {
                    self.set_selection(Some(Range::collapsed(point.clone())))?;
                }
                Ok(point)
            }
        }
    }

    /// Insert `nodes` at `point`: blocks next to the closest block, texts and
    /// inlines next to the text leaf
    pub(crate) fn insert_at_point(
        &mut self,
        nodes: Vec<Node>,
        point: Point,
        replace_empty: bool,
        tracking: bool,
    ) -> EditorResult<()> {
        let Some(first) = nodes.first() else {
            return Ok(());
        };
        if self.value.furthest_void(&point.path).is_some() {
            return Ok(());
        }

        let insert_at = if first.is_block() {
            let Some((block_path, block)) = self.value.closest_block(&point.path) else {
                return Ok(());
            };
            let replace = replace_empty && block.is_empty();
            if replace {
                self.remove_node_at(&block_path)?;
                block_path
            } else if self.value.start(&block_path)? == point {
                block_path
            } else if self.value.end(&block_path)? == point {
                block_path.next()?
            } else {
                match self.split_up(&point.path, point.offset, block_path.len())? {
                    Some(right) => right,
                    None => block_path.next()?,
                }
            }
        } else {
            let text = self.value.text(&point.path)?;
            if point.offset == 0 {
                point.path.clone()
            } else if point.offset >= text.len() {
                point.path.next()?
            } else {
                self.split_node_at(&point.path, point.offset)?;
                point.path.next()?
            }
        };

        let mut path = insert_at;
        let mut last = path.clone();
        for node in nodes {
            self.insert_node_at(&path, node)?;
            last = path.clone();
            path = path.next()?;
        }

        if tracking {
            if let Ok(end) = self.value.end(&last) {
                self.set_selection(Some(Range::collapsed(end)))?;
            }
        }
        Ok(())
    }
}
