//! Formatting marks on text

use tracing::{debug, instrument};
use weft_model::{Location, Mark, Operation, Path, Point, Range};

use crate::{Editor, EditorResult};

impl Editor {
    /// Add `mark` to every text covered by the location
    #[instrument(skip(self))]
    pub fn add_mark(&mut self, mark: Mark, at: Option<Location>) -> EditorResult<()> {
        self.transact("add_mark", |editor| editor.mark_texts(mark, at, MarkAction::Add))
    }

    /// Remove `mark` from every text covered by the location
    #[instrument(skip(self))]
    pub fn remove_mark(&mut self, mark: Mark, at: Option<Location>) -> EditorResult<()> {
        self.transact("remove_mark", |editor| editor.mark_texts(mark, at, MarkAction::Remove))
    }

    /// Remove `mark` when every covered text already has it, add it otherwise
    #[instrument(skip(self))]
    pub fn toggle_mark(&mut self, mark: Mark, at: Option<Location>) -> EditorResult<()> {
        self.transact("toggle_mark", |editor| editor.mark_texts(mark, at, MarkAction::Toggle))
    }

    fn mark_texts(&mut self, mark: Mark, at: Option<Location>, action: MarkAction) -> EditorResult<()> {
        let tracking = at.is_none();
        let Some(at) = at.or_else(|| self.selection_location()) else {
            return Ok(());
        };

        let (paths, range) = match at {
            Location::Path(path) if self.value.text(&path).is_ok() => (vec![path], None),
            Location::Path(path) => {
                let paths = self
                    .value
                    .descendants_of(&path)?
                    .filter(|(_, node)| node.is_text())
                    .map(|(path, _)| path)
                    .collect();
                (paths, None)
            }
            Location::Point(_) => return Ok(()),
            Location::Range(range) if range.is_collapsed() => return Ok(()),
            Location::Range(range) => {
                let backward = range.is_backward();
                let range = self.split_text_edges(range)?;
                (self.covered_texts(&range), Some((range, backward)))
            }
        };

        let add = match action {
            MarkAction::Add => true,
            MarkAction::Remove => false,
            MarkAction::Toggle => !self.all_marked(&paths, &mark),
        };
        debug!(texts = paths.len(), add, "marking");

        for path in paths {
            let marked = self.value.text(&path)?.has_mark(&mark);
            if add && !marked {
                self.apply_op(Operation::AddMark {
                    path,
                    mark: mark.clone(),
                })?;
            } else if !add && marked {
                self.apply_op(Operation::RemoveMark {
                    path,
                    mark: mark.clone(),
                })?;
            }
        }

        if let (true, Some((range, backward))) = (tracking, range) {
            let (start, end) = range.edges();
            let selection = if backward {
                Range::new(end, start)
            } else {
                Range::new(start, end)
            };
            self.set_selection(Some(selection))?;
        }
        Ok(())
    }

    /// Texts inside a range whose edges already sit on text boundaries. Empty
    /// texts count when their start lies within the range.
    fn covered_texts(&self, range: &Range) -> Vec<Path> {
        let (start, end) = range.edges();
        self.value
            .nodes_between(&start.path, &end.path)
            .into_iter()
            .filter_map(|(path, node)| {
                let text = node.as_text()?;
                let text_start = Point::new(path.clone(), 0);
                let text_end = Point::new(path.clone(), text.len());
                let covered = if text.is_empty() {
                    start <= text_start && text_start <= end
                } else {
                    text_start < end && text_end > start
                };
                covered.then_some(path)
            })
            .collect()
    }

    fn all_marked(&self, paths: &[Path], mark: &Mark) -> bool {
        let texts: Vec<_> = paths
            .iter()
            .filter_map(|path| self.value.text(path).ok())
            .collect();
        let non_empty: Vec<_> = texts.iter().filter(|text| !text.is_empty()).collect();
        if non_empty.is_empty() {
            !texts.is_empty() && texts.iter().all(|text| text.has_mark(mark))
        } else {
            non_empty.iter().all(|text| text.has_mark(mark))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkAction {
    Add,
    Remove,
    Toggle,
}
