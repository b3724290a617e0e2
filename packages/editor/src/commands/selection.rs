//! Selection commands

use tracing::instrument;
use weft_model::{Edge, Location, Point, Range, Unit};

use super::require_distance;
use crate::{Editor, EditorError, EditorResult};

impl Editor {
    /// Select a location. A path selects the whole node.
    #[instrument(skip(self, at))]
    pub fn select(&mut self, at: impl Into<Location>) -> EditorResult<()> {
        let range = match at.into() {
            Location::Path(path) => self.value.range_of(&path)?,
            Location::Point(point) => Range::collapsed(point),
            Location::Range(range) => range,
        };
        if !self.value.is_valid_range(&range) {
            return Err(EditorError::invalid_location(format!(
                "{}:{} → {}:{} is not in the document",
                range.anchor.path, range.anchor.offset, range.focus.path, range.focus.offset
            )));
        }
        self.transact("select", |editor| editor.set_selection(Some(range)))
    }

    pub fn deselect(&mut self) -> EditorResult<()> {
        self.transact("deselect", |editor| editor.set_selection(None))
    }

    /// Collapse the selection onto one of its edges
    pub fn collapse(&mut self, edge: Edge) -> EditorResult<()> {
        let Some(selection) = self.value.selection.clone() else {
            return Ok(());
        };
        let point = selection.edge(edge).clone();
        self.transact("collapse", |editor| {
            editor.set_selection(Some(Range::collapsed(point)))
        })
    }

    /// Move both selection points by `distance` units. A point that cannot
    /// move stays put.
    #[instrument(skip(self))]
    pub fn move_selection(&mut self, distance: usize, unit: Unit, reverse: bool) -> EditorResult<()> {
        require_distance(distance)?;
        let Some(selection) = self.value.selection.clone() else {
            return Ok(());
        };

        let step = |point: &Point| {
            let moved = if reverse {
                self.value.previous_point(point, unit, distance)
            } else {
                self.value.next_point(point, unit, distance)
            };
            moved.unwrap_or_else(|| point.clone())
        };
        let moved = Range::new(step(&selection.anchor), step(&selection.focus));

        self.transact("move_selection", |editor| editor.set_selection(Some(moved)))
    }
}
