//! # Undo/Redo History
//!
//! Every top-level transaction that applied operations becomes one entry.
//!
//! ## Design
//!
//! - Inverses are derived from the operations alone when the entry is
//!   recorded, stored in reverse order
//! - Undo applies the inverses, restores the pre-transaction selection and
//!   moves the entry to the redo stack
//! - Redo reapplies the original operations
//! - New entries clear the redo stack
//! - Selection-only transactions fold into the previous entry and never
//!   clear the redo stack

use tracing::debug;
use weft_model::{ModelResult, Operation, Range};

use crate::{Editor, EditorResult};

/// A group of operations undone and redone together
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// The operations in this entry (in application order)
    pub operations: Vec<Operation>,

    /// The inverse operations (in reverse order for undo)
    pub inverses: Vec<Operation>,

    /// Selection before the transaction started
    pub selection_before: Option<Range>,

    /// Optional description of this entry
    pub description: Option<String>,
}

impl HistoryEntry {
    pub fn from_operations(operations: Vec<Operation>) -> ModelResult<Self> {
        let inverses = operations
            .iter()
            .rev()
            .map(Operation::inverse)
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(Self {
            operations,
            inverses,
            selection_before: None,
            description: None,
        })
    }

    pub fn with_selection_before(mut self, selection: Option<Range>) -> Self {
        self.selection_before = selection;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_selection_only(&self) -> bool {
        self.operations.iter().all(Operation::is_selection)
    }

    fn absorb(&mut self, later: HistoryEntry) {
        self.operations.extend(later.operations);
        let mut inverses = later.inverses;
        inverses.append(&mut self.inverses);
        self.inverses = inverses;
    }
}

/// Undo/redo stacks for one editor
#[derive(Debug)]
pub struct History {
    /// Entries that can be undone (most recent last)
    undos: Vec<HistoryEntry>,

    /// Entries that can be redone (most recent last)
    redos: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl History {
    /// Create a history with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undos: Vec::new(),
            redos: Vec::new(),
            max_levels,
        }
    }

    /// Record a finished transaction
    pub fn record(&mut self, entry: HistoryEntry) {
        if entry.is_selection_only() {
            if let Some(last) = self.undos.last_mut() {
                last.absorb(entry);
            }
            return;
        }

        self.push_undo(entry);

        // New action invalidates the future
        self.redos.clear();
    }

    fn push_undo(&mut self, entry: HistoryEntry) {
        self.undos.push(entry);

        if self.max_levels > 0 && self.undos.len() > self.max_levels {
            self.undos.remove(0);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undos.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redos.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undos.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redos.len()
    }

    /// Description of the entry the next undo would revert
    pub fn undo_description(&self) -> Option<&str> {
        self.undos.last()?.description.as_deref()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redos.last()?.description.as_deref()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.undos
    }

    pub fn clear(&mut self) {
        self.undos.clear();
        self.redos.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Revert the most recent entry. Returns `false` when there is nothing
    /// to undo.
    pub fn undo(&mut self) -> EditorResult<bool> {
        let Some(entry) = self.history.undos.pop() else {
            return Ok(false);
        };
        debug!(description = ?entry.description, "undo");

        let result = self.without_saving(|editor| {
            editor.transact("undo", |editor| {
                for inverse in &entry.inverses {
                    editor.apply_op(inverse.clone())?;
                }
                if let Some(selection) = &entry.selection_before {
                    if editor.value.is_valid_range(selection) {
                        editor.set_selection(Some(selection.clone()))?;
                    }
                }
                Ok(())
            })
        });

        match result {
            Ok(()) => {
                self.history.redos.push(entry);
                Ok(true)
            }
            Err(err) => {
                self.history.undos.push(entry);
                Err(err)
            }
        }
    }

    /// Reapply the most recently undone entry. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> EditorResult<bool> {
        let Some(entry) = self.history.redos.pop() else {
            return Ok(false);
        };
        debug!(description = ?entry.description, "redo");

        let result = self.without_saving(|editor| {
            editor.transact("redo", |editor| {
                for op in &entry.operations {
                    editor.apply_op(op.clone())?;
                }
                Ok(())
            })
        });

        match result {
            Ok(()) => {
                self.history.push_undo(entry);
                Ok(true)
            }
            Err(err) => {
                self.history.redos.push(entry);
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
