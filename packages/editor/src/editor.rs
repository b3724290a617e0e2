//! # Editor
//!
//! Owns the current document snapshot and everything that changes it:
//! live references, the open transaction, normalization and history.
//!
//! ## Transactions
//!
//! ```text
//! command ─→ transact (depth 0 → 1)
//!              ├─ apply_op ─→ Operation::apply → refs.transform → batch
//!              ├─ ...nested commands flatten into the same batch
//!              ├─ normalize (repairs run at depth ≥ 1)
//!              └─ flush batch → History
//! ```
//!
//! There is no rollback. When a command fails part way, the document keeps
//! every operation that was applied before the failure and the partial batch
//! is still recorded so it can be undone. Refs created inside a failed
//! transaction are released.

use std::sync::Arc;
use tracing::{debug, trace};
use weft_model::{Location, Node, Operation, Path, Properties, Range, Value};

use crate::history::{History, HistoryEntry};
use crate::normalize;
use crate::refs::RefRegistry;
use crate::{EditorConfig, EditorResult, Schema};

/// Editable document with transaction, normalization and undo support
#[derive(Debug)]
pub struct Editor {
    pub(crate) value: Value,
    pub(crate) schema: Arc<Schema>,
    pub(crate) config: EditorConfig,
    pub(crate) refs: RefRegistry,
    pub(crate) history: History,

    /// Nesting depth of the open transaction (0 = none)
    depth: usize,

    /// Operations applied by the open transaction
    batch: Vec<Operation>,

    selection_before: Option<Range>,
    label: Option<String>,

    /// Record transactions in history
    saving: bool,

    /// Normalize when the outermost transaction ends
    normalizing: bool,

    /// Increments on every applied operation
    version: u64,
}

impl Editor {
    pub fn new(value: Value) -> Self {
        let config = EditorConfig::default();
        Self {
            value,
            schema: Arc::new(Schema::default()),
            history: History::with_max_levels(config.history_depth),
            config,
            refs: RefRegistry::new(),
            depth: 0,
            batch: Vec::new(),
            selection_before: None,
            label: None,
            saving: true,
            normalizing: true,
            version: 0,
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Arc::new(schema);
        self
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.history = History::with_max_levels(config.history_depth);
        self.config = config;
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn selection(&self) -> Option<&Range> {
        self.value.selection.as_ref()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn refs(&self) -> &RefRegistry {
        &self.refs
    }

    pub fn refs_mut(&mut self) -> &mut RefRegistry {
        &mut self.refs
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply a single operation as its own transaction
    pub fn apply(&mut self, op: Operation) -> EditorResult<()> {
        self.transact(op.name(), |editor| editor.apply_op(op))
    }

    /// Apply an operation inside the open transaction
    pub(crate) fn apply_op(&mut self, op: Operation) -> EditorResult<()> {
        let next = op.apply(&self.value)?;
        trace!(op = op.name(), path = ?op.path(), "apply");
        self.value = next;
        self.refs.transform(&op);
        self.batch.push(op);
        self.version += 1;
        Ok(())
    }

    /// Run `f` as one undoable unit. Nested calls join the outer transaction.
    pub(crate) fn transact<T, F>(&mut self, label: &str, f: F) -> EditorResult<T>
    where
        F: FnOnce(&mut Editor) -> EditorResult<T>,
    {
        let outermost = self.depth == 0;
        let watermark = self.refs.watermark();
        if outermost {
            self.selection_before = self.value.selection.clone();
            self.label = Some(label.to_string());
        }

        self.depth += 1;
        let mut result = f(self);
        if outermost && result.is_ok() && self.normalizing && self.config.normalize {
            if let Err(err) = normalize::run(self) {
                result = Err(err);
            }
        }
        self.depth -= 1;

        if outermost {
            if result.is_err() {
                let released = self.refs.release_since(watermark);
                if released > 0 {
                    debug!(label, released, "released refs of failed transaction");
                }
            }
            self.flush();
        }
        result
    }

    /// Run `f` with normalization deferred; nothing is normalized when it
    /// finishes
    pub fn without_normalizing<T, F>(&mut self, f: F) -> EditorResult<T>
    where
        F: FnOnce(&mut Editor) -> EditorResult<T>,
    {
        self.transact_unnormalized("without_normalizing", f)
    }

    fn transact_unnormalized<T, F>(&mut self, label: &str, f: F) -> EditorResult<T>
    where
        F: FnOnce(&mut Editor) -> EditorResult<T>,
    {
        let previous = std::mem::replace(&mut self.normalizing, false);
        let result = self.transact(label, f);
        self.normalizing = previous;
        result
    }

    /// Run `f` without recording its operations in history
    pub fn without_saving<T, F>(&mut self, f: F) -> EditorResult<T>
    where
        F: FnOnce(&mut Editor) -> EditorResult<T>,
    {
        let previous = std::mem::replace(&mut self.saving, false);
        let result = f(self);
        self.saving = previous;
        result
    }

    /// Repair the document until no violation is left. Returns the number of
    /// repairs made.
    pub fn normalize(&mut self) -> EditorResult<usize> {
        self.transact_unnormalized("normalize", normalize::run)
    }

    fn flush(&mut self) {
        let operations = std::mem::take(&mut self.batch);
        let selection_before = self.selection_before.take();
        let label = self.label.take();

        if !self.saving || operations.is_empty() {
            return;
        }

        debug!(label = ?label, operations = operations.len(), "transaction complete");
        match HistoryEntry::from_operations(operations) {
            Ok(entry) => {
                let entry = entry.with_selection_before(selection_before);
                let entry = match label {
                    Some(label) => entry.with_description(label),
                    None => entry,
                };
                self.history.record(entry);
            }
            Err(err) => debug!(error = %err, "transaction is not invertible, skipping history"),
        }
    }

    /// The selection as a command location
    pub(crate) fn selection_location(&self) -> Option<Location> {
        self.value.selection.clone().map(Location::Range)
    }

    pub(crate) fn insert_node_at(&mut self, path: &Path, node: Node) -> EditorResult<()> {
        self.apply_op(Operation::InsertNode {
            path: path.clone(),
            node,
        })
    }

    pub(crate) fn remove_node_at(&mut self, path: &Path) -> EditorResult<()> {
        let node = self.value.get(path)?.clone();
        self.apply_op(Operation::RemoveNode {
            path: path.clone(),
            node,
        })
    }

    /// Merge the node at `path` into its previous sibling
    pub(crate) fn merge_node_at(&mut self, path: &Path) -> EditorResult<()> {
        let previous = self.value.get(&path.previous()?)?;
        let position = previous.merge_length();
        let properties = Properties::of(self.value.get(path)?);
        self.apply_op(Operation::MergeNode {
            path: path.clone(),
            position,
            properties,
        })
    }

    pub(crate) fn split_node_at(&mut self, path: &Path, position: usize) -> EditorResult<()> {
        let properties = Properties::of(self.value.get(path)?);
        self.apply_op(Operation::SplitNode {
            path: path.clone(),
            position,
            properties,
        })
    }

    /// Split the node at `path` at `position`, then each ancestor right after
    /// the previous split, stopping once the node at depth `top` is split.
    /// Returns the path of the right half at depth `top`.
    pub(crate) fn split_up(
        &mut self,
        path: &Path,
        position: usize,
        top: usize,
    ) -> EditorResult<Option<Path>> {
        let mut path = path.clone();
        let mut position = position;
        let mut right = None;
        while !path.is_root() && path.len() >= top.max(1) {
            self.split_node_at(&path, position)?;
            right = Some(path.next()?);
            position = path[path.len() - 1] + 1;
            path = path.parent()?;
        }
        Ok(right)
    }

    pub(crate) fn set_selection(&mut self, selection: Option<Range>) -> EditorResult<()> {
        if self.value.selection == selection {
            return Ok(());
        }
        self.apply_op(Operation::SetSelection {
            properties: self.value.selection.clone(),
            new_properties: selection,
        })
    }
}
