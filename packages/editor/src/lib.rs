//! # Weft Editor
//!
//! Editing engine on top of `weft-model`: commands, live references,
//! schema-driven normalization and undo/redo.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ commands: insert/delete text, split, merge, │
//! │ wrap, marks, selection, annotations         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: transactions over weft-model ops    │
//! │  - refs follow every applied operation      │
//! │  - normalize to a fixed point at the end    │
//! │  - one history entry per outer transaction  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ history: undo applies inverses in reverse   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Operations are the only mutation**: commands compose them, history
//!    inverts them
//! 2. **The document is always normalized** once a command returns
//! 3. **Positions survive edits** through path, point and range refs
//!
//! ## Usage
//!
//! ```rust
//! use weft_editor::{Editor, Unit};
//! use weft_model::{Node, Point, Value};
//!
//! let value = Value::new([Node::element("paragraph", [Node::text("word")])]);
//! let mut editor = Editor::new(value);
//!
//! editor.select(Point::new([0, 0], 4)).unwrap();
//! editor.delete_backward(Unit::Character).unwrap();
//! assert_eq!(editor.value().string(), "wor");
//!
//! editor.undo().unwrap();
//! assert_eq!(editor.value().string(), "word");
//! ```

mod commands;
mod config;
mod editor;
mod errors;
mod history;
mod normalize;
mod refs;
mod schema;

pub use commands::{DeleteOptions, NodePatch, SplitHeight, Target};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use editor::Editor;
pub use errors::{EditorError, EditorResult};
pub use history::{History, HistoryEntry};
pub use normalize::{
    AdjacentTextsMerged, ChildKindsAgree, ElementsHaveChildren, EmptyTextsRemoved,
    InlinesSurroundedByText, Normalizer, RootChildrenAreBlocks, Rule, SchemaRules, Violation,
    ViolationCode, VoidsHoldOneEmptyText,
};
pub use refs::{PathRef, PointRef, RangeRef, RefRegistry};
pub use schema::{
    DataConstraint, DataValidator, ElementRule, NodeMatch, RepairFn, RuleDefinition, Schema,
    SchemaDefinition,
};

// Re-export common types for convenience
pub use weft_model::{Edge, Location, Unit};
