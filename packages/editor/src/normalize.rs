//! # Normalization
//!
//! Keeps the document inside its invariants after every top-level
//! transaction.
//!
//! ## Design
//!
//! Normalization is an explicit loop:
//!
//! 1. Scan the document depth-first and stop at the first violation
//! 2. Repair it (a schema callback first, then the default repair)
//! 3. Restart the scan from the root
//!
//! The loop ends when a full scan finds nothing. It is capped so a repair
//! that keeps reintroducing a violation cannot spin forever; hitting the cap
//! is an error in strict mode and a warning otherwise.
//!
//! Rules are:
//! - **Ordered**: core structure rules run before schema rules, and the
//!   first failing rule of a node wins
//! - **Local**: a rule only looks at one node and its children
//! - **Repairable**: every violation code has a default repair

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use weft_model::{Mark, Node, NodeRef, Operation, Path, Properties, Text, Value};

use crate::{Editor, EditorError, EditorResult, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    RootChildNotBlock,
    ElementEmpty,
    VoidChildrenInvalid,
    ChildKindMixed,
    InlineNotSurrounded,
    AdjacentTexts,
    EmptyTextRedundant,
    ChildInvalid,
    FirstChildInvalid,
    LastChildInvalid,
    ChildMinInvalid,
    ChildMaxInvalid,
    ParentInvalid,
    NodeDataInvalid,
    NodeMarkInvalid,
}

/// A broken invariant at `path`
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub code: ViolationCode,

    /// The node whose rule failed
    pub path: Path,

    /// The offending child, or the slot to fill for insertions
    pub child: Option<Path>,

    /// Data key for `NodeDataInvalid`
    pub key: Option<String>,

    /// Mark for `NodeMarkInvalid`
    pub mark: Option<Mark>,
}

impl Violation {
    pub fn new(code: ViolationCode, path: Path) -> Self {
        Self {
            code,
            path,
            child: None,
            key: None,
            mark: None,
        }
    }

    pub fn at_child(code: ViolationCode, path: &Path, index: usize) -> Self {
        Self {
            child: Some(path.child(index)),
            ..Self::new(code, path.clone())
        }
    }
}

/// A structural rule checked at every node
pub trait Rule: std::fmt::Debug + Send + Sync {
    /// The first violation of this rule at `node`, if any
    fn validate(&self, path: &Path, node: NodeRef<'_>, value: &Value) -> Option<Violation>;
}

/// Children of the root are block elements
#[derive(Debug)]
pub struct RootChildrenAreBlocks;

impl Rule for RootChildrenAreBlocks {
    fn validate(&self, path: &Path, node: NodeRef<'_>, _value: &Value) -> Option<Violation> {
        let NodeRef::Value(value) = node else {
            return None;
        };
        let index = value.children.iter().position(|child| !child.is_block())?;
        Some(Violation::at_child(ViolationCode::RootChildNotBlock, path, index))
    }
}

/// Non-void elements have at least one child
#[derive(Debug)]
pub struct ElementsHaveChildren;

impl Rule for ElementsHaveChildren {
    fn validate(&self, path: &Path, node: NodeRef<'_>, _value: &Value) -> Option<Violation> {
        let element = node.as_element()?;
        if element.is_void || !element.children.is_empty() {
            return None;
        }
        Some(Violation::at_child(ViolationCode::ElementEmpty, path, 0))
    }
}

/// Voids hold exactly one empty text
#[derive(Debug)]
pub struct VoidsHoldOneEmptyText;

impl Rule for VoidsHoldOneEmptyText {
    fn validate(&self, path: &Path, node: NodeRef<'_>, _value: &Value) -> Option<Violation> {
        let element = node.as_element()?;
        if !element.is_void {
            return None;
        }
        match element.children.as_slice() {
            [Node::Text(text)] if text.is_empty() => None,
            _ => Some(Violation::new(ViolationCode::VoidChildrenInvalid, path.clone())),
        }
    }
}

/// Children are all blocks or all texts and inlines, decided by the first
/// child. Inline elements never hold blocks.
#[derive(Debug)]
pub struct ChildKindsAgree;

impl Rule for ChildKindsAgree {
    fn validate(&self, path: &Path, node: NodeRef<'_>, _value: &Value) -> Option<Violation> {
        let element = node.as_element()?;
        if element.is_void {
            return None;
        }
        let blocks = !element.is_inline && element.children.first().is_some_and(Node::is_block);
        let index = element
            .children
            .iter()
            .position(|child| child.is_block() != blocks)?;
        Some(Violation::at_child(ViolationCode::ChildKindMixed, path, index))
    }
}

/// Inline elements have a text on each side
#[derive(Debug)]
pub struct InlinesSurroundedByText;

impl Rule for InlinesSurroundedByText {
    fn validate(&self, path: &Path, node: NodeRef<'_>, _value: &Value) -> Option<Violation> {
        let element = node.as_element()?;
        if element.is_void || element.has_block_children() {
            return None;
        }
        let children = &element.children;
        for (index, child) in children.iter().enumerate() {
            if !child.is_inline() {
                continue;
            }
            let before = index.checked_sub(1).map(|i| &children[i]);
            if !before.is_some_and(Node::is_text) {
                return Some(Violation::at_child(
                    ViolationCode::InlineNotSurrounded,
                    path,
                    index,
                ));
            }
            if !children.get(index + 1).is_some_and(Node::is_text) {
                return Some(Violation::at_child(
                    ViolationCode::InlineNotSurrounded,
                    path,
                    index + 1,
                ));
            }
        }
        None
    }
}

/// Neighbouring texts with the same marks are one text
#[derive(Debug)]
pub struct AdjacentTextsMerged;

impl Rule for AdjacentTextsMerged {
    fn validate(&self, path: &Path, node: NodeRef<'_>, _value: &Value) -> Option<Violation> {
        let element = node.as_element()?;
        let index = element.children.windows(2).position(|pair| match pair {
            [Node::Text(left), Node::Text(right)] => left.same_marks(right),
            _ => false,
        })?;
        Some(Violation::at_child(
            ViolationCode::AdjacentTexts,
            path,
            index + 1,
        ))
    }
}

/// Empty texts only survive as an only child or next to an inline
#[derive(Debug)]
pub struct EmptyTextsRemoved;

impl Rule for EmptyTextsRemoved {
    fn validate(&self, path: &Path, node: NodeRef<'_>, _value: &Value) -> Option<Violation> {
        let element = node.as_element()?;
        let children = &element.children;
        if children.len() < 2 {
            return None;
        }
        let index = children.iter().enumerate().position(|(index, child)| {
            let Some(text) = child.as_text() else {
                return false;
            };
            if !text.is_empty() {
                return false;
            }
            let before = index.checked_sub(1).map(|i| &children[i]);
            let after = children.get(index + 1);
            let beside_inline = before.is_some_and(Node::is_inline) || after.is_some_and(Node::is_inline);
            !beside_inline
        })?;
        Some(Violation::at_child(
            ViolationCode::EmptyTextRedundant,
            path,
            index,
        ))
    }
}

/// Per-type constraints from a [`Schema`]
#[derive(Debug)]
pub struct SchemaRules(pub Arc<Schema>);

impl Rule for SchemaRules {
    fn validate(&self, path: &Path, node: NodeRef<'_>, value: &Value) -> Option<Violation> {
        let element = node.as_element()?;
        let rule = self.0.rule_for(&element.kind)?;
        let children = &element.children;

        for (key, validator) in &rule.data {
            if !validator(element.data.get(key)) {
                return Some(Violation {
                    key: Some(key.clone()),
                    ..Violation::new(ViolationCode::NodeDataInvalid, path.clone())
                });
            }
        }

        if let Some(allowed) = &rule.marks {
            let invalid = value
                .descendants_of(path)
                .ok()?
                .filter_map(|(_, node)| node.as_text())
                .flat_map(|text| text.marks.iter())
                .find(|mark| !allowed.contains(&mark.kind));
            if let Some(mark) = invalid {
                return Some(Violation {
                    mark: Some(mark.clone()),
                    ..Violation::new(ViolationCode::NodeMarkInvalid, path.clone())
                });
            }
        }

        if let (Some(first), Some(child)) = (&rule.first, children.first()) {
            if !first.matches(child.into()) {
                return Some(Violation::at_child(ViolationCode::FirstChildInvalid, path, 0));
            }
        }

        if let (Some(last), Some(child)) = (&rule.last, children.last()) {
            if !last.matches(child.into()) {
                return Some(Violation::at_child(
                    ViolationCode::LastChildInvalid,
                    path,
                    children.len() - 1,
                ));
            }
        }

        if let Some(allowed) = &rule.children {
            if let Some(index) = children.iter().position(|child| !allowed.matches(child.into())) {
                return Some(Violation::at_child(ViolationCode::ChildInvalid, path, index));
            }
        }

        if rule.min.is_some_and(|min| children.len() < min) {
            return Some(Violation::new(ViolationCode::ChildMinInvalid, path.clone()));
        }

        if let Some(max) = rule.max {
            if children.len() > max {
                return Some(Violation::at_child(ViolationCode::ChildMaxInvalid, path, max));
            }
        }

        if let Some(parent) = &rule.parent {
            let parent_node = value.parent(path).ok()?;
            if !parent.matches(parent_node) {
                return Some(Violation::new(ViolationCode::ParentInvalid, path.clone()));
            }
        }

        None
    }
}

/// Ordered rule set run over the whole document
#[derive(Debug)]
pub struct Normalizer {
    rules: Vec<Box<dyn Rule>>,
}

impl Normalizer {
    /// Core rules followed by the schema's rules
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            rules: vec![
                Box::new(RootChildrenAreBlocks),
                Box::new(ElementsHaveChildren),
                Box::new(VoidsHoldOneEmptyText),
                Box::new(ChildKindsAgree),
                Box::new(InlinesSurroundedByText),
                Box::new(AdjacentTextsMerged),
                Box::new(EmptyTextsRemoved),
                Box::new(SchemaRules(schema)),
            ],
        }
    }

    /// First violation in depth-first order
    pub fn first_violation(&self, value: &Value) -> Option<Violation> {
        let root = std::iter::once((Path::root(), NodeRef::Value(value)));
        let nodes = value
            .descendants()
            .map(|(path, node)| (path, NodeRef::from(node)));
        for (path, node) in root.chain(nodes) {
            for rule in &self.rules {
                if let Some(violation) = rule.validate(&path, node, value) {
                    return Some(violation);
                }
            }
        }
        None
    }
}

/// Repair until clean or the cap is reached. Returns the number of repairs.
pub(crate) fn run(editor: &mut Editor) -> EditorResult<usize> {
    let normalizer = Normalizer::new(Arc::clone(&editor.schema));
    let cap = editor.config.normalize_cap(editor.value.node_count());
    let mut repairs = 0;

    while let Some(violation) = normalizer.first_violation(&editor.value) {
        if repairs >= cap {
            return give_up(editor, &violation, repairs);
        }

        let version = editor.version();
        repair(editor, &violation)?;
        repairs += 1;

        if editor.version() == version {
            return give_up(editor, &violation, repairs);
        }
    }

    if repairs > 0 {
        debug!(repairs, "normalized");
    }
    Ok(repairs)
}

fn give_up(editor: &Editor, violation: &Violation, iterations: usize) -> EditorResult<usize> {
    if editor.config.strict {
        return Err(EditorError::SchemaViolationUnrepaired {
            code: violation.code,
            path: violation.path.clone(),
            iterations,
        });
    }
    warn!(
        code = ?violation.code,
        path = %violation.path,
        iterations,
        "normalization stopped with a violation left"
    );
    Ok(iterations)
}

fn repair(editor: &mut Editor, violation: &Violation) -> EditorResult<()> {
    let custom = editor
        .value
        .element(&violation.path)
        .ok()
        .and_then(|element| editor.schema.rule_for(&element.kind))
        .and_then(|rule| rule.normalize.clone());

    if let Some(custom) = custom {
        let handled = editor.transact("normalize", |editor| custom(editor, violation))?;
        if handled {
            return Ok(());
        }
    }

    editor.transact("normalize", |editor| default_repair(editor, violation))
}

fn default_repair(editor: &mut Editor, violation: &Violation) -> EditorResult<()> {
    let path = &violation.path;
    let child = || {
        violation
            .child
            .clone()
            .ok_or_else(|| EditorError::invalid_location(format!("{:?} has no child", violation.code)))
    };

    match violation.code {
        ViolationCode::RootChildNotBlock
        | ViolationCode::ChildKindMixed
        | ViolationCode::EmptyTextRedundant => editor.remove_node_at(&child()?),

        ViolationCode::ElementEmpty | ViolationCode::InlineNotSurrounded => {
            editor.insert_node_at(&child()?, Node::Text(Text::new("")))
        }

        ViolationCode::VoidChildrenInvalid => {
            let count = editor.value.children_at(path)?.len();
            for index in (0..count).rev() {
                editor.remove_node_at(&path.child(index))?;
            }
            editor.insert_node_at(&path.child(0), Node::Text(Text::new("")))
        }

        ViolationCode::AdjacentTexts => editor.merge_node_at(&child()?),

        ViolationCode::ChildInvalid
        | ViolationCode::FirstChildInvalid
        | ViolationCode::LastChildInvalid
        | ViolationCode::ChildMaxInvalid => {
            let child = child()?;
            let parent = editor.value.element(path)?;
            let lone_text = editor.value.get(&child)?.is_text()
                && parent.is_block()
                && parent.children.len() == 1;
            if lone_text {
                editor.remove_node_at(path)
            } else {
                editor.remove_node_at(&child)
            }
        }

        ViolationCode::ChildMinInvalid | ViolationCode::ParentInvalid => editor.remove_node_at(path),

        ViolationCode::NodeDataInvalid => {
            let Some(key) = &violation.key else {
                return editor.remove_node_at(path);
            };
            let current = editor.value.element(path)?.data.clone();
            if !current.contains_key(key) {
                return editor.remove_node_at(path);
            }
            let mut data = current.clone();
            data.remove(key);
            editor.apply_op(Operation::SetNode {
                path: path.clone(),
                properties: Properties {
                    data: Some(current),
                    ..Properties::default()
                },
                new_properties: Properties {
                    data: Some(data),
                    ..Properties::default()
                },
            })
        }

        ViolationCode::NodeMarkInvalid => {
            let Some(mark) = &violation.mark else {
                return Ok(());
            };
            let marked: Vec<Path> = editor
                .value
                .descendants_of(path)?
                .filter(|(_, node)| node.as_text().is_some_and(|text| text.has_mark(mark)))
                .map(|(path, _)| path)
                .collect();
            for text in marked {
                editor.apply_op(Operation::RemoveMark {
                    path: text,
                    mark: mark.clone(),
                })?;
            }
            Ok(())
        }
    }
}
