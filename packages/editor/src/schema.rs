//! # Schema
//!
//! Per-element-type rules checked by normalization, plus the annotation
//! types that behave atomically.
//!
//! Rules can be built in code, including data validators and custom repair
//! callbacks, or loaded from JSON through [`SchemaDefinition`] for the
//! declarative subset.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use weft_model::{NodeObject, NodeRef};

use crate::normalize::Violation;
use crate::{Editor, EditorResult};

/// Validates one data value; `None` means the key is missing
pub type DataValidator = Arc<dyn Fn(Option<&JsonValue>) -> bool + Send + Sync>;

/// Custom repair. Returning `Ok(false)` falls back to the default repair.
pub type RepairFn = Arc<dyn Fn(&mut Editor, &Violation) -> EditorResult<bool> + Send + Sync>;

/// Matches nodes by object and element type. Empty lists match anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMatch {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<NodeObject>,

    #[serde(default, rename = "types", skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<String>,
}

impl NodeMatch {
    pub fn object(object: NodeObject) -> Self {
        Self {
            objects: vec![object],
            kinds: Vec::new(),
        }
    }

    pub fn kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            objects: Vec::new(),
            kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        let object_ok = self.objects.is_empty() || self.objects.contains(&node.object());
        let kind_ok = self.kinds.is_empty()
            || node
                .kind()
                .is_some_and(|kind| self.kinds.iter().any(|k| k == kind));
        object_ok && kind_ok
    }
}

/// Constraints on one element type
#[derive(Clone, Default)]
pub struct ElementRule {
    /// Every child must match
    pub children: Option<NodeMatch>,
    pub first: Option<NodeMatch>,
    pub last: Option<NodeMatch>,
    pub parent: Option<NodeMatch>,
    pub min: Option<usize>,
    pub max: Option<usize>,

    /// Allowed mark types on descendant texts
    pub marks: Option<Vec<String>>,

    pub data: BTreeMap<String, DataValidator>,
    pub normalize: Option<RepairFn>,
}

impl ElementRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(mut self, matcher: NodeMatch) -> Self {
        self.children = Some(matcher);
        self
    }

    pub fn first(mut self, matcher: NodeMatch) -> Self {
        self.first = Some(matcher);
        self
    }

    pub fn last(mut self, matcher: NodeMatch) -> Self {
        self.last = Some(matcher);
        self
    }

    pub fn parent(mut self, matcher: NodeMatch) -> Self {
        self.parent = Some(matcher);
        self
    }

    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn marks<I, S>(mut self, marks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.marks = Some(marks.into_iter().map(Into::into).collect());
        self
    }

    pub fn data<F>(mut self, key: impl Into<String>, validator: F) -> Self
    where
        F: Fn(Option<&JsonValue>) -> bool + Send + Sync + 'static,
    {
        self.data.insert(key.into(), Arc::new(validator));
        self
    }

    pub fn normalize<F>(mut self, repair: F) -> Self
    where
        F: Fn(&mut Editor, &Violation) -> EditorResult<bool> + Send + Sync + 'static,
    {
        self.normalize = Some(Arc::new(repair));
        self
    }
}

impl fmt::Debug for ElementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRule")
            .field("children", &self.children)
            .field("first", &self.first)
            .field("last", &self.last)
            .field("parent", &self.parent)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("marks", &self.marks)
            .field("data", &self.data.keys().collect::<Vec<_>>())
            .field("normalize", &self.normalize.is_some())
            .finish()
    }
}

/// Rules keyed by element type
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: BTreeMap<String, ElementRule>,
    atomic: BTreeSet<String>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, kind: impl Into<String>, rule: ElementRule) -> Self {
        self.rules.insert(kind.into(), rule);
        self
    }

    /// Annotations of this type are removed when text is typed inside them
    pub fn atomic_annotation(mut self, kind: impl Into<String>) -> Self {
        self.atomic.insert(kind.into());
        self
    }

    pub fn rule_for(&self, kind: &str) -> Option<&ElementRule> {
        self.rules.get(kind)
    }

    pub fn is_atomic(&self, annotation_kind: &str) -> bool {
        self.atomic.contains(annotation_kind)
    }

    pub fn from_json(json: &str) -> EditorResult<Self> {
        let definition: SchemaDefinition = serde_json::from_str(json)?;
        Ok(definition.into())
    }

    pub fn from_file(path: &std::path::Path) -> EditorResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Serializable form of a schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    #[serde(default)]
    pub elements: BTreeMap<String, RuleDefinition>,

    #[serde(default)]
    pub atomic_annotations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<NodeMatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<NodeMatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<NodeMatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeMatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, DataConstraint>,
}

/// Declarative data validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum DataConstraint {
    Required,
    OneOf { values: Vec<JsonValue> },
    Equals { value: JsonValue },
}

impl DataConstraint {
    pub fn validator(self) -> DataValidator {
        match self {
            DataConstraint::Required => Arc::new(|value| value.is_some()),
            DataConstraint::OneOf { values } => {
                Arc::new(move |value| value.is_some_and(|value| values.contains(value)))
            }
            DataConstraint::Equals { value: expected } => {
                Arc::new(move |value| value == Some(&expected))
            }
        }
    }
}

impl From<RuleDefinition> for ElementRule {
    fn from(definition: RuleDefinition) -> Self {
        ElementRule {
            children: definition.children,
            first: definition.first,
            last: definition.last,
            parent: definition.parent,
            min: definition.min,
            max: definition.max,
            marks: definition.marks,
            data: definition
                .data
                .into_iter()
                .map(|(key, constraint)| (key, constraint.validator()))
                .collect(),
            normalize: None,
        }
    }
}

impl From<SchemaDefinition> for Schema {
    fn from(definition: SchemaDefinition) -> Self {
        Schema {
            rules: definition
                .elements
                .into_iter()
                .map(|(kind, rule)| (kind, rule.into()))
                .collect(),
            atomic: definition.atomic_annotations.into_iter().collect(),
        }
    }
}
