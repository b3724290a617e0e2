//! Keyed annotations over document ranges

use tracing::instrument;
use weft_model::{Annotation, ModelError, Operation};

use crate::{Editor, EditorError, EditorResult};

impl Editor {
    #[instrument(skip(self, annotation), fields(kind = %annotation.kind))]
    pub fn add_annotation(&mut self, key: &str, annotation: Annotation) -> EditorResult<()> {
        if !self.value.is_valid_range(&annotation.range()) {
            return Err(EditorError::invalid_location(format!(
                "annotation {} points outside the document",
                key
            )));
        }
        self.transact("add_annotation", |editor| {
            editor.apply_op(Operation::AddAnnotation {
                key: key.to_string(),
                annotation,
            })
        })
    }

    #[instrument(skip(self))]
    pub fn remove_annotation(&mut self, key: &str) -> EditorResult<()> {
        let annotation = self.existing_annotation(key)?;
        self.transact("remove_annotation", |editor| {
            editor.apply_op(Operation::RemoveAnnotation {
                key: key.to_string(),
                annotation,
            })
        })
    }

    /// Replace the annotation stored under `key`
    #[instrument(skip(self, annotation), fields(kind = %annotation.kind))]
    pub fn set_annotation(&mut self, key: &str, annotation: Annotation) -> EditorResult<()> {
        let properties = self.existing_annotation(key)?;
        if properties == annotation {
            return Ok(());
        }
        self.transact("set_annotation", |editor| {
            editor.apply_op(Operation::SetAnnotation {
                key: key.to_string(),
                properties,
                new_properties: annotation,
            })
        })
    }

    fn existing_annotation(&self, key: &str) -> EditorResult<Annotation> {
        self.value
            .annotations
            .get(key)
            .cloned()
            .ok_or_else(|| ModelError::AnnotationMissing(key.to_string()).into())
    }
}
