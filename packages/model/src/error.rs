//! Error types for the document model

use crate::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Path {path} does not resolve to a node")]
    OutOfRange { path: Path },

    #[error("Offset {offset} is out of range for the text at {path} (length {len})")]
    OffsetOutOfRange { path: Path, offset: usize, len: usize },

    #[error("Cannot merge the node at {path}: {reason}")]
    InvalidMerge { path: Path, reason: String },

    #[error("Cannot move the node at {path} to {new_path}")]
    InvalidMove { path: Path, new_path: Path },

    #[error("Path {path} has no parent")]
    NoParent { path: Path },

    #[error("Node at {path} is not a text leaf")]
    NotText { path: Path },

    #[error("Node at {path} is not an element")]
    NotElement { path: Path },

    #[error("Node at {path} does not match the node recorded in the operation")]
    NodeMismatch { path: Path },

    #[error("Text at {path} offset {offset} is {actual:?}, expected {expected:?}")]
    TextMismatch {
        path: Path,
        offset: usize,
        expected: String,
        actual: String,
    },

    #[error("Properties recorded for {path} do not match the node")]
    PropertiesMismatch { path: Path },

    #[error("Annotation already exists: {0}")]
    AnnotationExists(String),

    #[error("Annotation not found: {0}")]
    AnnotationMissing(String),
}

impl ModelError {
    pub fn out_of_range(path: &Path) -> Self {
        ModelError::OutOfRange { path: path.clone() }
    }

    pub fn invalid_merge(path: &Path, reason: impl Into<String>) -> Self {
        ModelError::InvalidMerge {
            path: path.clone(),
            reason: reason.into(),
        }
    }

    pub fn not_text(path: &Path) -> Self {
        ModelError::NotText { path: path.clone() }
    }

    pub fn not_element(path: &Path) -> Self {
        ModelError::NotElement { path: path.clone() }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
