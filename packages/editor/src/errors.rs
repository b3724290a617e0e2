//! Error types for the editor

use thiserror::Error;
use weft_model::{ModelError, Path};

use crate::normalize::ViolationCode;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Schema violation {code:?} at {path} still present after {iterations} repairs")]
    SchemaViolationUnrepaired {
        code: ViolationCode,
        path: Path,
        iterations: usize,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    pub fn invalid_location(message: impl Into<String>) -> Self {
        EditorError::InvalidLocation(message.into())
    }

    pub fn invalid_option(message: impl Into<String>) -> Self {
        EditorError::InvalidOption(message.into())
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
