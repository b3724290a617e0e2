use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{EditorError, EditorResult};

pub const DEFAULT_CONFIG_NAME: &str = "weft.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of undo levels (0 = unlimited)
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    /// Repairs allowed per normalization run. When unset the cap scales
    /// with document size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_normalize_iterations: Option<usize>,

    /// Fail with an error instead of logging when normalization gives up
    #[serde(default)]
    pub strict: bool,

    /// Normalize at the end of every top-level transaction
    #[serde(default = "default_normalize")]
    pub normalize: bool,
}

fn default_history_depth() -> usize {
    100
}

fn default_normalize() -> bool {
    true
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults
    pub fn load(dir: impl AsRef<Path>) -> EditorResult<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            Self::from_file(&config_path)
        } else {
            Ok(EditorConfig::default())
        }
    }

    pub fn from_file(path: &Path) -> EditorResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EditorConfig = serde_json::from_str(&content)
            .map_err(|e| EditorError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Repair budget for a document with `node_count` nodes
    pub fn normalize_cap(&self, node_count: usize) -> usize {
        self.max_normalize_iterations
            .unwrap_or_else(|| (node_count * 42).max(100))
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: default_history_depth(),
            max_normalize_iterations: None,
            strict: false,
            normalize: default_normalize(),
        }
    }
}
