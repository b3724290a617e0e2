//! Reading and writing the JSON files the commands work on

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use weft_editor::{EditorConfig, Schema};
use weft_model::{Operation, Value};

/// Resolve `path` against the working directory
pub fn resolve(cwd: &str, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        PathBuf::from(cwd).join(path)
    }
}

pub fn read_value(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid document {}", path.display()))
}

pub fn read_operations(path: &Path) -> Result<Vec<Operation>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid operation list {}", path.display()))
}

/// The schema at `path`, or an empty schema
pub fn read_schema(path: Option<&Path>) -> Result<Schema> {
    match path {
        Some(path) => Schema::from_file(path)
            .with_context(|| format!("Invalid schema {}", path.display())),
        None => Ok(Schema::new()),
    }
}

pub fn load_config(cwd: &str) -> Result<EditorConfig> {
    Ok(EditorConfig::load(cwd)?)
}

/// Write the document to `output`, or to stdout when no file is given
pub fn write_value(value: &Value, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json).with_context(|| format!("Cannot write {}", path.display()))
        }
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}
