use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;
use weft_editor::Editor;

use crate::files;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Document JSON file
    pub document: PathBuf,

    /// JSON array of operations to apply in order
    pub operations: PathBuf,

    /// Schema JSON file
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Undo this many entries after applying
    #[arg(long, default_value_t = 0)]
    pub undo: usize,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = files::load_config(cwd)?;
    let value = files::read_value(&files::resolve(cwd, &args.document))?;
    let operations = files::read_operations(&files::resolve(cwd, &args.operations))?;
    let schema_path = args.schema.as_ref().map(|path| files::resolve(cwd, path));
    let schema = files::read_schema(schema_path.as_deref())?;

    let mut editor = Editor::new(value).with_schema(schema).with_config(config);
    let count = operations.len();

    for (index, op) in operations.into_iter().enumerate() {
        debug!(index, op = op.name(), "applying");
        let name = op.name();
        editor
            .apply(op)
            .with_context(|| format!("Operation #{} ({}) failed", index, name))?;
    }

    let mut undone = 0;
    for _ in 0..args.undo {
        if !editor.undo()? {
            break;
        }
        undone += 1;
    }

    let output = args.output.as_ref().map(|path| files::resolve(cwd, path));
    files::write_value(editor.value(), output.as_deref())?;

    eprintln!(
        "{} Applied {} operations ({} undone)",
        "✓".green(),
        count,
        undone
    );
    Ok(())
}
