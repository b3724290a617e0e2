use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use weft_editor::Editor;

use crate::files;

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Document JSON file
    pub document: PathBuf,

    /// Schema JSON file
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only report whether the document needs repairs
    #[arg(long)]
    pub check: bool,
}

pub fn normalize(args: NormalizeArgs, cwd: &str) -> Result<()> {
    let config = files::load_config(cwd)?;
    let value = files::read_value(&files::resolve(cwd, &args.document))?;
    let schema_path = args.schema.as_ref().map(|path| files::resolve(cwd, path));
    let schema = files::read_schema(schema_path.as_deref())?;

    let mut editor = Editor::new(value).with_schema(schema).with_config(config);
    let repairs = editor.normalize()?;

    if args.check {
        if repairs > 0 {
            return Err(anyhow::anyhow!(
                "{} needs {} repairs",
                args.document.display(),
                repairs
            ));
        }
        println!("{} {} is normalized", "✓".green(), args.document.display());
        return Ok(());
    }

    let output = args.output.as_ref().map(|path| files::resolve(cwd, path));
    files::write_value(editor.value(), output.as_deref())?;

    eprintln!("{} {} repairs", "✓".green(), repairs);
    Ok(())
}
