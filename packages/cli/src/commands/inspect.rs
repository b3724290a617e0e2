use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use weft_editor::Normalizer;
use weft_model::{Node, Value};

use crate::files;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Document JSON file
    pub document: PathBuf,

    /// Schema JSON file used to report the first violation
    #[arg(short, long)]
    pub schema: Option<PathBuf>,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let value = files::read_value(&files::resolve(cwd, &args.document))?;
    let schema_path = args.schema.as_ref().map(|path| files::resolve(cwd, path));
    let schema = files::read_schema(schema_path.as_deref())?;

    for line in outline(&value) {
        println!("{}", line);
    }

    if let Some(selection) = &value.selection {
        println!();
        println!(
            "{} {}:{} → {}:{}",
            "selection".cyan(),
            selection.anchor.path,
            selection.anchor.offset,
            selection.focus.path,
            selection.focus.offset
        );
    }
    for (key, annotation) in &value.annotations {
        println!(
            "{} {} ({}) {}:{} → {}:{}",
            "annotation".cyan(),
            key,
            annotation.kind,
            annotation.anchor.path,
            annotation.anchor.offset,
            annotation.focus.path,
            annotation.focus.offset
        );
    }

    println!();
    match Normalizer::new(Arc::new(schema)).first_violation(&value) {
        Some(violation) => println!(
            "{} {:?} at {}",
            "✗".red(),
            violation.code,
            violation.path
        ),
        None => println!("{} normalized", "✓".green()),
    }
    Ok(())
}

/// One line per node, indented by depth
fn outline(value: &Value) -> Vec<String> {
    value
        .descendants()
        .map(|(path, node)| {
            let indent = "  ".repeat(path.len() - 1);
            format!("{}{} {}", indent, path.to_string().dimmed(), describe(node))
        })
        .collect()
}

fn describe(node: &Node) -> String {
    match node {
        Node::Text(text) => {
            let marks: Vec<&str> = text.marks.iter().map(|mark| mark.kind.as_str()).collect();
            if marks.is_empty() {
                format!("{:?}", text.text)
            } else {
                format!("{:?} [{}]", text.text, marks.join(", "))
            }
        }
        Node::Element(element) => {
            let mut flags = Vec::new();
            if element.is_inline {
                flags.push("inline");
            }
            if element.is_void {
                flags.push("void");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" ({})", flags.join(", "))
            };
            format!("{}{}", element.kind.bold(), flags)
        }
    }
}
