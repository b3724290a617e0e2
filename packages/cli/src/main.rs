mod commands;
mod files;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, init, inspect, normalize, ApplyArgs, InitArgs, InspectArgs, NormalizeArgs,
};

/// Weft CLI - apply, normalize and inspect structured documents
#[derive(Parser, Debug)]
#[command(name = "weft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor internals to stderr
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a weft.config.json with default settings
    Init(InitArgs),

    /// Apply a list of operations to a document
    Apply(ApplyArgs),

    /// Repair a document against the core rules and a schema
    Normalize(NormalizeArgs),

    /// Print the document tree with paths
    Inspect(InspectArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Apply(args) => apply(args, &cwd),
                Command::Normalize(args) => normalize(args, &cwd),
                Command::Inspect(args) => inspect(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
