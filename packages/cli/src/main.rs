mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    export, import, init, notebook, replace, stats, ExportArgs, ImportArgs, InitArgs,
    NotebookArgs, ReplaceArgs, StatsArgs,
};
use tracing_subscriber::EnvFilter;

/// Inkpad CLI - rich-text notebooks from the terminal
#[derive(Parser, Debug)]
#[command(name = "inkpad")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and a starter notebook
    Init(InitArgs),

    /// Manage notebooks, sections and notes
    Notebook(NotebookArgs),

    /// Import a .txt or .md file as a new note
    Import(ImportArgs),

    /// Print word, character and table counts for a note
    Stats(StatsArgs),

    /// Export a note as txt, md or html
    Export(ExportArgs),

    /// Find and replace text in a note
    Replace(ReplaceArgs),
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Notebook(args) => notebook(args, &cwd),
            Command::Import(args) => import(args, &cwd),
            Command::Stats(args) => stats(args, &cwd),
            Command::Export(args) => export(args, &cwd),
            Command::Replace(args) => replace(args, &cwd),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
