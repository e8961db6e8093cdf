use super::{open_store, save_store};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use inkpad_parser::ImportSource;
use inkpad_workspace::WorkspaceSession;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Text or markdown file to import
    pub file: PathBuf,

    /// Section that receives the new note
    #[arg(short, long)]
    pub section: String,

    /// Media type to report (defaults to the file extension)
    #[arg(long)]
    pub media_type: Option<String>,
}

pub fn import(args: ImportArgs, cwd: &Path) -> Result<()> {
    let (config, store, path) = open_store(cwd)?;

    let bytes = fs::read(cwd.join(&args.file))
        .with_context(|| format!("Cannot read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let source = ImportSource::new(file_name, args.media_type, bytes);

    let mut session = WorkspaceSession::new(store, config.workspace);
    let id = session.import_file(&args.section, &source)?;
    save_store(&session.store(), &path)?;

    println!(
        "  {} {} → note {}",
        "✓".green(),
        args.file.display(),
        id.cyan()
    );
    Ok(())
}
