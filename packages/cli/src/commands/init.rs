use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use inkpad_common::RealFileSystem;
use inkpad_workspace::NotebookStore;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Notebook store file
    #[arg(short, long, default_value = "notebooks.json")]
    pub store_file: String,

    /// Title of the first notebook
    #[arg(short, long)]
    pub title: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing notebook...".bright_blue().bold());

    let config = Config {
        store_file: args.store_file,
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    // Seed the store with one notebook, section and note
    let store_path = config.store_path(cwd);
    if !store_path.exists() {
        let mut store = NotebookStore::new();
        let notebook = store.add_notebook(args.title.as_deref());
        let section = store.add_section(&notebook, None)?;
        store.new_note(&section)?;
        store.save(&mut RealFileSystem, &store_path)?;
        println!("  {} Created {}", "✓".green(), config.store_file);
    }

    println!();
    println!("{}", "✅ Notebook ready!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: inkpad notebook list");
    println!("  2. Run: inkpad import notes.txt --section <section-id>");

    Ok(())
}
