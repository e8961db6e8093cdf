use super::{open_store, resolve_note, save_store};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use inkpad_editor::{Document, ExportFormat, Mutation};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Note id (or a unique prefix)
    pub note: String,

    /// Print the stats as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn stats(args: StatsArgs, cwd: &Path) -> Result<()> {
    let (_, store, _) = open_store(cwd)?;
    let note = resolve_note(&store, &args.note)?;
    let stats = inkpad_editor::stats(&note.content);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", note.title.bold());
    println!("  Words:        {}", stats.word_count.to_string().cyan());
    println!("  Characters:   {}", stats.character_count.to_string().cyan());
    println!("  Reading time: {} min", stats.reading_time.to_string().cyan());
    println!("  Tables:       {}", stats.table_count.to_string().cyan());
    Ok(())
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Note id (or a unique prefix)
    pub note: String,

    /// Export format (txt, md, html)
    #[arg(short, long, default_value = "txt")]
    pub format: ExportFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn export(args: ExportArgs, cwd: &Path) -> Result<()> {
    let (_, store, _) = open_store(cwd)?;
    let note = resolve_note(&store, &args.note)?;
    let output = inkpad_editor::export(&note.content, args.format);

    match args.out {
        Some(out) => {
            fs::write(cwd.join(&out), &output)?;
            println!(
                "  {} {} → {}",
                "✓".green(),
                note.title,
                out.display()
            );
        }
        None => println!("{output}"),
    }
    Ok(())
}

#[derive(Debug, Args)]
pub struct ReplaceArgs {
    /// Note id (or a unique prefix)
    pub note: String,

    /// Text to find (case-insensitive)
    pub search: String,

    /// Replacement text
    pub replacement: String,

    /// Report matches without changing the note
    #[arg(long)]
    pub dry_run: bool,
}

pub fn replace(args: ReplaceArgs, cwd: &Path) -> Result<()> {
    let (_, mut store, path) = open_store(cwd)?;
    let note = resolve_note(&store, &args.note)?;
    let (id, mut document) = (note.id.clone(), Document::new(note.content.clone()));

    if args.dry_run {
        let found = document.count_matches(&args.search)?;
        println!("{} match(es) for {}", found, args.search.cyan());
        return Ok(());
    }

    let mutation = Mutation::FindAndReplace {
        search: args.search.clone(),
        replacement: args.replacement,
    };
    let result = document.apply(&mutation, None)?;
    if result.changed {
        store.update_note_content(&id, document.into_tree())?;
        save_store(&store, &path)?;
    }

    println!(
        "  {} Replaced {} occurrence(s) of {}",
        "✓".green(),
        result.replacements,
        args.search.cyan()
    );
    Ok(())
}
