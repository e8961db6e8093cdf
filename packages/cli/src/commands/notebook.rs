use super::{open_store, save_store};
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use inkpad_editor::stats;
use std::path::Path;

#[derive(Debug, Args)]
pub struct NotebookArgs {
    #[command(subcommand)]
    pub command: NotebookCommand,
}

#[derive(Debug, Subcommand)]
pub enum NotebookCommand {
    /// Create a notebook
    Create {
        /// Notebook title (defaults to "Untitled Notebook")
        title: Option<String>,
    },

    /// Add a section to a notebook
    AddSection {
        /// Notebook id
        notebook: String,

        /// Section title
        title: Option<String>,
    },

    /// Add an empty note to a section
    NewNote {
        /// Section id
        section: String,
    },

    /// Show every notebook, section and note
    List,
}

pub fn notebook(args: NotebookArgs, cwd: &Path) -> Result<()> {
    let (_, mut store, path) = open_store(cwd)?;

    match args.command {
        NotebookCommand::Create { title } => {
            let id = store.add_notebook(title.as_deref());
            save_store(&store, &path)?;
            println!("  {} Created notebook {}", "✓".green(), id.cyan());
        }
        NotebookCommand::AddSection { notebook, title } => {
            let id = store.add_section(&notebook, title.as_deref())?;
            save_store(&store, &path)?;
            println!("  {} Created section {}", "✓".green(), id.cyan());
        }
        NotebookCommand::NewNote { section } => {
            let id = store.new_note(&section)?;
            save_store(&store, &path)?;
            println!("  {} Created note {}", "✓".green(), id.cyan());
        }
        NotebookCommand::List => {
            if store.notebooks.is_empty() {
                println!("{}", "⚠️  No notebooks yet".yellow());
                return Ok(());
            }
            for notebook in &store.notebooks {
                println!("{} {}", notebook.title.bold(), notebook.id.dimmed());
                for section in &notebook.sections {
                    println!("  {} {}", section.title.bright_blue(), section.id.dimmed());
                    for note in &section.notes {
                        let words = stats(&note.content).word_count;
                        println!(
                            "    {} {} ({} words)",
                            note.title,
                            note.id.dimmed(),
                            words
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
