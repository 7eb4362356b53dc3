//! Import and export command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use vocab_core::{export_file_name, Category, Store};

use crate::output::{print_json, Output, OutputFormat};

/// Write a word list file
pub fn export(
    store: &Store,
    language: Option<String>,
    category: Option<Category>,
    path: Option<PathBuf>,
    include_notes: bool,
    output: &Output,
) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(export_file_name(language.as_deref())));

    let count = store
        .export_to_file(&path, language.as_deref(), category, include_notes)
        .with_context(|| format!("Failed to export to {:?}", path))?;

    match output.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "path": path,
            "exported": count,
            "notes": include_notes,
        })),
        OutputFormat::Quiet => println!("{}", path.display()),
        OutputFormat::Human => {
            println!("✓ Exported {} word(s) to {}", count, path.display());
        }
    }
    Ok(())
}

/// Merge a word list file into the store
pub fn import(store: &mut Store, path: PathBuf, output: &Output) -> Result<()> {
    let report = store.import_file(&path)?;
    output.print_merge_report(&report);
    Ok(())
}
