//! Status, category and language listings

use anyhow::Result;
use chrono::Utc;

use vocab_core::{Category, Store};

use crate::output::{Output, OutputFormat};

/// Show storage and review status
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let stats = store.stats(Utc::now())?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "backend": store.backend_name(),
                    "location": store.location(),
                    "size": store.size_bytes(),
                    "scoring": store.scoring().to_string(),
                    "counts": stats,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", stats.due);
        }
        OutputFormat::Human => {
            println!("Vocab Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Backend:  {}", store.backend_name());
            println!("  Location: {}", store.location());
            if let Some(size) = store.size_bytes() {
                println!("  Size:     {}", format_size(size));
            }
            println!("  Scoring:  {}", store.scoring());
            println!();
            println!("Contents:");
            println!("  Words:        {}", stats.total);
            println!("  Never tested: {}", stats.never_tested);
            println!("  Due now:      {}", stats.due);
            if !stats.languages.is_empty() {
                println!();
                println!("Languages:");
                for language in &stats.languages {
                    println!(
                        "  {:<12} {} word(s), {} due",
                        language.language, language.entries, language.due
                    );
                }
            }
        }
    }

    Ok(())
}

/// List every category
pub fn categories(output: &Output) -> Result<()> {
    output.print_categories(&Category::ALL);
    Ok(())
}

/// List the languages present in the store
pub fn languages(store: &Store, output: &Output) -> Result<()> {
    let stats = store.stats(Utc::now())?;
    let languages: Vec<(String, usize)> = stats
        .languages
        .into_iter()
        .map(|l| (l.language, l.entries))
        .collect();

    output.print_languages(&languages);
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
