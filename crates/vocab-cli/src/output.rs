//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use chrono::{DateTime, Utc};
use serde::Serialize;

use vocab_core::schedule::{days_until_due, is_due};
use vocab_core::{notes_to_text, Category, Entry, MergeReport};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single entry with its notes
    pub fn print_entry(&self, entry: &Entry, now: DateTime<Utc>) {
        match self.format {
            OutputFormat::Human => {
                println!("Word:        {}", entry.english_word);
                println!("Language:    {}", entry.learning_language);
                println!("Translation: {}", entry.single_translation);
                println!("Category:    {}", entry.category);
                println!("Points:      {}", entry.points);
                println!("Last tested: {}", format_last_tested(entry.last_tested));
                println!("Due:         {}", due_label(entry, now));

                let notes = notes_to_text(&entry.long_translation);
                if !notes.is_empty() {
                    println!();
                    println!("── Notes ──");
                    println!("{}", notes);
                }
            }
            OutputFormat::Json => print_json(entry),
            OutputFormat::Quiet => {
                println!("{}", entry.single_translation);
            }
        }
    }

    /// Print a table of entries
    pub fn print_entries(&self, entries: &[Entry], now: DateTime<Utc>) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No words found.");
                    return;
                }
                for entry in entries {
                    println!(
                        "{:<20} | {:<20} | {:<10} | {:<10} | {:>3} | {}",
                        truncate(&entry.english_word, 20),
                        truncate(&entry.single_translation, 20),
                        truncate(&entry.learning_language, 10),
                        entry.category,
                        entry.points,
                        due_label(entry, now)
                    );
                }
                println!("\n{} word(s)", entries.len());
            }
            OutputFormat::Json => print_json(&entries),
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.english_word);
                }
            }
        }
    }

    pub fn print_categories(&self, categories: &[Category]) {
        match self.format {
            OutputFormat::Json => print_json(&categories),
            _ => {
                for category in categories {
                    println!("{}", category);
                }
            }
        }
    }

    /// Print languages with their entry counts
    pub fn print_languages(&self, languages: &[(String, usize)]) {
        match self.format {
            OutputFormat::Human => {
                if languages.is_empty() {
                    println!("No languages yet. Add a word with `vocab add`.");
                    return;
                }
                for (name, count) in languages {
                    println!("{} ({})", name, count);
                }
            }
            OutputFormat::Json => {
                let json: Vec<_> = languages
                    .iter()
                    .map(|(name, count)| serde_json::json!({"language": name, "entries": count}))
                    .collect();
                print_json(&json);
            }
            OutputFormat::Quiet => {
                for (name, _) in languages {
                    println!("{}", name);
                }
            }
        }
    }

    pub fn print_merge_report(&self, report: &MergeReport) {
        match self.format {
            OutputFormat::Human => {
                println!("✓ Import complete");
                println!("  Added:     {}", report.added);
                println!("  Updated:   {}", report.updated);
                println!("  Unchanged: {}", report.unchanged);
                if report.duplicates_removed > 0 {
                    println!("  Duplicates merged: {}", report.duplicates_removed);
                }
            }
            OutputFormat::Json => print_json(report),
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

fn format_last_tested(last_tested: Option<DateTime<Utc>>) -> String {
    last_tested
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string())
}

/// "due" or "in N day(s)"
pub fn due_label(entry: &Entry, now: DateTime<Utc>) -> String {
    if is_due(entry, now) {
        "due".to_string()
    } else {
        format!("in {} day(s)", days_until_due(entry, now))
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
