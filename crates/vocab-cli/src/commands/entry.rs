//! Word command handlers

use std::cmp::Ordering;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::ValueEnum;

use vocab_core::{Category, Entry, EntryEdit, EntryKey, Store, StoreError};

use crate::editor::{confirm, edit_text};
use crate::output::Output;

/// Column to sort the word list by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    #[default]
    Word,
    Translation,
    Category,
    Language,
    Points,
    LastTested,
}

/// Add a new word
pub fn add(store: &mut Store, new_entry: Entry, output: &Output) -> Result<()> {
    match store.save(new_entry) {
        Ok(entry) => {
            output.success(&format!(
                "Added {} = {} ({})",
                entry.english_word, entry.single_translation, entry.learning_language
            ));
            Ok(())
        }
        Err(e @ StoreError::AlreadyExists { .. }) => Err(e.into()),
        Err(e) => Err(e).context("Failed to add word"),
    }
}

/// List words, filtered and sorted
pub fn list(
    store: &Store,
    language: Option<String>,
    category: Option<Category>,
    sort: SortKey,
    descending: bool,
    output: &Output,
) -> Result<()> {
    let mut entries = match language {
        Some(ref l) => store.get_all(l)?,
        None => store.entries()?,
    };
    if let Some(category) = category {
        entries.retain(|e| e.category == category);
    }

    sort_entries(&mut entries, sort, descending);
    output.print_entries(&entries, Utc::now());
    Ok(())
}

/// Show a single word
pub fn show(store: &Store, word: String, language: String, output: &Output) -> Result<()> {
    let entry = find(store, &word, &language)?;
    output.print_entry(&entry, Utc::now());
    Ok(())
}

/// Edit category, translation or notes
///
/// With no field flags the notes are opened in $EDITOR.
pub fn edit(
    store: &mut Store,
    word: String,
    language: String,
    mut changes: EntryEdit,
    output: &Output,
) -> Result<()> {
    let entry = find(store, &word, &language)?;

    if changes.is_empty() {
        let notes = edit_text(&entry.long_translation)?;
        if notes == entry.long_translation {
            output.message("No changes.");
            return Ok(());
        }
        changes.long_translation = Some(notes);
    }

    let updated = store
        .edit(&entry.key(), changes)
        .context("Failed to update word")?
        .ok_or_else(|| anyhow!("Word not found: {} ({})", word, language))?;

    output.success("Word updated");
    output.print_entry(&updated, Utc::now());
    Ok(())
}

/// Delete a word
pub fn delete(
    store: &mut Store,
    word: String,
    language: String,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let entry = find(store, &word, &language)?;

    if output.should_prompt() && !yes {
        println!(
            "Delete word: {} = {} ({})",
            entry.english_word, entry.single_translation, entry.learning_language
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete(&entry.key()).context("Failed to delete word")?;

    output.success(&format!("Deleted {}", entry.key()));
    Ok(())
}

/// Reset a word's points to zero
pub fn reset(store: &mut Store, word: String, language: String, output: &Output) -> Result<()> {
    let key = EntryKey::new(&word, &language);
    store
        .reset_points(&key)
        .context("Failed to reset points")?
        .ok_or_else(|| anyhow!("Word not found: {} ({})", word, language))?;

    output.success(&format!("Reset points for {}", key));
    Ok(())
}

fn find(store: &Store, word: &str, language: &str) -> Result<Entry> {
    store
        .get(&EntryKey::new(word, language))?
        .ok_or_else(|| anyhow!("Word not found: {} ({})", word, language))
}

/// Sort in place; ties keep storage order
pub fn sort_entries(entries: &mut [Entry], key: SortKey, descending: bool) {
    entries.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn compare(a: &Entry, b: &Entry, key: SortKey) -> Ordering {
    match key {
        SortKey::Word => a
            .english_word
            .to_lowercase()
            .cmp(&b.english_word.to_lowercase()),
        SortKey::Translation => a
            .single_translation
            .to_lowercase()
            .cmp(&b.single_translation.to_lowercase()),
        SortKey::Category => a.category.name().cmp(b.category.name()),
        SortKey::Language => a
            .learning_language
            .to_lowercase()
            .cmp(&b.learning_language.to_lowercase()),
        SortKey::Points => a.points.cmp(&b.points),
        // never tested sorts first
        SortKey::LastTested => a.last_tested.cmp(&b.last_tested),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use chrono::Duration;

    fn words(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.english_word.as_str()).collect()
    }

    fn sample() -> Vec<Entry> {
        let now = Utc::now();
        let mut dog = Entry::new("dog", "Spanish", "perro").with_category(Category::Animals);
        dog.points = 2;
        dog.last_tested = Some(now - Duration::days(1));
        let mut apple = Entry::new("Apple", "French", "pomme").with_category(Category::Food);
        apple.points = 5;
        apple.last_tested = Some(now - Duration::days(3));
        let cat = Entry::new("cat", "German", "Katze").with_category(Category::Animals);
        vec![dog, apple, cat]
    }

    #[test]
    fn test_sort_by_word_is_case_insensitive() {
        let mut entries = sample();
        sort_entries(&mut entries, SortKey::Word, false);
        assert_eq!(words(&entries), vec!["Apple", "cat", "dog"]);

        sort_entries(&mut entries, SortKey::Word, true);
        assert_eq!(words(&entries), vec!["dog", "cat", "Apple"]);
    }

    #[test]
    fn test_sort_by_points_and_last_tested() {
        let mut entries = sample();
        sort_entries(&mut entries, SortKey::Points, true);
        assert_eq!(words(&entries), vec!["Apple", "dog", "cat"]);

        sort_entries(&mut entries, SortKey::LastTested, false);
        assert_eq!(words(&entries), vec!["cat", "Apple", "dog"]);
    }

    #[test]
    fn test_sort_by_category_is_stable() {
        let mut entries = sample();
        sort_entries(&mut entries, SortKey::Category, false);
        assert_eq!(words(&entries), vec!["dog", "cat", "Apple"]);
    }

    #[test]
    fn test_add_duplicate_is_reported() {
        let mut store = Store::in_memory();
        let output = Output::new(OutputFormat::Quiet);

        add(&mut store, Entry::new("dog", "Spanish", "perro"), &output).unwrap();
        let err = add(&mut store, Entry::new("Dog", "Spanish", "can"), &output).unwrap_err();
        assert!(err.to_string().contains("Entry already exists"));
    }

    #[test]
    fn test_reset_and_delete() {
        let mut store = Store::in_memory();
        let output = Output::new(OutputFormat::Quiet);
        add(&mut store, Entry::new("dog", "Spanish", "perro"), &output).unwrap();

        let key = EntryKey::new("dog", "Spanish");
        store.record_review(&key, true, Utc::now()).unwrap();
        reset(&mut store, "DOG".into(), "spanish".into(), &output).unwrap();
        assert_eq!(store.get(&key).unwrap().unwrap().points, 0);

        delete(&mut store, "dog".into(), "Spanish".into(), true, &output).unwrap();
        assert!(store.is_empty().unwrap());

        assert!(reset(&mut store, "dog".into(), "Spanish".into(), &output).is_err());
    }

    #[test]
    fn test_edit_with_flags() {
        let mut store = Store::in_memory();
        let output = Output::new(OutputFormat::Quiet);
        add(&mut store, Entry::new("dog", "Spanish", "perro"), &output).unwrap();

        let changes = EntryEdit {
            category: Some(Category::Animals),
            ..Default::default()
        };
        edit(&mut store, "dog".into(), "Spanish".into(), changes, &output).unwrap();

        let entry = store.get(&EntryKey::new("dog", "Spanish")).unwrap().unwrap();
        assert_eq!(entry.category, Category::Animals);
    }
}
