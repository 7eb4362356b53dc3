//! Unified storage interface
//!
//! `Store` owns a `StorageBackend` and implements every operation on the
//! word list. There is no cache: each call reads the full collection, and
//! each mutation writes the full collection back before returning. Two
//! processes writing at once simply overwrite each other.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open()?;
//!
//! store.save(Entry::new("dog", "Spanish", "perro"))?;
//! let due = store.due("Spanish", None, Utc::now())?;
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::merge::{merge_entries, MergeReport};
use crate::models::{Category, Entry, EntryEdit, EntryKey, EntryRecord};
use crate::sanitize::sanitize_html;
use crate::schedule::{self, Scoring};
use crate::storage::file::atomic_write;
use crate::storage::{open_backend, MemoryBackend, StorageBackend};

/// Per-language counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageStats {
    pub language: String,
    pub entries: usize,
    pub due: usize,
}

/// Summary of the stored word list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total: usize,
    pub never_tested: usize,
    pub due: usize,
    pub languages: Vec<LanguageStats>,
}

/// The word list and every operation on it
pub struct Store {
    backend: Box<dyn StorageBackend>,
    scoring: Scoring,
}

impl Store {
    /// Open the store described by the default configuration
    pub fn open() -> anyhow::Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(&config).context("Failed to open word list")
    }

    /// Open the store with a specific configuration
    pub fn open_with_config(config: &Config) -> StoreResult<Self> {
        let backend = open_backend(config)?;
        debug!("Opened {} store at {}", backend.name(), backend.location());
        Ok(Self::with_backend(backend).with_scoring(config.scoring))
    }

    /// Wrap an already opened backend
    pub fn with_backend(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend,
            scoring: Scoring::default(),
        }
    }

    /// Store with nothing on disk
    pub fn in_memory() -> Self {
        Self::with_backend(Box::new(MemoryBackend::new()))
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn scoring(&self) -> Scoring {
        self.scoring
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.backend.size_bytes()
    }

    /// Release the backend
    pub fn close(mut self) -> StoreResult<()> {
        self.backend.close()?;
        Ok(())
    }

    // ==================== Entry Operations ====================

    /// Add a new entry
    ///
    /// The entry starts untested with zero points and sanitized notes.
    /// Fails with `StoreError::AlreadyExists` if the word is already stored
    /// for that language, in which case nothing is written.
    pub fn save(&mut self, entry: Entry) -> StoreResult<Entry> {
        let mut entries = self.load()?;
        let key = entry.key();

        if let Some(existing) = entries.iter().find(|e| e.key() == key) {
            return Err(StoreError::AlreadyExists {
                english_word: existing.english_word.clone(),
                learning_language: existing.learning_language.clone(),
            });
        }

        let entry = Entry {
            long_translation: sanitize_html(&entry.long_translation),
            points: 0,
            last_tested: None,
            ..entry
        };
        entries.push(entry.clone());
        self.persist(&entries)?;

        debug!("Saved entry {}", key);
        Ok(entry)
    }

    /// All entries, in storage order
    pub fn entries(&self) -> StoreResult<Vec<Entry>> {
        self.load()
    }

    /// All entries of one language (case-insensitive), in storage order
    pub fn get_all(&self, language: &str) -> StoreResult<Vec<Entry>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|e| e.is_language(language))
            .collect())
    }

    /// Look up an entry by identity
    pub fn get(&self, key: &EntryKey) -> StoreResult<Option<Entry>> {
        Ok(self.load()?.into_iter().find(|e| e.key() == *key))
    }

    pub fn contains(&self, key: &EntryKey) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Replace the stored entry with the same identity
    ///
    /// Returns `false` without writing if there is none.
    pub fn update(&mut self, entry: &Entry) -> StoreResult<bool> {
        let replacement = Entry {
            long_translation: sanitize_html(&entry.long_translation),
            ..entry.clone()
        };
        let updated = self.modify(&entry.key(), |stored| *stored = replacement)?;
        Ok(updated.is_some())
    }

    /// Remove every entry with this identity, returning how many were removed
    ///
    /// Removing a missing entry is not an error and writes nothing.
    pub fn delete(&mut self, key: &EntryKey) -> StoreResult<usize> {
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|e| e.key() != *key);

        let removed = before - entries.len();
        if removed > 0 {
            self.persist(&entries)?;
            debug!("Deleted {} entry(ies) for {}", removed, key);
        }
        Ok(removed)
    }

    /// Change category, translation or notes
    pub fn edit(&mut self, key: &EntryKey, edit: EntryEdit) -> StoreResult<Option<Entry>> {
        let edit = EntryEdit {
            long_translation: edit.long_translation.map(|notes| sanitize_html(&notes)),
            ..edit
        };
        self.modify(key, |entry| edit.apply_to(entry))
    }

    /// Set points back to zero, keeping the last review time
    pub fn reset_points(&mut self, key: &EntryKey) -> StoreResult<Option<Entry>> {
        self.modify(key, |entry| entry.points = 0)
    }

    /// Apply a review result with the store's scoring
    pub fn record_review(
        &mut self,
        key: &EntryKey,
        correct: bool,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Entry>> {
        let scoring = self.scoring;
        self.modify(key, |entry| {
            entry.points = scoring.apply(entry.points, correct);
            entry.last_tested = Some(now);
        })
    }

    // ==================== Review ====================

    /// Entries of `language` (and `category`) due at `now`
    ///
    /// An empty result means nothing is due.
    pub fn due(
        &self,
        language: &str,
        category: Option<Category>,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Entry>> {
        let entries = self.load()?;
        Ok(schedule::due_entries(&entries, language, category, now)
            .into_iter()
            .cloned()
            .collect())
    }

    // ==================== Import / Export ====================

    /// Merge records into the word list and write the result back
    ///
    /// Notes carried by new records are sanitized like any other input.
    pub fn merge(&mut self, records: Vec<EntryRecord>) -> StoreResult<MergeReport> {
        let records = records
            .into_iter()
            .map(|record| EntryRecord {
                long_translation: record.long_translation.map(|notes| sanitize_html(&notes)),
                ..record
            })
            .collect();

        let (merged, report) = merge_entries(self.load()?, records);
        self.persist(&merged)?;

        info!(
            "Merged word list: {} added, {} updated, {} unchanged",
            report.added, report.updated, report.unchanged
        );
        Ok(report)
    }

    /// Parse a JSON word list and merge it
    ///
    /// Malformed content is rejected before anything is written.
    pub fn import_json(&mut self, content: &str, origin: &str) -> StoreResult<MergeReport> {
        let records: Vec<EntryRecord> =
            serde_json::from_str(content).map_err(|e| StoreError::InvalidImport {
                origin: origin.to_string(),
                details: e.to_string(),
            })?;
        self.merge(records)
    }

    /// Read a JSON word list from disk and merge it
    pub fn import_file(&mut self, path: &Path) -> StoreResult<MergeReport> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::ImportRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.import_json(&content, &format!("'{}'", path.display()))
    }

    /// Records for export, optionally filtered
    pub fn export(
        &self,
        language: Option<&str>,
        category: Option<Category>,
        include_notes: bool,
    ) -> StoreResult<Vec<EntryRecord>> {
        Ok(self
            .load()?
            .iter()
            .filter(|e| language.map_or(true, |l| e.is_language(l)))
            .filter(|e| category.map_or(true, |c| e.category == c))
            .map(|e| EntryRecord::from_entry(e, include_notes))
            .collect())
    }

    /// Write an export file, returning the number of records written
    pub fn export_to_file(
        &self,
        path: &Path,
        language: Option<&str>,
        category: Option<Category>,
        include_notes: bool,
    ) -> StoreResult<usize> {
        let records = self.export(language, category, include_notes)?;
        let json = serde_json::to_string_pretty(&records)?;
        atomic_write(path, json.as_bytes())?;
        Ok(records.len())
    }

    // ==================== Stats ====================

    /// Distinct languages, first-seen spelling, sorted case-insensitively
    pub fn languages(&self) -> StoreResult<Vec<String>> {
        Ok(distinct_languages(&self.load()?))
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Counts per language, with due counts at `now`
    pub fn stats(&self, now: DateTime<Utc>) -> StoreResult<StoreStats> {
        let entries = self.load()?;
        let languages: Vec<LanguageStats> = distinct_languages(&entries)
            .into_iter()
            .map(|language| {
                let mine: Vec<&Entry> = entries.iter().filter(|e| e.is_language(&language)).collect();
                let due = mine.iter().filter(|e| schedule::is_due(e, now)).count();
                LanguageStats {
                    entries: mine.len(),
                    due,
                    language,
                }
            })
            .collect();

        Ok(StoreStats {
            total: entries.len(),
            never_tested: entries.iter().filter(|e| e.last_tested.is_none()).count(),
            due: languages.iter().map(|l| l.due).sum(),
            languages,
        })
    }

    // ==================== Internals ====================

    /// Read and parse the full collection
    ///
    /// Absent or malformed content reads as empty; the malformed case is
    /// logged and the content is overwritten by the next mutation.
    fn load(&self) -> StoreResult<Vec<Entry>> {
        let Some(raw) = self.backend.read()? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Option<Vec<Entry>>>(&raw) {
            Ok(entries) => Ok(entries.unwrap_or_default()),
            Err(e) => {
                warn!(
                    "Stored word list at {} is malformed, treating it as empty: {}",
                    self.backend.location(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    fn persist(&mut self, entries: &[Entry]) -> StoreResult<()> {
        let json = serde_json::to_string(entries)?;
        self.backend.write(&json)?;
        Ok(())
    }

    /// Read-modify-write of the first entry with `key`
    fn modify<F>(&mut self, key: &EntryKey, f: F) -> StoreResult<Option<Entry>>
    where
        F: FnOnce(&mut Entry),
    {
        let mut entries = self.load()?;
        let Some(entry) = entries.iter_mut().find(|e| e.key() == *key) else {
            return Ok(None);
        };

        f(entry);
        let updated = entry.clone();
        self.persist(&entries)?;

        debug!("Updated entry {}", key);
        Ok(Some(updated))
    }
}

fn distinct_languages(entries: &[Entry]) -> Vec<String> {
    let mut seen: HashMap<String, String> = HashMap::new();
    for entry in entries {
        seen.entry(entry.learning_language.to_lowercase())
            .or_insert_with(|| entry.learning_language.clone());
    }

    let mut languages: Vec<(String, String)> = seen.into_iter().collect();
    languages.sort();
    languages.into_iter().map(|(_, name)| name).collect()
}

/// Default export file name, as offered by the word table
pub fn export_file_name(language: Option<&str>) -> String {
    format!("{}_words.json", language.unwrap_or("all_languages"))
}
