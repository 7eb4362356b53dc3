//! Data models for Vocab
//!
//! Defines the persisted `Entry`, its identity `EntryKey`, the closed
//! `Category` set, and `EntryRecord`, the loosely-typed shape used by
//! import and export files.
//!
//! Field names serialize in camelCase so existing word lists stay readable.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Word category, shared by input and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Category {
    #[default]
    None,
    Verbs,
    Adjectives,
    Family,
    Sport,
    Food,
    Clothes,
    Travel,
    Work,
    Home,
    Animals,
    Numbers,
    Colours,
    Time,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 14] = [
        Category::None,
        Category::Verbs,
        Category::Adjectives,
        Category::Family,
        Category::Sport,
        Category::Food,
        Category::Clothes,
        Category::Travel,
        Category::Work,
        Category::Home,
        Category::Animals,
        Category::Numbers,
        Category::Colours,
        Category::Time,
    ];

    /// Display name, also the stored form
    pub fn name(&self) -> &'static str {
        match self {
            Category::None => "None",
            Category::Verbs => "Verbs",
            Category::Adjectives => "Adjectives",
            Category::Family => "Family",
            Category::Sport => "Sport",
            Category::Food => "Food",
            Category::Clothes => "Clothes",
            Category::Travel => "Travel",
            Category::Work => "Work",
            Category::Home => "Home",
            Category::Animals => "Animals",
            Category::Numbers => "Numbers",
            Category::Colours => "Colours",
            Category::Time => "Time",
        }
    }

    /// Parse a stored name, falling back to `Category::None` for anything unknown
    pub fn from_name_lossy(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a category name is not one of `Category::ALL`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// Older word lists have no category, `null`, or names outside the current set.
impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .map(|name| Category::from_name_lossy(&name))
            .unwrap_or_default())
    }
}

/// Identity of an entry: the case-insensitive (word, language) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    english_word: String,
    learning_language: String,
}

impl EntryKey {
    pub fn new(english_word: &str, learning_language: &str) -> Self {
        Self {
            english_word: english_word.to_lowercase(),
            learning_language: learning_language.to_lowercase(),
        }
    }

    /// Lower-cased word component
    pub fn english_word(&self) -> &str {
        &self.english_word
    }

    /// Lower-cased language component
    pub fn learning_language(&self) -> &str {
        &self.learning_language
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.english_word, self.learning_language)
    }
}

/// A vocabulary entry as persisted in storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Source term
    pub english_word: String,
    /// Target language name
    pub learning_language: String,
    /// Short canonical answer, graded by exact match
    #[serde(default)]
    pub single_translation: String,
    /// Sanitized markup notes
    #[serde(default, deserialize_with = "null_as_empty")]
    pub long_translation: String,
    #[serde(default)]
    pub category: Category,
    /// Review streak, doubles as the interval in days before the entry is due again
    #[serde(default)]
    pub points: u32,
    /// `None` until the first review
    #[serde(default)]
    pub last_tested: Option<DateTime<Utc>>,
}

impl Entry {
    /// Create a never-reviewed entry
    pub fn new(
        english_word: impl Into<String>,
        learning_language: impl Into<String>,
        single_translation: impl Into<String>,
    ) -> Self {
        Self {
            english_word: english_word.into(),
            learning_language: learning_language.into(),
            single_translation: single_translation.into(),
            long_translation: String::new(),
            category: Category::None,
            points: 0,
            last_tested: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.long_translation = notes.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn key(&self) -> EntryKey {
        EntryKey::new(&self.english_word, &self.learning_language)
    }

    /// Whether this entry belongs to `language` (case-insensitive)
    pub fn is_language(&self, language: &str) -> bool {
        self.learning_language.to_lowercase() == language.to_lowercase()
    }
}

/// Partial update of the user-editable fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryEdit {
    pub category: Option<Category>,
    pub single_translation: Option<String>,
    pub long_translation: Option<String>,
}

impl EntryEdit {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.single_translation.is_none()
            && self.long_translation.is_none()
    }

    /// Apply the edit, leaving identity and review stats untouched
    pub fn apply_to(self, entry: &mut Entry) {
        if let Some(category) = self.category {
            entry.category = category;
        }
        if let Some(translation) = self.single_translation {
            entry.single_translation = translation;
        }
        if let Some(notes) = self.long_translation {
            entry.long_translation = notes;
        }
    }
}

/// An entry as it appears in an import or export file
///
/// Review stats and notes are optional so partial or legacy files load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub english_word: String,
    pub learning_language: String,
    #[serde(default)]
    pub single_translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_translation: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub last_tested: Option<DateTime<Utc>>,
}

impl EntryRecord {
    /// Build an export record, optionally carrying the notes
    pub fn from_entry(entry: &Entry, include_notes: bool) -> Self {
        Self {
            english_word: entry.english_word.clone(),
            learning_language: entry.learning_language.clone(),
            single_translation: entry.single_translation.clone(),
            long_translation: include_notes.then(|| entry.long_translation.clone()),
            category: entry.category,
            points: Some(entry.points),
            last_tested: entry.last_tested,
        }
    }

    pub fn key(&self) -> EntryKey {
        EntryKey::new(&self.english_word, &self.learning_language)
    }

    /// Convert to a stored entry, defaulting missing stats to a fresh entry
    pub fn into_entry(self) -> Entry {
        Entry {
            english_word: self.english_word,
            learning_language: self.learning_language,
            single_translation: self.single_translation,
            long_translation: self.long_translation.unwrap_or_default(),
            category: self.category,
            points: self.points.unwrap_or(0),
            last_tested: self.last_tested,
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_entry_is_untested() {
        let entry = Entry::new("dog", "Spanish", "perro");
        assert_eq!(entry.points, 0);
        assert!(entry.last_tested.is_none());
        assert_eq!(entry.category, Category::None);
        assert!(entry.long_translation.is_empty());
    }

    #[test]
    fn test_key_is_case_insensitive() {
        let a = Entry::new("Dog", "SPANISH", "perro");
        let b = Entry::new("dog", "spanish", "can");
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), EntryKey::new("dog", "French"));
    }

    #[test]
    fn test_entry_json_uses_camel_case() {
        let mut entry = Entry::new("cat", "French", "chat").with_category(Category::Animals);
        entry.last_tested = Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["englishWord"], "cat");
        assert_eq!(json["learningLanguage"], "French");
        assert_eq!(json["singleTranslation"], "chat");
        assert_eq!(json["category"], "Animals");
        assert_eq!(json["points"], 0);
        assert!(json["lastTested"].as_str().unwrap().starts_with("2024-03-01T12:00:00"));
    }

    #[test]
    fn test_entry_reads_browser_shaped_json() {
        let json = r#"{
            "englishWord": "house",
            "learningLanguage": "German",
            "singleTranslation": "Haus",
            "longTranslation": "<p>das Haus</p>",
            "points": 2,
            "lastTested": "2024-05-10T08:30:00.000Z"
        }"#;

        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.category, Category::None);
        assert_eq!(entry.points, 2);
        assert_eq!(
            entry.last_tested,
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 8, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let json = r#"{
            "englishWord": "red",
            "learningLanguage": "Spanish",
            "singleTranslation": "rojo",
            "longTranslation": null,
            "category": null,
            "lastTested": null
        }"#;

        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.long_translation, "");
        assert_eq!(entry.category, Category::None);
        assert!(entry.last_tested.is_none());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("verbs".parse::<Category>().unwrap(), Category::Verbs);
        assert_eq!(" Colours ".parse::<Category>().unwrap(), Category::Colours);
        assert!("Colors".parse::<Category>().is_err());
        assert_eq!(Category::from_name_lossy("Weather"), Category::None);
    }

    #[test]
    fn test_unknown_stored_category_reads_as_none() {
        let json = r#"{"englishWord":"rain","learningLanguage":"French","category":"Weather"}"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.category, Category::None);
    }

    #[test]
    fn test_record_defaults_missing_stats() {
        let json = r#"[{"englishWord":"one","learningLanguage":"German","singleTranslation":"eins"}]"#;
        let records: Vec<EntryRecord> = serde_json::from_str(json).unwrap();

        let entry = records.into_iter().next().unwrap().into_entry();
        assert_eq!(entry.points, 0);
        assert!(entry.last_tested.is_none());
        assert_eq!(entry.long_translation, "");
    }

    #[test]
    fn test_record_omits_notes_unless_requested() {
        let entry = Entry::new("cat", "French", "chat").with_notes("<b>le</b> chat");

        let bare = serde_json::to_value(EntryRecord::from_entry(&entry, false)).unwrap();
        assert!(bare.get("longTranslation").is_none());

        let full = serde_json::to_value(EntryRecord::from_entry(&entry, true)).unwrap();
        assert_eq!(full["longTranslation"], "<b>le</b> chat");
    }

    #[test]
    fn test_edit_leaves_stats_alone() {
        let mut entry = Entry::new("dog", "Spanish", "perro");
        entry.points = 4;

        EntryEdit {
            category: Some(Category::Animals),
            long_translation: Some("el perro".to_string()),
            ..Default::default()
        }
        .apply_to(&mut entry);

        assert_eq!(entry.category, Category::Animals);
        assert_eq!(entry.long_translation, "el perro");
        assert_eq!(entry.single_translation, "perro");
        assert_eq!(entry.points, 4);
    }
}
