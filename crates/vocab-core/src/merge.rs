//! Import merging
//!
//! Reconciles an imported word list with the stored collection. Entries are
//! matched by `EntryKey`; when both sides have the entry, the one reviewed
//! most recently wins as a whole, except that stored notes are always kept.
//! There is no per-field merge across snapshots.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Entry, EntryKey, EntryRecord};

/// Outcome counts of a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Candidates inserted as new entries
    pub added: usize,
    /// Existing entries replaced by a more recently reviewed candidate
    pub updated: usize,
    /// Candidates ignored because the stored entry is as recent or newer
    pub unchanged: usize,
    /// Stored entries dropped because they shared an identity
    pub duplicates_removed: usize,
}

impl MergeReport {
    pub fn total(&self) -> usize {
        self.added + self.updated + self.unchanged
    }

    pub fn changed(&self) -> bool {
        self.added > 0 || self.updated > 0 || self.duplicates_removed > 0
    }
}

/// Merge `candidates` into `existing`, returning one entry per identity
///
/// Storage order is preserved; new entries are appended in file order.
pub fn merge_entries(
    existing: Vec<Entry>,
    candidates: Vec<EntryRecord>,
) -> (Vec<Entry>, MergeReport) {
    let mut report = MergeReport::default();
    let (mut merged, removed) = dedupe(existing);
    report.duplicates_removed = removed;

    let mut index: HashMap<EntryKey, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, entry)| (entry.key(), i))
        .collect();

    for candidate in candidates {
        let key = candidate.key();
        match index.get(&key) {
            None => {
                index.insert(key, merged.len());
                merged.push(candidate.into_entry());
                report.added += 1;
            }
            Some(&i) => {
                let current = &mut merged[i];
                // `None < Some(_)`: never reviewed sorts as the earliest time
                if candidate.last_tested > current.last_tested {
                    let notes = std::mem::take(&mut current.long_translation);
                    let mut replacement = candidate.into_entry();
                    replacement.long_translation = notes;
                    *current = replacement;
                    report.updated += 1;
                } else {
                    report.unchanged += 1;
                }
            }
        }
    }

    (merged, report)
}

/// Collapse entries sharing an identity
///
/// The slot of the first occurrence is kept, holding the most recently
/// reviewed copy.
fn dedupe(entries: Vec<Entry>) -> (Vec<Entry>, usize) {
    let mut index: HashMap<EntryKey, usize> = HashMap::with_capacity(entries.len());
    let mut kept: Vec<Entry> = Vec::with_capacity(entries.len());
    let mut removed = 0;

    for entry in entries {
        match index.get(&entry.key()) {
            None => {
                index.insert(entry.key(), kept.len());
                kept.push(entry);
            }
            Some(&i) => {
                removed += 1;
                if entry.last_tested > kept[i].last_tested {
                    kept[i] = entry;
                }
            }
        }
    }

    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap()
    }

    fn stored(word: &str, points: u32, tested: Option<DateTime<Utc>>) -> Entry {
        let mut entry = Entry::new(word, "Spanish", format!("{}-es", word)).with_notes("stored notes");
        entry.points = points;
        entry.last_tested = tested;
        entry
    }

    fn record(word: &str, points: Option<u32>, tested: Option<DateTime<Utc>>) -> EntryRecord {
        EntryRecord {
            english_word: word.to_string(),
            learning_language: "Spanish".to_string(),
            single_translation: format!("{}-import", word),
            long_translation: None,
            category: Default::default(),
            points,
            last_tested: tested,
        }
    }

    #[test]
    fn test_new_candidates_are_appended_with_defaults() {
        let existing = vec![stored("dog", 1, Some(at(1)))];
        let (merged, report) = merge_entries(existing, vec![record("cat", None, None)]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].english_word, "cat");
        assert_eq!(merged[1].points, 0);
        assert!(merged[1].last_tested.is_none());
        assert_eq!(report.added, 1);
    }

    #[test]
    fn test_newer_candidate_wins_but_keeps_notes() {
        let existing = vec![stored("dog", 1, Some(at(1)))];
        let (merged, report) =
            merge_entries(existing, vec![record("DOG", Some(4), Some(at(5)))]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].english_word, "DOG");
        assert_eq!(merged[0].single_translation, "DOG-import");
        assert_eq!(merged[0].points, 4);
        assert_eq!(merged[0].last_tested, Some(at(5)));
        assert_eq!(merged[0].long_translation, "stored notes");
        assert_eq!(report.updated, 1);
    }

    #[test]
    fn test_older_or_equal_candidate_is_ignored() {
        let original = stored("dog", 3, Some(at(10)));

        for tested in [Some(at(9)), Some(at(10)), None] {
            let (merged, report) =
                merge_entries(vec![original.clone()], vec![record("dog", Some(0), tested)]);
            assert_eq!(merged, vec![original.clone()]);
            assert_eq!(report.unchanged, 1);
            assert!(!report.changed());
        }
    }

    #[test]
    fn test_any_review_beats_never_reviewed() {
        let existing = vec![stored("dog", 0, None)];
        let (merged, _) = merge_entries(existing, vec![record("dog", Some(2), Some(at(1)))]);
        assert_eq!(merged[0].points, 2);
    }

    #[test]
    fn test_recency_wins_matrix() {
        let times = [None, Some(at(1)), Some(at(2)), Some(at(3))];
        for t1 in times {
            for t2 in times {
                let existing = stored("dog", 1, t1);
                let candidate = record("dog", Some(9), t2);
                let (merged, _) = merge_entries(vec![existing.clone()], vec![candidate.clone()]);

                if t2 > t1 {
                    let mut expected = candidate.into_entry();
                    expected.long_translation = existing.long_translation.clone();
                    assert_eq!(merged[0], expected);
                } else {
                    assert_eq!(merged[0], existing);
                }
            }
        }
    }

    #[test]
    fn test_duplicates_within_import_collapse() {
        let candidates = vec![
            record("dog", Some(1), Some(at(2))),
            record("Dog", Some(5), Some(at(4))),
            record("dog", Some(2), Some(at(3))),
        ];
        let (merged, report) = merge_entries(Vec::new(), candidates);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].points, 5);
        assert_eq!(report.added, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.unchanged, 1);
    }

    #[test]
    fn test_stored_duplicates_are_collapsed() {
        let existing = vec![
            stored("dog", 1, Some(at(1))),
            stored("cat", 0, None),
            stored("DOG", 6, Some(at(8))),
        ];
        let (merged, report) = merge_entries(existing, Vec::new());

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].points, 6);
        assert_eq!(merged[1].english_word, "cat");
        assert_eq!(report.duplicates_removed, 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let base = at(1);
        let existing = vec![
            stored("dog", 2, Some(base)),
            stored("cat", 0, None),
            stored("red", 4, Some(base + Duration::days(3))),
        ];
        let candidates = vec![
            record("dog", Some(3), Some(base + Duration::days(1))),
            record("cat", None, None),
            record("red", Some(0), Some(base)),
            record("house", Some(1), Some(base)),
            record("HOUSE", Some(2), Some(base + Duration::hours(1))),
        ];

        let (once, _) = merge_entries(existing, candidates.clone());
        let (twice, second) = merge_entries(once.clone(), candidates);

        assert_eq!(once, twice);
        assert!(!second.changed());
    }
}
