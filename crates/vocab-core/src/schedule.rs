//! Due selection
//!
//! An entry's `points` doubles as its review interval in days: a word
//! answered correctly three times in a row resurfaces three days after its
//! last review. Never-reviewed entries are always due.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{Category, Entry};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days elapsed since the last review, rounded down
///
/// Uses floor division so a `last_tested` in the future counts as a
/// negative day rather than zero.
pub fn days_since_tested(entry: &Entry, now: DateTime<Utc>) -> Option<i64> {
    entry
        .last_tested
        .map(|tested| (now - tested).num_milliseconds().div_euclid(MILLIS_PER_DAY))
}

/// Whether the entry is eligible for review at `now`
pub fn is_due(entry: &Entry, now: DateTime<Utc>) -> bool {
    match days_since_tested(entry, now) {
        None => true,
        Some(days) => days >= i64::from(entry.points),
    }
}

/// Days left before the entry becomes due, zero when already due
pub fn days_until_due(entry: &Entry, now: DateTime<Utc>) -> i64 {
    match days_since_tested(entry, now) {
        None => 0,
        Some(days) => (i64::from(entry.points) - days).max(0),
    }
}

/// The instant the entry becomes due, `None` if never tested or out of range
pub fn next_due_at(entry: &Entry) -> Option<DateTime<Utc>> {
    let tested = entry.last_tested?;
    tested.checked_add_signed(Duration::try_days(i64::from(entry.points))?)
}

/// Language and optional category filter
pub fn matches(entry: &Entry, language: &str, category: Option<Category>) -> bool {
    entry.is_language(language) && category.map_or(true, |c| entry.category == c)
}

/// Entries of `language` (and `category`, if given) that are due at `now`
pub fn due_entries<'a>(
    entries: &'a [Entry],
    language: &str,
    category: Option<Category>,
    now: DateTime<Utc>,
) -> Vec<&'a Entry> {
    entries
        .iter()
        .filter(|e| matches(e, language, category) && is_due(e, now))
        .collect()
}

/// Uniform random pick
pub fn pick_random<'a, T, R: Rng + ?Sized>(candidates: &'a [T], rng: &mut R) -> Option<&'a T> {
    candidates.choose(rng)
}

/// How answers move an entry's points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scoring {
    /// +1 when correct, back to 0 when wrong
    #[default]
    Standard,
    /// +5 when correct, back to 1 when wrong
    Accelerated,
}

impl Scoring {
    pub fn correct_step(self) -> u32 {
        match self {
            Scoring::Standard => 1,
            Scoring::Accelerated => 5,
        }
    }

    pub fn reset_to(self) -> u32 {
        match self {
            Scoring::Standard => 0,
            Scoring::Accelerated => 1,
        }
    }

    /// New points after an answer
    pub fn apply(self, points: u32, correct: bool) -> u32 {
        if correct {
            points.saturating_add(self.correct_step())
        } else {
            self.reset_to()
        }
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scoring::Standard => f.write_str("standard"),
            Scoring::Accelerated => f.write_str("accelerated"),
        }
    }
}

impl FromStr for Scoring {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Scoring::Standard),
            "accelerated" => Ok(Scoring::Accelerated),
            other => Err(format!(
                "Unknown scoring '{}'. Use 'standard' or 'accelerated'.",
                other
            )),
        }
    }
}
