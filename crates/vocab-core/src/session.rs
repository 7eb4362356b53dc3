//! Review session state machine
//!
//! ```text
//! Idle --start--> AwaitingAnswer --submit_answer--> Graded --confirm--> AwaitingAnswer
//!           \                                                  \
//!            `--> Complete (nothing due)                         `--> Complete
//! ```
//!
//! Each confirmed answer is scored and persisted through the `Store`
//! before the next entry is drawn from whatever is due at that moment.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::error::StoreError;
use crate::models::{Category, Entry};
use crate::schedule::pick_random;
use crate::store::Store;

/// Errors from driving a session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot {action} while the session is {actual} (expected {expected})")]
    InvalidState {
        action: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Where the session currently is
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    AwaitingAnswer {
        entry: Entry,
    },
    Graded {
        entry: Entry,
        answer: String,
        correct: bool,
    },
    Complete,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingAnswer { .. } => "awaiting an answer",
            SessionState::Graded { .. } => "graded",
            SessionState::Complete => "complete",
        }
    }

    /// Entry being asked or just graded
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            SessionState::AwaitingAnswer { entry } | SessionState::Graded { entry, .. } => {
                Some(entry)
            }
            _ => None,
        }
    }
}

/// Counts for the end-of-session message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub reviewed: usize,
    pub correct: usize,
}

/// One learning-mode run over a language (and optional category)
pub struct ReviewSession<'a, R: Rng> {
    store: &'a mut Store,
    rng: R,
    state: SessionState,
    language: String,
    category: Option<Category>,
    summary: SessionSummary,
}

impl<'a, R: Rng> ReviewSession<'a, R> {
    pub fn new(store: &'a mut Store, rng: R) -> Self {
        Self {
            store,
            rng,
            state: SessionState::Idle,
            language: String::new(),
            category: None,
            summary: SessionSummary::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// Begin reviewing `language`
    pub fn start(
        &mut self,
        language: &str,
        category: Option<Category>,
    ) -> SessionResult<&SessionState> {
        self.start_at(language, category, Utc::now())
    }

    pub fn start_at(
        &mut self,
        language: &str,
        category: Option<Category>,
        now: DateTime<Utc>,
    ) -> SessionResult<&SessionState> {
        if self.state != SessionState::Idle {
            return Err(self.invalid("start", "idle"));
        }

        self.language = language.to_string();
        self.category = category;
        self.summary = SessionSummary::default();
        self.draw(now)?;
        Ok(&self.state)
    }

    /// Grade a typed answer, returning whether it matched
    pub fn submit_answer(&mut self, answer: &str) -> SessionResult<bool> {
        let SessionState::AwaitingAnswer { entry } = &self.state else {
            return Err(self.invalid("submit an answer", "awaiting an answer"));
        };

        let answer = answer.trim().to_string();
        let correct = answer.to_lowercase() == entry.single_translation.to_lowercase();
        self.state = SessionState::Graded {
            entry: entry.clone(),
            answer,
            correct,
        };
        Ok(correct)
    }

    /// Accept the grade (or override it), persist, and move on
    pub fn confirm(&mut self, correct_override: Option<bool>) -> SessionResult<&SessionState> {
        self.confirm_at(correct_override, Utc::now())
    }

    pub fn confirm_at(
        &mut self,
        correct_override: Option<bool>,
        now: DateTime<Utc>,
    ) -> SessionResult<&SessionState> {
        let SessionState::Graded { entry, correct, .. } = &self.state else {
            return Err(self.invalid("confirm", "graded"));
        };

        let key = entry.key();
        let correct = correct_override.unwrap_or(*correct);
        if self.store.record_review(&key, correct, now)?.is_none() {
            debug!("Reviewed entry {} disappeared before it was scored", key);
        }

        self.summary.reviewed += 1;
        if correct {
            self.summary.correct += 1;
        }

        self.draw(now)?;
        Ok(&self.state)
    }

    /// Back to `Idle` from any state
    pub fn restart(&mut self) {
        self.state = SessionState::Idle;
    }

    fn draw(&mut self, now: DateTime<Utc>) -> SessionResult<()> {
        let due = self.store.due(&self.language, self.category, now)?;
        self.state = match pick_random(&due, &mut self.rng) {
            Some(entry) => SessionState::AwaitingAnswer {
                entry: entry.clone(),
            },
            None => SessionState::Complete,
        };
        Ok(())
    }

    fn invalid(&self, action: &'static str, expected: &'static str) -> SessionError {
        SessionError::InvalidState {
            action,
            expected,
            actual: self.state.name(),
        }
    }
}
