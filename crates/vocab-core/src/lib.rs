//! Vocab Core Library
//!
//! This crate provides the core functionality for Vocab, a local
//! vocabulary trainer: a personal word list per learning language, reviewed
//! on a spaced schedule where a word's points are the days it waits before
//! it is asked again.
//!
//! # Architecture
//!
//! - **Single slot**: the whole word list is one JSON array stored under
//!   the `languageEntries` key of a `StorageBackend`
//! - **No cache**: every operation reads the list and every mutation writes
//!   it back in full
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open()?;
//!
//! store.save(Entry::new("dog", "Spanish", "perro"))?;
//!
//! let mut session = ReviewSession::new(&mut store, rand::rng());
//! session.start("Spanish", None)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: Entries, identities and categories
//! - `schedule`: Due rule, scoring and random selection
//! - `merge`: Import reconciliation by identity and recency
//! - `session`: Review state machine
//! - `sanitize`: Allowlist HTML sanitizer for notes
//! - `storage`: JSON file, SQLite and in-memory backends
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod merge;
pub mod models;
pub mod sanitize;
pub mod schedule;
pub mod session;
pub mod storage;
pub mod store;

pub use config::{BackendKind, Config};
pub use error::{StoreError, StoreResult};
pub use merge::MergeReport;
pub use models::{Category, Entry, EntryEdit, EntryKey, EntryRecord};
pub use sanitize::{notes_to_text, sanitize_html};
pub use schedule::Scoring;
pub use session::{ReviewSession, SessionError, SessionState, SessionSummary};
pub use storage::{StorageBackend, StorageError};
pub use store::{export_file_name, Store, StoreStats};
