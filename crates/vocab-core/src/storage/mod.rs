//! Storage layer
//!
//! The whole word list lives under a single key as one JSON array.
//! `StorageBackend` abstracts where that key is kept:
//!
//! - `FileBackend`: a JSON file, written atomically
//! - `SqliteBackend`: a row in an SQLite key-value table
//! - `MemoryBackend`: process-local, for tests
//!
//! Opening a backend is its constructor; `close` flushes and releases it.
//! Backends only move raw text. Parsing, and tolerance of malformed
//! content, belong to the `Store`.

pub mod error;
pub mod file;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use crate::config::{BackendKind, Config};

/// Key the word list is stored under
pub const ENTRIES_KEY: &str = "languageEntries";

/// A durable slot holding the raw word list
pub trait StorageBackend {
    /// Short name shown in status output
    fn name(&self) -> &'static str;

    /// Human-readable location (path or description)
    fn location(&self) -> String;

    /// Read the stored value, `None` if nothing was ever written
    fn read(&self) -> StorageResult<Option<String>>;

    /// Replace the stored value
    fn write(&mut self, value: &str) -> StorageResult<()>;

    /// Bytes used on disk, when known
    fn size_bytes(&self) -> Option<u64> {
        None
    }

    /// Flush and release resources
    fn close(&mut self) -> StorageResult<()> {
        Ok(())
    }
}

/// Open the backend selected in `config`
pub fn open_backend(config: &Config) -> StorageResult<Box<dyn StorageBackend>> {
    let backend: Box<dyn StorageBackend> = match config.backend {
        BackendKind::Json => Box::new(FileBackend::open(config.entries_path())?),
        BackendKind::Sqlite => Box::new(SqliteBackend::open(&config.sqlite_path())?),
    };
    Ok(backend)
}
