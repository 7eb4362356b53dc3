//! SQLite backend
//!
//! Keeps the word list as a single value in the `kv` table, keyed by
//! `ENTRIES_KEY`.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::schema::{init_schema, needs_init};
use super::{StorageBackend, ENTRIES_KEY};

/// Stores the word list in an SQLite database
pub struct SqliteBackend {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteBackend {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| {
                    StorageError::CreateDirectory {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        let conn = Connection::open(path)?;
        if needs_init(&conn) {
            debug!("Initializing schema in {:?}", path);
            init_schema(&conn)?;
        }

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl StorageBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn location(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string())
    }

    fn read(&self) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![ENTRIES_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![ENTRIES_KEY, value],
        )?;
        Ok(())
    }

    fn size_bytes(&self) -> Option<u64> {
        let path = self.path.as_ref()?;
        std::fs::metadata(path).ok().map(|m| m.len())
    }

    fn close(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_database_reads_as_none() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        assert!(backend.read().unwrap().is_none());
        assert_eq!(backend.location(), ":memory:");
    }

    #[test]
    fn test_write_replaces_value() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();

        backend.write("[]").unwrap();
        backend.write(r#"[{"englishWord":"cat"}]"#).unwrap();

        assert_eq!(
            backend.read().unwrap().as_deref(),
            Some(r#"[{"englishWord":"cat"}]"#)
        );

        let rows: i64 = backend
            .connection()
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_value_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vocab.db");

        {
            let mut backend = SqliteBackend::open(&path).unwrap();
            backend.write("[1]").unwrap();
            backend.close().unwrap();
        }

        let backend = SqliteBackend::open(&path).unwrap();
        assert_eq!(backend.read().unwrap().as_deref(), Some("[1]"));
        assert!(backend.size_bytes().unwrap() > 0);
    }
}
