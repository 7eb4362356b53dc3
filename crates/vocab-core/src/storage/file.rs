//! JSON file backend
//!
//! The word list is a single JSON document on disk
//! (`<data_dir>/languageEntries.json` by default). Writes go to a sibling
//! temp file that is synced and renamed over the target, so a crash never
//! leaves a half-written list behind.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::{StorageError, StorageResult};
use super::StorageBackend;

/// Stores the word list in one JSON file
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Open the backend, creating the parent directory if needed
    ///
    /// The file itself is only created on first write.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if anything has been written yet
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Size of the file on disk, if present
    pub fn size(&self) -> Option<u64> {
        fs::metadata(&self.path).ok().map(|m| m.len())
    }
}

impl StorageBackend for FileBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    /// Bytes that are not UTF-8 come back lossily decoded, so the store
    /// sees them as malformed content rather than a read failure.
    fn read(&self) -> StorageResult<Option<String>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::from_read(e, self.path.clone())),
        };

        match String::from_utf8(bytes) {
            Ok(content) => Ok(Some(content)),
            Err(e) => {
                warn!("{} is not valid UTF-8: {}", self.path.display(), e.utf8_error());
                Ok(Some(String::from_utf8_lossy(e.as_bytes()).into_owned()))
            }
        }
    }

    fn write(&mut self, value: &str) -> StorageResult<()> {
        atomic_write(&self.path, value.as_bytes())
    }

    fn size_bytes(&self) -> Option<u64> {
        self.size()
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file over the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    // Same directory as the target so the rename stays on one filesystem
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let result = write_and_rename(&temp_path, path, data);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_rename(temp_path: &Path, path: &Path, data: &[u8]) -> StorageResult<()> {
    let mut file =
        File::create(temp_path).map_err(|e| StorageError::from_io(e, temp_path.to_path_buf()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.to_path_buf()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.to_path_buf()))?;
    drop(file);

    fs::rename(temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.to_path_buf(),
        to: path.to_path_buf(),
        source,
    })
}
