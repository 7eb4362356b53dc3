//! In-memory backend
//!
//! Nothing touches disk. Clones share the same slot, so a test can keep a
//! handle and inspect what the store wrote.

use std::cell::RefCell;
use std::rc::Rc;

use super::error::StorageResult;
use super::StorageBackend;

#[derive(Debug, Default)]
struct Slot {
    value: Option<String>,
    writes: usize,
}

/// Process-local storage slot
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Rc<RefCell<Slot>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw content already stored
    pub fn with_value(value: impl Into<String>) -> Self {
        let backend = Self::new();
        backend.slot.borrow_mut().value = Some(value.into());
        backend
    }

    /// Current raw content
    pub fn value(&self) -> Option<String> {
        self.slot.borrow().value.clone()
    }

    /// Number of writes since creation
    pub fn write_count(&self) -> usize {
        self.slot.borrow().writes
    }
}

impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn location(&self) -> String {
        "(in memory)".to_string()
    }

    fn read(&self) -> StorageResult<Option<String>> {
        Ok(self.value())
    }

    fn write(&mut self, value: &str) -> StorageResult<()> {
        let mut slot = self.slot.borrow_mut();
        slot.value = Some(value.to_string());
        slot.writes += 1;
        Ok(())
    }

    fn size_bytes(&self) -> Option<u64> {
        self.slot.borrow().value.as_ref().map(|v| v.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_slot() {
        let handle = MemoryBackend::new();
        let mut backend = handle.clone();

        assert!(backend.read().unwrap().is_none());
        backend.write("[]").unwrap();

        assert_eq!(handle.value().as_deref(), Some("[]"));
        assert_eq!(handle.write_count(), 1);
    }

    #[test]
    fn test_with_value() {
        let backend = MemoryBackend::with_value("not json");
        assert_eq!(backend.read().unwrap().as_deref(), Some("not json"));
        assert_eq!(backend.write_count(), 0);
    }
}
