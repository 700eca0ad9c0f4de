//! In-memory ledger storage, used by tests and by hosts without a disk.

use std::cell::RefCell;
use std::rc::Rc;

use super::LedgerStore;
use crate::error::StorageError;

#[derive(Debug, Default)]
struct MemoryCell {
    raw: Option<String>,
    fail_writes: bool,
    writes: usize,
}

/// A store that keeps the record in memory.
///
/// Clones share the same cell, so a test can keep one handle to inspect what
/// the ledger wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    cell: Rc<RefCell<MemoryCell>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `raw`.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        let store = Self::new();
        store.cell.borrow_mut().raw = Some(raw.into());
        store
    }

    /// Make every following `save`/`clear` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.cell.borrow_mut().fail_writes = fail;
    }

    /// The raw record currently held.
    pub fn contents(&self) -> Option<String> {
        self.cell.borrow().raw.clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.cell.borrow().writes
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.cell.borrow().raw.clone())
    }

    fn save(&mut self, raw: &str) -> Result<(), StorageError> {
        let mut cell = self.cell.borrow_mut();
        if cell.fail_writes {
            return Err(StorageError::Unavailable("memory store is read-only".into()));
        }
        cell.raw = Some(raw.to_string());
        cell.writes += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        let mut cell = self.cell.borrow_mut();
        if cell.fail_writes {
            return Err(StorageError::Unavailable("memory store is read-only".into()));
        }
        cell.raw = None;
        cell.writes += 1;
        Ok(())
    }
}
