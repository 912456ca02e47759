//! In-memory record store

use crate::store::traits::{validate_id, RecordStore, RecordWriter, StoreError, StoreResult};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

type Records = Arc<RwLock<BTreeMap<String, Vec<u8>>>>;

/// Record store held entirely in memory
///
/// Counts successful and failed reads, which makes cache behaviour in front
/// of it observable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Records,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `read` calls served so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Removes a record, as an external cleanup would
    pub fn remove(&self, id: &str) -> bool {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for MemoryStore {
    fn ensure_ready(&self) -> StoreResult<()> {
        Ok(())
    }

    fn exists(&self, id: &str) -> bool {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    fn read(&self, id: &str) -> StoreResult<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn begin_write(&self, id: &str) -> StoreResult<Box<dyn RecordWriter>> {
        validate_id(id)?;
        Ok(Box::new(PendingRecord {
            records: Arc::clone(&self.records),
            id: id.to_string(),
            buffer: Vec::new(),
        }))
    }

    fn list_ids(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect())
    }
}

struct PendingRecord {
    records: Records,
    id: String,
    buffer: Vec<u8>,
}

impl RecordWriter for PendingRecord {
    fn write_chunk(&mut self, bytes: &[u8]) -> StoreResult<()> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn commit(self: Box<Self>) -> StoreResult<()> {
        let PendingRecord {
            records,
            id,
            buffer,
        } = *self;
        records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_and_count() {
        let store = MemoryStore::new();
        store.write("JFK", b"{}").unwrap();

        assert!(store.exists("JFK"));
        assert_eq!(store.read("JFK").unwrap(), b"{}");
        assert!(store.read("LAX").is_err());
        assert_eq!(store.reads(), 2);
    }

    #[test]
    fn test_uncommitted_write_is_discarded() {
        let store = MemoryStore::new();
        {
            let mut writer = store.begin_write("JFK").unwrap();
            writer.write_chunk(b"partial").unwrap();
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_ids_sorted() {
        let store = MemoryStore::new();
        store.write("b", b"{}").unwrap();
        store.write("a", b"{}").unwrap();
        assert_eq!(store.list_ids().unwrap(), vec!["a", "b"]);

        assert!(store.remove("a"));
        assert_eq!(store.len(), 1);
    }
}
