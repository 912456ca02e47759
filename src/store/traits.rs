//! Store traits and error types
//!
//! This module defines the key-value interface shared by every record store
//! backend, and the id rules all backends enforce.

use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid record id: {0:?}")]
    InvalidId(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns true when the error means "nothing stored under this id"
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            Self::InvalidId(_) => false,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// An in-progress record write
///
/// Bytes written through this handle are invisible to readers until
/// [`RecordWriter::commit`] succeeds. Dropping the handle without committing
/// discards everything written so far.
pub trait RecordWriter: Send {
    /// Appends a chunk of the record body
    fn write_chunk(&mut self, bytes: &[u8]) -> StoreResult<()>;

    /// Atomically publishes the record, replacing any previous version
    fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Trait for record store implementations
///
/// A store is a flat namespace of opaque records keyed by entity id. The crawl
/// pipeline is its only writer; the query service reads it concurrently.
pub trait RecordStore: Send + Sync {
    /// Prepares the backend for use (e.g., creates the directory)
    ///
    /// Idempotent; called once before a crawl stage begins.
    fn ensure_ready(&self) -> StoreResult<()>;

    /// Checks whether a record is stored under `id`
    fn exists(&self, id: &str) -> bool;

    /// Reads the full record stored under `id`
    fn read(&self, id: &str) -> StoreResult<Vec<u8>>;

    /// Starts an atomic write of the record `id`
    fn begin_write(&self, id: &str) -> StoreResult<Box<dyn RecordWriter>>;

    /// Lists stored record ids in a stable, sorted order
    fn list_ids(&self) -> StoreResult<Vec<String>>;

    /// Writes a complete record in one call
    fn write(&self, id: &str, bytes: &[u8]) -> StoreResult<()> {
        let mut writer = self.begin_write(id)?;
        writer.write_chunk(bytes)?;
        writer.commit()
    }
}

/// Checks that `id` is usable verbatim as a file name stem
///
/// Rejects empty ids, ids with path separators or NUL bytes, and ids starting
/// with '.' (reserved for partial files and relative path components).
pub fn validate_id(id: &str) -> StoreResult<()> {
    let unsafe_char = id.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
    if id.is_empty() || id.starts_with('.') || unsafe_char {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}
