//! Filesystem record store
//!
//! Each record lives at `{root}/{id}.json`. Writes go to a hidden
//! `.{id}.json.part` sibling that is renamed over the target on commit, so a
//! reader only ever sees a complete record or none at all.

use crate::store::traits::{validate_id, RecordStore, RecordWriter, StoreError, StoreResult};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const RECORD_EXTENSION: &str = "json";

/// Directory-backed record store
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Creates a store rooted at `root`
    ///
    /// The directory is not touched until [`RecordStore::ensure_ready`] or the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory holding this store's records
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.{}", id, RECORD_EXTENSION))
    }

    fn partial_path(&self, id: &str) -> PathBuf {
        self.root.join(format!(".{}.{}.part", id, RECORD_EXTENSION))
    }
}

impl RecordStore for FsStore {
    fn ensure_ready(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn exists(&self, id: &str) -> bool {
        validate_id(id).is_ok() && self.record_path(id).is_file()
    }

    fn read(&self, id: &str) -> StoreResult<Vec<u8>> {
        validate_id(id)?;
        fs::read(self.record_path(id)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(id.to_string())
            } else {
                StoreError::Io(e)
            }
        })
    }

    fn begin_write(&self, id: &str) -> StoreResult<Box<dyn RecordWriter>> {
        validate_id(id)?;
        fs::create_dir_all(&self.root)?;

        let partial = self.partial_path(id);
        let file = File::create(&partial)?;

        Ok(Box::new(PendingFile {
            file: Some(file),
            partial,
            target: self.record_path(id),
            committed: false,
        }))
    }

    fn list_ids(&self) -> StoreResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_id(stem).is_ok() && path.is_file() {
                ids.push(stem.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }
}

/// A record being written to its partial file
struct PendingFile {
    file: Option<File>,
    partial: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl RecordWriter for PendingFile {
    fn write_chunk(&mut self, bytes: &[u8]) -> StoreResult<()> {
        match self.file.as_mut() {
            Some(file) => Ok(file.write_all(bytes)?),
            None => Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "write after close",
            ))),
        }
    }

    fn commit(mut self: Box<Self>) -> StoreResult<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&self.partial, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        drop(self.file.take());
        if let Err(e) = fs::remove_file(&self.partial) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    "Failed to remove partial file {}: {}",
                    self.partial.display(),
                    e
                );
            }
        }
    }
}
