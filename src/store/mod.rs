//! Record store module
//!
//! This module persists fetched records, one per entity id:
//! - A key-value trait (`exists`, `read`, atomic writes, listing)
//! - A filesystem backend writing `{id}.json` via write-then-rename
//! - An in-memory backend
//! - Entity id derivation from source URLs

mod fs;
mod memory;
mod traits;

pub use fs::FsStore;
pub use memory::MemoryStore;
pub use traits::{validate_id, RecordStore, RecordWriter, StoreError, StoreResult};

use url::Url;

/// Derives the entity id for a source URL
///
/// The id is the final path segment with a `.json` suffix stripped, used
/// verbatim as the record's file name stem.
///
/// # Returns
///
/// * `Some(String)` - A filesystem-safe id
/// * `None` - The URL has no usable final segment
///
/// # Example
///
/// ```
/// use lounge_atlas::store::entity_id_from_url;
///
/// let id = entity_id_from_url("https://example.com/api/airport/JFK");
/// assert_eq!(id.as_deref(), Some("JFK"));
///
/// let id = entity_id_from_url("https://example.com/api/lounge/1234.json");
/// assert_eq!(id.as_deref(), Some("1234"));
/// ```
pub fn entity_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let stem = segment.strip_suffix(".json").unwrap_or(segment);

    validate_id(stem).ok()?;
    Some(stem.to_string())
}
