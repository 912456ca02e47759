//! Lounge work discovery
//!
//! Stage two's work set is derived from the airport records stage one left in
//! the store, not passed along in memory. Re-reading persisted state is what
//! lets stage two run on its own, at any later time.
//!
//! Discovery is split in two: [`snapshot_records`] reads the record set once,
//! and [`resolve_lounge_work`] is a pure function over that snapshot.

use crate::store::{RecordStore, StoreResult};
use serde_json::Value;
use std::collections::HashSet;

/// A lounge found in an airport record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoungeRef {
    pub id: String,
    pub slug_path: Option<String>,
}

/// One stored record, as read at snapshot time
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: String,
    pub bytes: Vec<u8>,
}

/// Reads every record in `store`, in the store's listing order
///
/// Records that vanish or fail to read between listing and reading are
/// logged and left out.
pub fn snapshot_records(store: &dyn RecordStore) -> StoreResult<Vec<StoredRecord>> {
    let ids = store.list_ids()?;
    let mut records = Vec::with_capacity(ids.len());

    for id in ids {
        match store.read(&id) {
            Ok(bytes) => records.push(StoredRecord { id, bytes }),
            Err(e) => tracing::warn!("Error reading airport record {}: {}", id, e),
        }
    }

    Ok(records)
}

/// Extracts lounge work from a snapshot of airport records
///
/// Order follows the snapshot, then each record's `lounges` array. Duplicates
/// across airports are kept. Records that are not valid JSON are logged and
/// skipped; a missing or non-array `lounges` contributes nothing.
pub fn resolve_lounge_work(records: &[StoredRecord]) -> Vec<LoungeRef> {
    let mut lounges = Vec::new();

    for record in records {
        match serde_json::from_slice::<Value>(&record.bytes) {
            Ok(document) => lounges.extend(lounge_refs(&document)),
            Err(e) => {
                tracing::warn!("Error parsing airport record {}: {}", record.id, e);
            }
        }
    }

    lounges
}

/// Reads the airport store and returns the lounges to fetch
///
/// A store with no airport records yields no work.
pub fn discover_lounge_work(airports: &dyn RecordStore) -> StoreResult<Vec<LoungeRef>> {
    let records = snapshot_records(airports)?;
    let lounges = resolve_lounge_work(&records);

    tracing::info!(
        "Discovered {} lounges across {} airport records",
        lounges.len(),
        records.len()
    );

    Ok(lounges)
}

/// Drops repeated lounge ids, keeping each id's first occurrence
pub fn dedupe_lounges(lounges: Vec<LoungeRef>) -> Vec<LoungeRef> {
    let mut seen = HashSet::new();
    lounges
        .into_iter()
        .filter(|lounge| seen.insert(lounge.id.clone()))
        .collect()
}

/// Lounge entries of one airport document
fn lounge_refs(document: &Value) -> Vec<LoungeRef> {
    let Some(entries) = document.get("lounges").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let id = usable_id(entry.get("id")?)?;
            let slug_path = entry
                .get("slugPath")
                .and_then(Value::as_str)
                .map(str::to_string);
            Some(LoungeRef { id, slug_path })
        })
        .collect()
}

/// Non-empty strings and non-zero integers are usable ids
fn usable_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => match (n.as_u64(), n.as_i64()) {
            (Some(0), _) => None,
            (Some(u), _) => Some(u.to_string()),
            (None, Some(i)) => Some(i.to_string()),
            _ => None,
        },
        _ => None,
    }
}
