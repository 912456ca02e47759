//! Time-expiring payload cache
//!
//! Parsed records are cached by entity id for a fixed TTL. Expiry is lazy: an
//! expired entry is replaced the next time its id is requested. Entries that
//! are never requested again stay in memory until [`PayloadCache::purge_expired`]
//! runs; the id universe is the finite airport directory, which bounds growth.

use crate::store::RecordStore;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Upper bound on the TTL, keeping expiry arithmetic far from overflow
const MAX_TTL_DAYS: i64 = 365 * 100;

/// A cached, parsed record
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// True once `now` has reached the expiry time
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Read-through cache of parsed records in front of a store
///
/// Safe to share between concurrent queries. Two queries refilling the same
/// id at once both read the store; the last write wins.
#[derive(Debug)]
pub struct PayloadCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl PayloadCache {
    pub fn new(ttl: std::time::Duration) -> Self {
        let cap = Duration::days(MAX_TTL_DAYS);
        let ttl = Duration::from_std(ttl).map_or(cap, |ttl| ttl.min(cap));
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the parsed record `id`, reading `store` on a miss or expiry
    ///
    /// # Returns
    ///
    /// * `Some(Value)` - The parsed record
    /// * `None` - The record is missing or is not valid JSON
    pub fn get(&self, id: &str, store: &dyn RecordStore) -> Option<Value> {
        self.get_at(id, store, Utc::now())
    }

    /// [`PayloadCache::get`] evaluated at an explicit point in time
    pub fn get_at(&self, id: &str, store: &dyn RecordStore, now: DateTime<Utc>) -> Option<Value> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(id) {
                if !entry.is_expired(now) {
                    tracing::trace!("Cache hit for {}", id);
                    return Some(entry.value.clone());
                }
            }
        }

        let value = load(id, store)?;
        let entry = CacheEntry {
            value: value.clone(),
            expires_at: now + self.ttl,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), entry);

        Some(value)
    }

    /// Drops every entry expired at `now`, returning how many were removed
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of entries held, expired or not
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Reads and parses one record; failures are logged and become `None`
fn load(id: &str, store: &dyn RecordStore) -> Option<Value> {
    let bytes = match store.read(id) {
        Ok(bytes) => bytes,
        Err(e) if e.is_not_found() => {
            tracing::debug!("No stored record for {}", id);
            return None;
        }
        Err(e) => {
            tracing::warn!("Error reading record {}: {}", id, e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Error parsing record {}: {}", id, e);
            None
        }
    }
}
