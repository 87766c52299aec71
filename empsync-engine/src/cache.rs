//! Per-record detail cache
//!
//! Keyed store of the last known full snapshot per record id. An explicit
//! object owned by the composition root and passed by `Arc`; consumers
//! never reach for a global. A snapshot is either completely present or
//! absent, and concurrent writers resolve last-write-wins.

use chrono::{DateTime, Utc};
use empsync_common::model::{EmployeeRecord, RecordPatch};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One cached snapshot with its fetch timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub data: EmployeeRecord,
    pub fetched_at: DateTime<Utc>,
}

/// Keyed detail cache; at most one entry per record id
#[derive(Default)]
pub struct DetailCache {
    entries: RwLock<HashMap<Uuid, CacheEntry>>,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete prior snapshot, or none
    pub async fn get(&self, id: Uuid) -> Option<CacheEntry> {
        self.entries.read().await.get(&id).cloned()
    }

    /// Atomic overwrite with a fresh full snapshot
    pub async fn put(&self, id: Uuid, data: EmployeeRecord) {
        let entry = CacheEntry {
            data,
            fetched_at: Utc::now(),
        };
        self.entries.write().await.insert(id, entry);
        tracing::debug!(record_id = %id, "Cache entry replaced");
    }

    /// Shallow-merge a patch into an existing entry.
    ///
    /// A miss is a no-op, not an error: merging into nothing would fabricate
    /// a partial snapshot, which `get` must never serve.
    pub async fn merge(&self, id: Uuid, patch: &RecordPatch) {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(entry) => {
                entry.data.apply_patch(patch);
                tracing::debug!(record_id = %id, "Cache entry merged");
            }
            None => {
                tracing::debug!(record_id = %id, "Cache merge skipped (no entry)");
            }
        }
    }

    /// Drop a record's entry (e.g. after the record leaves the caller's view)
    pub async fn invalidate(&self, id: Uuid) {
        self.entries.write().await.remove(&id);
    }
}
