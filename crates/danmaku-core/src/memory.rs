//! In-memory object store.
//!
//! Backs the offline demo mode of the client and the store tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;

use crate::store::{Fields, ObjectList, ObjectStore, StoreError, StoredObject};

#[derive(Debug, Clone)]
struct Row {
    seq: u64,
    object: StoredObject,
}

/// Shared, cloneable in-memory [`ObjectStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    tables: Arc<Mutex<HashMap<String, Vec<Row>>>>,
    next_seq: Arc<AtomicU64>,
    offline: Arc<AtomicBool>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a network outage: every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    /// Inserts a row verbatim, bypassing field normalization.
    pub fn insert_raw(&self, kind: &str, id: &str, created_at: DateTime<Utc>, fields: Value) {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        let object = StoredObject {
            id: id.to_string(),
            created_at,
            fields,
        };
        self.push(kind, object);
    }

    pub fn len(&self, kind: &str) -> usize {
        self.tables.lock().get(kind).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, kind: &str) -> bool {
        self.len(kind) == 0
    }

    fn push(&self, kind: &str, object: StoredObject) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.tables
            .lock()
            .entry(kind.to_string())
            .or_default()
            .push(Row { seq, object });
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(StoreError::Transport("memory store is offline".to_string()));
        }
        Ok(())
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn create(&self, kind: &str, fields: Fields) -> Result<StoredObject, StoreError> {
        self.check_online()?;

        let created_at = fields
            .get("createdAt")
            .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v.clone()).ok())
            .unwrap_or_else(Utc::now);
        let id = format!("mem-{}", self.next_seq.load(Ordering::Relaxed));

        let object = StoredObject {
            id,
            created_at,
            fields,
        };
        self.push(kind, object.clone());
        Ok(object)
    }

    async fn list(
        &self,
        kind: &str,
        limit: usize,
        most_recent_first: bool,
    ) -> Result<ObjectList, StoreError> {
        self.check_online()?;

        let tables = self.tables.lock();
        let mut rows: Vec<&Row> = tables.get(kind).map(|t| t.iter().collect()).unwrap_or_default();
        rows.sort_by_key(|row| (row.object.created_at, row.seq));
        if most_recent_first {
            rows.reverse();
        }

        let items = rows
            .into_iter()
            .take(limit)
            .map(|row| row.object.clone())
            .collect();
        Ok(ObjectList { items })
    }

    async fn get(&self, kind: &str, id: &str) -> Result<StoredObject, StoreError> {
        self.check_online()?;

        self.tables
            .lock()
            .get(kind)
            .and_then(|t| t.iter().find(|row| row.object.id == id))
            .map(|row| row.object.clone())
            .ok_or_else(|| StoreError::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            })
    }

    async fn update(&self, kind: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.check_online()?;

        let mut tables = self.tables.lock();
        let row = tables
            .get_mut(kind)
            .and_then(|t| t.iter_mut().find(|row| row.object.id == id))
            .ok_or_else(|| StoreError::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            })?;
        row.object.fields.extend(fields);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn test_list_order_and_limit() {
        let store = MemoryObjectStore::new();
        for (i, secs) in [30, 10, 20].into_iter().enumerate() {
            let at = Utc.timestamp_opt(secs, 0).unwrap();
            store.insert_raw("comment", &format!("c{i}"), at, json!({ "text": "x" }));
        }

        let newest = block_on(store.list("comment", 2, true)).unwrap();
        let ids: Vec<_> = newest.items.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["c0", "c2"]);

        let oldest = block_on(store.list("comment", 10, false)).unwrap();
        let ids: Vec<_> = oldest.items.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c0"]);
    }

    #[test]
    fn test_types_are_isolated() {
        let store = MemoryObjectStore::new();
        block_on(store.create("comment", Fields::new())).unwrap();
        assert_eq!(store.len("comment"), 1);
        assert!(store.is_empty("other"));
    }

    #[test]
    fn test_update_merges_fields() {
        let store = MemoryObjectStore::new();
        let created = block_on(store.create("comment", Fields::new())).unwrap();

        let mut patch = Fields::new();
        patch.insert("likesCount".to_string(), json!(7));
        block_on(store.update("comment", &created.id, patch)).unwrap();

        let fetched = block_on(store.get("comment", &created.id)).unwrap();
        assert_eq!(fetched.fields["likesCount"], 7);
    }
}
