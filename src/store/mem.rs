//! In-memory record collections backed by DashMap.

use dashmap::DashMap;

use super::Record;

/// Concurrent in-memory collection of one record kind, keyed by id.
#[derive(Debug)]
pub struct MemStore<T> {
    data: DashMap<String, T>,
}

impl<T: Record> MemStore<T> {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Insert or replace a record (last write wins).
    pub fn put(&self, record: T) {
        self.data.insert(record.id().to_string(), record);
    }

    /// Get a clone of the stored record.
    pub fn get(&self, id: &str) -> Option<T> {
        self.data.get(id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Snapshot of every record, ordered by id so repeated runs see the same order.
    pub fn all(&self) -> Vec<T> {
        let mut records: Vec<T> = self.data.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| a.id().cmp(b.id()));
        records
    }

    /// Snapshot of the records matching `pred`, ordered by id.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        let mut records: Vec<T> = self
            .data
            .iter()
            .filter(|r| pred(r.value()))
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| a.id().cmp(b.id()));
        records
    }
}

impl<T: Record> Default for MemStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;

    #[test]
    fn put_and_get() {
        let store = MemStore::new();
        store.put(Entity::with_id("e1", "Bank X", "ORG"));
        assert_eq!(store.get("e1").map(|e| e.name), Some("Bank X".to_string()));
        assert!(store.get("e2").is_none());
    }

    #[test]
    fn overwrite_is_last_write_wins() {
        let store = MemStore::new();
        store.put(Entity::with_id("e1", "Old", "ORG"));
        store.put(Entity::with_id("e1", "New", "ORG"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("e1").unwrap().name, "New");
    }

    #[test]
    fn all_is_sorted_by_id() {
        let store = MemStore::new();
        for id in ["c", "a", "b"] {
            store.put(Entity::with_id(id, id, "ORG"));
        }
        let ids: Vec<String> = store.all().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn concurrent_access() {
        use std::sync::Arc;
        let store = Arc::new(MemStore::new());
        let handles: Vec<_> = (0..100)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.put(Entity::with_id(format!("e{i}"), "n", "ORG"));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 100);
    }
}
