//! Durable record tables backed by redb.
//!
//! One table per record kind, keyed by record id, values are JSON. Every
//! save is its own write transaction, so a crash loses at most the record
//! being written.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use tracing::warn;

use crate::error::StoreError;

use super::{Record, StoreResult};

const TABLES: [&str; 5] = ["entities", "relationships", "news", "events", "risks"];

fn table(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

fn redb_err(context: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Redb {
        message: format!("{context} failed: {e}"),
    }
}

/// ACID-durable record store using redb.
pub struct DurableStore {
    db: Arc<Database>,
}

impl DurableStore {
    /// Open or create the database in `data_dir`, creating every table.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| StoreError::Io { source: e })?;
        let db_path = data_dir.join("finrisk.redb");
        let db = Database::create(&db_path).map_err(|e| StoreError::Redb {
            message: format!("failed to open redb at {}: {e}", db_path.display()),
        })?;

        let txn = db.begin_write().map_err(|e| redb_err("begin_write", e))?;
        for name in TABLES {
            txn.open_table(table(name))
                .map_err(|e| redb_err("open_table", e))?;
        }
        txn.commit().map_err(|e| redb_err("commit", e))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Write one record, replacing any previous version.
    pub fn put<T: Record>(&self, record: &T) -> StoreResult<()> {
        let bytes = serde_json::to_vec(record).map_err(|e| StoreError::Serialization {
            message: format!("{} {}: {e}", T::KIND, record.id()),
        })?;
        let txn = self.db.begin_write().map_err(|e| redb_err("begin_write", e))?;
        {
            let mut t = txn
                .open_table(table(T::TABLE))
                .map_err(|e| redb_err("open_table", e))?;
            t.insert(record.id(), bytes.as_slice())
                .map_err(|e| redb_err("insert", e))?;
        }
        txn.commit().map_err(|e| redb_err("commit", e))?;
        Ok(())
    }

    /// Load every record of one kind. Records that fail to decode are
    /// logged and skipped.
    pub fn load_all<T: Record>(&self) -> StoreResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(|e| redb_err("begin_read", e))?;
        let t = txn
            .open_table(table(T::TABLE))
            .map_err(|e| redb_err("open_table", e))?;
        let mut records = Vec::new();
        for entry in t.iter().map_err(|e| redb_err("iter", e))? {
            let (key, value) = entry.map_err(|e| redb_err("iter", e))?;
            match serde_json::from_slice::<T>(value.value()) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    kind = T::KIND,
                    id = key.value(),
                    error = %e,
                    "dropping malformed record"
                ),
            }
        }
        Ok(records)
    }

    /// Write raw bytes under `id`, bypassing serialization.
    #[cfg(test)]
    pub(crate) fn put_raw(&self, table_name: &str, id: &str, bytes: &[u8]) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(|e| redb_err("begin_write", e))?;
        {
            let mut t = txn
                .open_table(table(table_name))
                .map_err(|e| redb_err("open_table", e))?;
            t.insert(id, bytes).map_err(|e| redb_err("insert", e))?;
        }
        txn.commit().map_err(|e| redb_err("commit", e))?;
        Ok(())
    }
}

impl std::fmt::Debug for DurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, Relationship};
    use tempfile::TempDir;

    #[test]
    fn put_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(dir.path()).unwrap();
        let entity = Entity::with_id("e1", "Bank X", "ORG").with_subtype("Bank");
        store.put(&entity).unwrap();
        assert_eq!(store.load_all::<Entity>().unwrap(), vec![entity]);
    }

    #[test]
    fn persistence_across_reopens() {
        let dir = TempDir::new().unwrap();
        {
            let store = DurableStore::open(dir.path()).unwrap();
            store.put(&Relationship::new("a", "b", "owns")).unwrap();
        }
        let store = DurableStore::open(dir.path()).unwrap();
        let rels = store.load_all::<Relationship>().unwrap();
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].rel_type, "owns");
    }

    #[test]
    fn malformed_records_are_dropped() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(dir.path()).unwrap();
        store.put(&Entity::with_id("good", "Good", "ORG")).unwrap();
        store
            .put_raw("entities", "bad", br#"{"id":"bad","type":"ORG"}"#)
            .unwrap();
        let loaded = store.load_all::<Entity>().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "good");
    }
}
