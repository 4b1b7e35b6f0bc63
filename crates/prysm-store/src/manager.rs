use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::db::init_db;
use crate::error::{Result, StoreError};

/// Typed wrapper over a schemaless document store (spec §4, component #1).
///
/// Every call locks a single `rusqlite::Connection`; SQLite serializes
/// writers internally, so this also gives `merge` a transactional
/// read-modify-write as spec §5 requires ("a transactional merge is
/// REQUIRED if the platform supports it").
pub struct DocStore {
    conn: Mutex<Connection>,
}

impl DocStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::new(conn)
    }

    /// Fetch and deserialize a document. `None` when absent.
    pub fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT doc FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Full-document overwrite, keyed by `(collection, id)` — the
    /// last-writer-wins semantics spec §5 accepts for bundles/reports.
    pub fn set<T: Serialize>(&self, collection: &str, id: &str, doc: &T) -> Result<()> {
        let json = serde_json::to_string(doc)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO documents (collection, id, doc, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(collection, id) DO UPDATE SET doc = excluded.doc, updated_at = excluded.updated_at",
            params![collection, id, json, now],
        )?;
        debug!(collection, id, "document set");
        Ok(())
    }

    /// Read-modify-write a raw JSON value. `f` receives the current document
    /// (or `Value::Null` when absent) and returns the value to persist. Runs
    /// inside a SQLite transaction so concurrent mergers serialize instead of
    /// racing (used by `specific_subjects` union-merge, spec §5).
    pub fn merge<F>(&self, collection: &str, id: &str, f: F) -> Result<Value>
    where
        F: FnOnce(Value) -> Value,
    {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let current: Option<String> = tx
            .query_row(
                "SELECT doc FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;
        let current_val: Value = match current {
            Some(json) => serde_json::from_str(&json)?,
            None => Value::Null,
        };
        let merged = f(current_val);
        let json = serde_json::to_string(&merged)?;
        let now = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO documents (collection, id, doc, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(collection, id) DO UPDATE SET doc = excluded.doc, updated_at = excluded.updated_at",
            params![collection, id, json, now],
        )?;
        tx.commit()?;
        Ok(merged)
    }

    /// Collection-scan, deserializing every row and keeping those matching
    /// `predicate`. Used by the scheduler to enumerate scheduling
    /// preferences and by the pipeline to enumerate all known users.
    pub fn scan<T, P>(&self, collection: &str, predicate: P) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        P: Fn(&T) -> bool,
    {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT doc FROM documents WHERE collection = ?1")?;
        let rows = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            let json = row?;
            let doc: T = serde_json::from_str(&json)?;
            if predicate(&doc) {
                out.push(doc);
            }
        }
        Ok(out)
    }

    /// Delete a document. No-op if absent.
    pub fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(())
    }

    /// Append an immutable history entry (e.g. one `PodcastArtifact` per
    /// run), mirroring `skynet-memory::manager::MemoryManager::save_message`'s
    /// append-only `conversations` table.
    pub fn append_history<T: Serialize>(
        &self,
        collection: &str,
        doc_id: &str,
        doc: &T,
    ) -> Result<i64> {
        let json = serde_json::to_string(doc)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO history (collection, doc_id, doc, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![collection, doc_id, json, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Require a document to exist, mapping absence to `StoreError::NotFound`
    /// (used by read-only HTTP endpoints that must 404).
    pub fn require<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T> {
        self.get(collection, id)?.ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Doc {
        value: i32,
    }

    fn store() -> DocStore {
        DocStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn set_then_get_roundtrips() {
        let store = store();
        store.set("widgets", "w1", &Doc { value: 42 }).unwrap();
        let got: Doc = store.get("widgets", "w1").unwrap().unwrap();
        assert_eq!(got, Doc { value: 42 });
    }

    #[test]
    fn get_missing_is_none() {
        let store = store();
        let got: Option<Doc> = store.get("widgets", "missing").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn set_overwrites() {
        let store = store();
        store.set("widgets", "w1", &Doc { value: 1 }).unwrap();
        store.set("widgets", "w1", &Doc { value: 2 }).unwrap();
        let got: Doc = store.get("widgets", "w1").unwrap().unwrap();
        assert_eq!(got.value, 2);
    }

    #[test]
    fn merge_union_on_missing_document() {
        let store = store();
        let merged = store
            .merge("sets", "u1", |current| {
                let mut items: Vec<String> = current
                    .as_array()
                    .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                    .unwrap_or_default();
                items.push("tesla".to_string());
                serde_json::json!(items)
            })
            .unwrap();
        assert_eq!(merged, serde_json::json!(["tesla"]));
    }

    #[test]
    fn scan_filters_by_predicate() {
        let store = store();
        store.set("widgets", "a", &Doc { value: 1 }).unwrap();
        store.set("widgets", "b", &Doc { value: 2 }).unwrap();
        let got: Vec<Doc> = store.scan("widgets", |d: &Doc| d.value > 1).unwrap();
        assert_eq!(got, vec![Doc { value: 2 }]);
    }

    #[test]
    fn require_missing_errors() {
        let store = store();
        let err = store.require::<Doc>("widgets", "missing").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
