//! Key-value persistence for UI state plus a blob table for rendered
//! documents.
//!
//! This is the server-side stand-in for the browser's localStorage
//! collaborator: `get`/`set` of JSON values under well-known keys, with
//! single-key atomicity provided by SQLite. Rendered report documents are
//! kept in a separate `documents` table so the key-value side stays small
//! enough to read back in one piece.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub mod keys {
    //! Well-known key-value keys. One JSON value per key.

    /// Staged `ConversationRecord` for the next report render.
    pub const CURRENT_REPORT: &str = "current_report";
    /// Accumulated `Vec<SavedReport>`.
    pub const SAVED_REPORTS: &str = "saved_reports";
    /// Accumulated `Vec<HistoryEntry>` chat log.
    pub const CHAT_HISTORY: &str = "chat_history";
    /// `AppSettings` branding/appearance record.
    pub const APP_SETTINGS: &str = "app_settings";
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Stored value for key '{key}' is not valid JSON: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Internal lock error")]
    LockPoisoned,
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::InvalidValue {
            key: String::new(),
            reason: err.to_string(),
        }
    }
}

/// SQLite-backed key-value store. Cheap to clone; all clones share one
/// connection behind a mutex, which makes the store single-writer by
/// construction.
#[derive(Clone)]
pub struct KvStore {
    conn: Arc<Mutex<Connection>>,
}

impl KvStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::InvalidValue {
                key: path.display().to_string(),
                reason: format!("cannot create data directory: {e}"),
            })?;
        }
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode=DELETE;
             PRAGMA foreign_keys=ON;
             CREATE TABLE IF NOT EXISTS kv_entries (
                 key        TEXT PRIMARY KEY,
                 value      TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS documents (
                 id           TEXT PRIMARY KEY,
                 content_type TEXT NOT NULL,
                 bytes        BLOB NOT NULL,
                 created_at   TEXT NOT NULL
             );",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    // ─── Key-value access ─────────────────────────────────────────────────

    /// Get the raw JSON value stored under `key`. Returns None if unset.
    pub fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row("SELECT value FROM kv_entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| StoreError::InvalidValue {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Set the JSON value stored under `key` (upsert).
    pub fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value.to_string()],
        )?;
        Ok(())
    }

    /// Remove `key` entirely. Removing an absent key is not an error.
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv_entries WHERE key = ?1", [key])?;
        Ok(())
    }

    /// Typed read: deserialize the value under `key` into `T`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::InvalidValue {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Typed write: serialize `value` and store it under `key`.
    pub fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_value(value)?;
        self.set(key, &json)
    }

    // ─── Document blobs ───────────────────────────────────────────────────

    /// Store a rendered document under `id`.
    pub fn put_document(
        &self,
        id: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (id, content_type, bytes, created_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(id) DO UPDATE SET content_type = ?2, bytes = ?3",
            params![id, content_type, bytes],
        )?;
        Ok(())
    }

    /// Fetch a stored document. Returns `(content_type, bytes)`.
    pub fn get_document(&self, id: &str) -> Result<Option<(String, Vec<u8>)>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT content_type, bytes FROM documents WHERE id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(StoreError::from)
    }

    /// Delete a stored document. Returns whether a row was removed.
    pub fn delete_document(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let n = conn.execute("DELETE FROM documents WHERE id = ?1", [id])?;
        Ok(n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_missing_key_returns_none() {
        let store = KvStore::open_in_memory().unwrap();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = KvStore::open_in_memory().unwrap();
        store.set("k", &json!({"a": 1})).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), json!({"a": 1}));
    }

    #[test]
    fn set_overwrites_previous_value() {
        let store = KvStore::open_in_memory().unwrap();
        store.set("k", &json!(1)).unwrap();
        store.set("k", &json!(2)).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), json!(2));
    }

    #[test]
    fn delete_removes_key() {
        let store = KvStore::open_in_memory().unwrap();
        store.set("k", &json!("v")).unwrap();
        store.delete("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        // Deleting again is fine
        store.delete("k").unwrap();
    }

    #[test]
    fn typed_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Marker {
            name: String,
        }
        let store = KvStore::open_in_memory().unwrap();
        store
            .put_json("m", &Marker { name: "Ada".into() })
            .unwrap();
        let back: Marker = store.get_json("m").unwrap().unwrap();
        assert_eq!(back, Marker { name: "Ada".into() });
    }

    #[test]
    fn document_round_trip_is_byte_identical() {
        let store = KvStore::open_in_memory().unwrap();
        let bytes: Vec<u8> = (0..=255).collect();
        store.put_document("d1", "application/pdf", &bytes).unwrap();
        let (ct, back) = store.get_document("d1").unwrap().unwrap();
        assert_eq!(ct, "application/pdf");
        assert_eq!(back, bytes);
    }

    #[test]
    fn delete_document_reports_presence() {
        let store = KvStore::open_in_memory().unwrap();
        store.put_document("d1", "application/pdf", b"%PDF").unwrap();
        assert!(store.delete_document("d1").unwrap());
        assert!(!store.delete_document("d1").unwrap());
        assert!(store.get_document("d1").unwrap().is_none());
    }

    #[test]
    fn on_disk_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solace.db");
        {
            let store = KvStore::open(&path).unwrap();
            store.set(keys::APP_SETTINGS, &json!({"appName": "X"})).unwrap();
        }
        let store = KvStore::open(&path).unwrap();
        assert_eq!(
            store.get(keys::APP_SETTINGS).unwrap().unwrap(),
            json!({"appName": "X"}),
        );
    }

    #[test]
    fn clones_share_the_same_store() {
        let store = KvStore::open_in_memory().unwrap();
        let clone = store.clone();
        store.set("k", &json!(7)).unwrap();
        assert_eq!(clone.get("k").unwrap().unwrap(), json!(7));
    }
}
