//! Durable key-value backend on top of one SQLite file.
//!
//! # Responsibility
//! - Map slot get/set/delete onto the `kv_slots` table.
//! - Keep blocking SQLite calls off the async executor threads.
//!
//! # Invariants
//! - The wrapped connection is always bootstrapped via `db::open_db*`.
//! - `set` is a single upsert statement, so a slot is replaced wholesale.

use super::{KeyValueStore, StorageError, StorageResult};
use crate::db::{open_db, open_db_in_memory, DbError, SlotOp};
use async_trait::async_trait;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQLite-backed slot storage.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueStore {
    /// Opens (or creates) the slot database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::wrap(open_db(path)?))
    }

    /// Opens a private in-memory slot database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::wrap(open_db_in_memory()?))
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn run<T, F>(&self, op: SlotOp, key: &str, job: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();
        let outcome = tokio::task::spawn_blocking(move || -> StorageResult<T> {
            let guard = conn
                .lock()
                .map_err(|_| StorageError::Unavailable("slot connection lock poisoned".into()))?;
            job(&guard, &key).map_err(|source| {
                StorageError::Db(DbError::Slot {
                    op,
                    key: key.clone(),
                    source,
                })
            })
        })
        .await
        .map_err(|err| StorageError::Unavailable(format!("slot task failed: {err}")))
        .and_then(|result| result);

        let op = op.as_str();
        match &outcome {
            Ok(_) => debug!("event=slot_{op} module=storage status=ok backend=sqlite"),
            Err(err) => error!(
                "event=slot_{op} module=storage status=error backend=sqlite error={err}"
            ),
        }
        outcome
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.run(SlotOp::Read, key, |conn, key| {
            conn.query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
        })
        .await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        self.run(SlotOp::Write, key, move |conn, key| {
            conn.execute(
                "INSERT INTO kv_slots (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![key, value],
            )
            .map(|_| ())
        })
        .await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.run(SlotOp::Delete, key, |conn, key| {
            conn.execute("DELETE FROM kv_slots WHERE key = ?1;", [key])
                .map(|_| ())
        })
        .await
    }
}
