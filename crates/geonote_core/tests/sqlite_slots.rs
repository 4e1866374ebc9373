use geonote_core::db::migrations::latest_version;
use geonote_core::db::{open_db, open_db_in_memory, DbError, SlotOp};
use geonote_core::{
    Coordinate, KeyValueStore, MarkerStore, SqliteKeyValueStore, StorageError, DEFAULT_SLOT_KEY,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_bootstraps_slot_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_slots");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geonote.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "kv_slots");
}

#[test]
fn opening_database_with_newer_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::NewerSlotVersion { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = SqliteKeyValueStore::open(&path).err().unwrap();
    assert!(matches!(
        err,
        StorageError::Db(DbError::NewerSlotVersion { .. })
    ));
}

#[tokio::test]
async fn slot_get_set_delete() {
    let slots = SqliteKeyValueStore::open_in_memory().unwrap();

    assert_eq!(slots.get("markers").await.unwrap(), None);

    slots.set("markers", b"[]".to_vec()).await.unwrap();
    assert_eq!(slots.get("markers").await.unwrap(), Some(b"[]".to_vec()));

    slots.set("markers", b"[1]".to_vec()).await.unwrap();
    assert_eq!(slots.get("markers").await.unwrap(), Some(b"[1]".to_vec()));
    assert_eq!(slots.get("other").await.unwrap(), None);

    slots.delete("markers").await.unwrap();
    slots.delete("markers").await.unwrap();
    assert_eq!(slots.get("markers").await.unwrap(), None);
}

#[tokio::test]
async fn failed_slot_statement_reports_operation_and_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geonote.db");
    let slots = SqliteKeyValueStore::open(&path).unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("DROP TABLE kv_slots;").unwrap();
    drop(conn);

    let err = slots.set("markers", b"[]".to_vec()).await.unwrap_err();
    let db_err = match err {
        StorageError::Db(db_err) => db_err,
        other => panic!("unexpected error: {other}"),
    };
    assert!(matches!(
        db_err,
        DbError::Slot {
            op: SlotOp::Write,
            ..
        }
    ));
    assert_eq!(db_err.slot_key(), Some("markers"));
    assert!(db_err.to_string().starts_with("slot `markers` write failed"));
}

#[tokio::test]
async fn markers_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geonote.db");

    let (first, second) = {
        let store = MarkerStore::new(SqliteKeyValueStore::open(&path).unwrap());
        let first = store
            .create(Coordinate::new(47.2, 38.9), "Home", "My place")
            .await
            .unwrap();
        let second = store
            .create(Coordinate::new(55.75, 37.61), "Office", "Work")
            .await
            .unwrap();
        store.delete(first.id).await.unwrap();
        (first, second)
    };

    let store = MarkerStore::new(SqliteKeyValueStore::open(&path).unwrap());
    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, vec![second.clone()]);
    assert_eq!(store.find(first.id).await, None);
    assert_eq!(store.find(second.id).await, Some(second));
}

#[tokio::test]
async fn clear_removes_the_slot_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geonote.db");

    let store = MarkerStore::new(SqliteKeyValueStore::open(&path).unwrap());
    store
        .create(Coordinate::new(1.0, 2.0), "a", "b")
        .await
        .unwrap();
    store.clear().await.unwrap();

    let conn = Connection::open(&path).unwrap();
    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM kv_slots WHERE key = ?1;",
            [DEFAULT_SLOT_KEY],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 0);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
