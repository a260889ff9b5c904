use mission_core::db::migrations::latest_version;
use mission_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "tasks");
    assert_table_exists(&conn, "memories");
    assert_index_exists(&conn, "idx_tasks_status");
    assert_index_exists(&conn, "idx_tasks_assigned_to");
    assert_index_exists(&conn, "idx_tasks_priority");
    assert_index_exists(&conn, "idx_memories_category");
    assert_index_exists(&conn, "idx_memories_created_at");
}

#[test]
fn reopening_same_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mission.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO memories (uuid, content, category, created_at, updated_at)
             VALUES ('00000000-0000-4000-8000-000000000001', 'kept', 'work', 1, 1);",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM memories;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_step_is_named_and_rolled_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.db");

    // A view squatting on the memories name makes the index step fail.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE VIEW memories AS SELECT 'work' AS category, 1 AS created_at;
         PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::Migration { version, name, .. } => {
            assert_eq!(version, 2);
            assert_eq!(name, "memories");
        }
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 1);
}

#[test]
fn schema_rejects_unknown_enum_values() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO tasks (uuid, title, status, assigned_to, priority, created_at, updated_at)
         VALUES ('00000000-0000-4000-8000-000000000002', 't', 'cancelled', 'jesus', 'low', 1, 1);",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, name: &str) {
    assert_schema_object(conn, "table", name);
}

fn assert_index_exists(conn: &Connection, name: &str) {
    assert_schema_object(conn, "index", name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
