use horoscope_core::db::migrations::latest_version;
use horoscope_core::db::{open_db, open_db_in_memory, DbError};
use horoscope_core::{SqliteStateRepository, StateKey, StateRepository};
use rusqlite::Connection;

#[test]
fn in_memory_database_gets_local_state_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_eq!(column_names(&conn), ["key", "value", "updated_at"]);
}

#[test]
fn state_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("horoscope_state.sqlite3");

    let first = open_db(&path).unwrap();
    SqliteStateRepository::new(&first)
        .set_text(StateKey::Language, "French")
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    assert_eq!(
        SqliteStateRepository::new(&second)
            .get_text(StateKey::Language)
            .unwrap()
            .as_deref(),
        Some("French")
    );
}

#[test]
fn newer_schema_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 42;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            found,
            supported,
        } => {
            assert_eq!(found, 42);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn column_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn.prepare("PRAGMA table_info(local_state);").unwrap();
    stmt.query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}
