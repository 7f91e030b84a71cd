//! Schema migrations for the local state store.
//!
//! Versions are mirrored to `PRAGMA user_version`. All pending steps run in
//! one transaction, so a failing step leaves the previous version in place.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, sql)` in ascending version order.
const MIGRATIONS: [(u32, &str); 1] = [(1, include_str!("0001_init.sql"))];

/// Newest schema version this binary can read and write.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |(version, _)| *version)
}

/// Schema version recorded in the database file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings the schema up to [`latest_version`] and returns the number of
/// steps applied.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
/// - `Migration` naming the step whose SQL failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::UnsupportedSchemaVersion { found, supported });
    }

    let pending = MIGRATIONS
        .iter()
        .filter(|(version, _)| *version > found)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for (version, sql) in &pending {
        tx.execute_batch(sql)
            .map_err(|source| DbError::Migration {
                version: *version,
                source,
            })?;
        tx.pragma_update(None, "user_version", *version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={} to={} steps={}",
        found,
        supported,
        pending.len()
    );
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, schema_version};
    use rusqlite::Connection;

    #[test]
    fn second_run_has_nothing_to_apply() {
        let mut conn = Connection::open_in_memory().unwrap();

        assert_eq!(apply_migrations(&mut conn).unwrap(), 1);
        assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }
}
