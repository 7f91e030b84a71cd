//! Opening the state database.
//!
//! # Invariants
//! - Returned connections are fully migrated.
//! - File databases run in WAL mode so a UI poll can read while a roast
//!   stream is writing.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
enum OpenMode<'a> {
    File(&'a Path),
    Memory,
}

impl OpenMode<'_> {
    fn label(self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

/// Opens (creating if needed) the state database file at `path`.
///
/// Emits `db_open` events with duration and the number of migration steps.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with(OpenMode::File(path.as_ref()))
}

/// In-memory state database, for tests and throwaway sessions.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(OpenMode::Memory)
}

fn open_with(mode: OpenMode<'_>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={}", mode.label());

    match connect(mode) {
        Ok((conn, steps)) => {
            info!(
                "event=db_open module=db status=ok mode={} migrations_applied={} duration_ms={}",
                mode.label(),
                steps,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error={}",
                mode.label(),
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn connect(mode: OpenMode<'_>) -> DbResult<(Connection, usize)> {
    let mut conn = match mode {
        OpenMode::File(path) => {
            let conn = Connection::open(path)?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            conn
        }
        OpenMode::Memory => Connection::open_in_memory()?,
    };
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let steps = apply_migrations(&mut conn)?;
    Ok((conn, steps))
}
