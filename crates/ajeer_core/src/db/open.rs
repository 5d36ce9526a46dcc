//! Connection bootstrap for the local store database.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - Every open emits one `db_open` start event and one ok/error event.

use super::migrations::apply_migrations;
use super::{DbError, DbLocation, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the local store database file.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with(DbLocation::File(path.to_path_buf()), || Connection::open(path))
}

/// Opens a throwaway in-memory local store database.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(DbLocation::Memory, Connection::open_in_memory)
}

fn open_with(
    location: DbLocation,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = location.mode();
    info!("event=db_open module=db status=start mode={mode}");

    let result = connect()
        .map_err(|source| DbError::Open {
            location: location.clone(),
            source,
        })
        .and_then(|mut conn| bootstrap_connection(&mut conn, &location).map(|()| conn));

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn bootstrap_connection(conn: &mut Connection, location: &DbLocation) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|source| DbError::Open {
            location: location.clone(),
            source,
        })?;
    apply_migrations(conn, location)
}
