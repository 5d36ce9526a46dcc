//! Schema migrations for the local store database.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - Pending migrations are applied in one transaction and mirrored to
//!   `PRAGMA user_version`.

use crate::db::{DbError, DbLocation, DbResult};
use rusqlite::Connection;

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_kv_entries.sql"),
}];

/// Returns the latest schema version known by this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the database at `location` up to `latest_version()`.
pub(crate) fn apply_migrations(conn: &mut Connection, location: &DbLocation) -> DbResult<()> {
    let open_error = |source: rusqlite::Error| DbError::Open {
        location: location.clone(),
        source,
    };

    let current: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(open_error)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            location: location.clone(),
            db_version: current,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > current)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction().map_err(open_error)?;
    for migration in pending {
        let migration_error = |source: rusqlite::Error| DbError::Migration {
            location: location.clone(),
            version: migration.version,
            source,
        };
        tx.execute_batch(migration.sql).map_err(migration_error)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            .map_err(migration_error)?;
    }
    tx.commit().map_err(|source| DbError::Migration {
        location: location.clone(),
        version: latest,
        source,
    })
}
