//! SQLite bootstrap for the on-device key-value store.
//!
//! # Responsibility
//! - Open and configure the SQLite file that backs local record storage.
//! - Apply schema migrations before any key is read or written.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - A database written by a newer build is rejected, not downgraded.
//! - Open and migration failures name the database they happened on.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Which local store database an error or log event refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

impl DbLocation {
    /// Short mode tag used in log events.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

impl Display for DbLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "`{}`", path.display()),
            Self::Memory => write!(f, "in-memory store"),
        }
    }
}

#[derive(Debug)]
pub enum DbError {
    /// The database could not be opened or configured.
    Open {
        location: DbLocation,
        source: rusqlite::Error,
    },
    /// A migration failed; none of the pending migrations were kept.
    Migration {
        location: DbLocation,
        version: u32,
        source: rusqlite::Error,
    },
    /// The database was written by a newer build.
    UnsupportedSchemaVersion {
        location: DbLocation,
        db_version: u32,
        latest_supported: u32,
    },
    /// A key-value read or write failed on an open database.
    Statement(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { location, source } => {
                write!(f, "cannot open local store {location}: {source}")
            }
            Self::Migration {
                location,
                version,
                source,
            } => write!(
                f,
                "local store migration {version} failed on {location}: {source}"
            ),
            Self::UnsupportedSchemaVersion {
                location,
                db_version,
                latest_supported,
            } => write!(
                f,
                "local store {location} has schema version {db_version}, this build supports up to {latest_supported}"
            ),
            Self::Statement(source) => write!(f, "local store statement failed: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. }
            | Self::Migration { source, .. }
            | Self::Statement(source) => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}
