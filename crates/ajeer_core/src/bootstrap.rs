//! Process-start wiring of stores and managers.
//!
//! # Responsibility
//! - Open the on-device store.
//! - Try to construct the remote client once and record whether it is usable.
//! - Hand both record managers, sharing the same stores, to the host.
//!
//! # Invariants
//! - A remote client that cannot be built selects local mode; it never fails
//!   the bootstrap.
//! - The remote decision is made here once; a later outage is handled per call
//!   by the managers.

use crate::config::StorageConfig;
use crate::db::DbError;
use crate::diagnostics::{DiagnosticSink, LogDiagnostics};
use crate::repo::kv_store::{KeyValueStore, SqliteKeyValueStore};
use crate::repo::remote_store::{RemoteTable, RestTableClient};
use crate::service::record_manager::{CertificateManager, ContractManager};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const LOCAL_DB_FILE_NAME: &str = "ajeer_local.sqlite3";

/// Which store is authoritative for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Remote,
    Local,
}

impl BackendMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

#[derive(Debug)]
pub enum BootstrapError {
    Io(std::io::Error),
    Db(DbError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to prepare data directory: {err}"),
            Self::Db(err) => write!(f, "failed to open local store: {err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BootstrapError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DbError> for BootstrapError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// The record managers of one process.
pub struct Stores {
    pub contracts: ContractManager,
    pub certificates: CertificateManager,
}

impl Stores {
    /// Wires managers over explicit stores.
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        remote: Option<Arc<dyn RemoteTable>>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let mut contracts = ContractManager::new(Arc::clone(&kv))
            .with_diagnostics(Arc::clone(&diagnostics));
        let mut certificates = CertificateManager::new(kv).with_diagnostics(diagnostics);

        let mode = match remote {
            Some(client) => {
                contracts = contracts.with_remote(Arc::clone(&client));
                certificates = certificates.with_remote(client);
                BackendMode::Remote
            }
            None => BackendMode::Local,
        };
        info!("event=backend_mode module=bootstrap mode={}", mode.as_str());

        Self {
            contracts,
            certificates,
        }
    }

    /// Current routing. `Remote` only while both managers use the remote store.
    pub fn mode(&self) -> BackendMode {
        if self.contracts.is_backend_available() && self.certificates.is_backend_available() {
            BackendMode::Remote
        } else {
            BackendMode::Local
        }
    }

    /// Switches both managers at once. Without a remote backend the mode
    /// stays `Local`.
    pub fn set_remote_enabled(&self, enabled: bool) {
        self.contracts.set_remote_enabled(enabled);
        self.certificates.set_remote_enabled(enabled);
    }
}

/// Opens stores as described by `config`.
///
/// # Errors
/// - `BootstrapError::Io` when the data directory cannot be created.
/// - `BootstrapError::Db` when the local store database cannot be opened.
pub fn open_stores(config: &StorageConfig) -> Result<Stores, BootstrapError> {
    let kv: Arc<dyn KeyValueStore> = match &config.data_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            Arc::new(SqliteKeyValueStore::open(dir.join(LOCAL_DB_FILE_NAME))?)
        }
        None => Arc::new(SqliteKeyValueStore::open_in_memory()?),
    };

    Ok(Stores::new(kv, connect_remote(config), Arc::new(LogDiagnostics)))
}

fn connect_remote(config: &StorageConfig) -> Option<Arc<dyn RemoteTable>> {
    let Some((url, key)) = config.remote_credentials() else {
        info!("event=remote_init module=bootstrap status=skipped reason=not_configured");
        return None;
    };

    match RestTableClient::new(url, key, config.request_timeout) {
        Ok(client) => {
            info!("event=remote_init module=bootstrap status=ok");
            Some(Arc::new(client))
        }
        Err(err) => {
            warn!("event=remote_init module=bootstrap status=error fallback=local error={err}");
            None
        }
    }
}
